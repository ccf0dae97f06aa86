//! Native spooler backend
//!
//! Realizes [`SpoolApi`] against winspool through the Win32 API. Every
//! variable-size query follows the spooler's probe-then-fetch shape: call
//! once for the byte count, allocate, call again to fill. Failures carry
//! the code from `GetLastError` so the portable layer can report it.

use core::ffi::c_void;

use tracing::warn;
use windows::Win32::Foundation::{
    ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND, ERROR_INVALID_PRINTER_NAME, GetLastError, LPARAM,
    WPARAM,
};
use windows::Win32::Graphics::Gdi::DEVMODEW;
use windows::Win32::Graphics::Printing::{
    ClosePrinter, DocumentPropertiesW, EnumJobsW, EnumPrintersW, GetDefaultPrinterW, GetPrinterW,
    JOB_CONTROL_CANCEL, JOB_CONTROL_DELETE, JOB_INFO_1W, OpenPrinterW, PRINTER_ACCESS_USE,
    PRINTER_ALL_ACCESS, PRINTER_DEFAULTSW, PRINTER_ENUM_CONNECTIONS, PRINTER_ENUM_LOCAL,
    PRINTER_HANDLE, PRINTER_INFO_2W, PRINTER_INFO_5W, SetJobW, SetPrinterW,
};
use windows::Win32::Security::PSECURITY_DESCRIPTOR;
use windows::Win32::Storage::Xps::{DC_PAPERNAMES, DC_PAPERS, DeviceCapabilitiesW};
use windows::Win32::UI::WindowsAndMessaging::{
    HWND_BROADCAST, SMTO_ABORTIFHUNG, SendMessageTimeoutW, WM_DEVMODECHANGE,
};
use windows::core::{PCWSTR, PWSTR};

use crate::api::{PrinterAccess, RawHandle, SpoolApi};
use crate::config::Spooler;
use crate::error::{SpoolError, SpoolResult};
use crate::jobs::{JobCommand, JobInfo};

// DocumentProperties mode flags (winspool.h). Probe with neither; fetch
// with the out flag; merge with both so the buffer is source and
// destination at once.
const DM_OUT_BUFFER: u32 = 2;
const DM_IN_BUFFER: u32 = 8;

// Fixed character width of a paper name in the capability array.
const PAPER_NAME_CCH: usize = 64;

/// The live Windows print subsystem
#[derive(Debug, Default, Clone, Copy)]
pub struct WinSpool;

impl Spooler<WinSpool> {
    /// A spooler bound to the host print subsystem
    pub fn system() -> Self {
        Spooler::with_api(WinSpool)
    }
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn last_error() -> u32 {
    unsafe { GetLastError().0 }
}

fn native(call: &'static str) -> SpoolError {
    SpoolError::Native {
        call,
        code: last_error(),
    }
}

fn printer_handle(handle: RawHandle) -> PRINTER_HANDLE {
    PRINTER_HANDLE(handle.0 as *mut c_void)
}

fn pwstr_to_string(value: PWSTR) -> String {
    if value.is_null() {
        return String::new();
    }
    unsafe { value.to_string().unwrap_or_default() }
}

// Ports that belong to virtual printers (XPS writer, OneNote, fax-style
// sinks) rather than physical queues.
fn is_virtual_port(port: &str) -> bool {
    let p = port.to_lowercase();
    p == "file:"
        || p == "portprompt:"
        || p == "xpsport:"
        || p.starts_with("onenote")
        || p == "nul:"
        || p.starts_with("wfsport:")
}

// Enumerate local and connected printers at level 5: (name, port) pairs.
fn enum_printers_level5() -> SpoolResult<Vec<(String, String)>> {
    unsafe {
        let flags = PRINTER_ENUM_LOCAL | PRINTER_ENUM_CONNECTIONS;
        let mut needed: u32 = 0;
        let mut returned: u32 = 0;

        let _ = EnumPrintersW(flags, None, 5, None, &mut needed, &mut returned);
        if needed == 0 {
            return Ok(Vec::new());
        }

        let mut buf: Vec<u8> = vec![0; needed as usize];
        EnumPrintersW(
            flags,
            None,
            5,
            Some(buf.as_mut_slice()),
            &mut needed,
            &mut returned,
        )
        .map_err(|_| native("EnumPrintersW"))?;

        let infos =
            std::slice::from_raw_parts(buf.as_ptr() as *const PRINTER_INFO_5W, returned as usize);

        Ok(infos
            .iter()
            .map(|info| {
                (
                    pwstr_to_string(info.pPrinterName),
                    pwstr_to_string(info.pPortName),
                )
            })
            .collect())
    }
}

impl SpoolApi for WinSpool {
    fn default_printer(&self) -> SpoolResult<String> {
        unsafe {
            let mut needed: u32 = 0;
            let _ = GetDefaultPrinterW(None, &mut needed);
            if needed == 0 {
                return Err(SpoolError::NotFound {
                    name: "(default)".to_string(),
                    code: last_error(),
                });
            }

            let mut buf: Vec<u16> = vec![0; needed as usize];
            if !GetDefaultPrinterW(Some(PWSTR(buf.as_mut_ptr())), &mut needed).as_bool() {
                return Err(native("GetDefaultPrinterW"));
            }

            let name = pwstr_to_string(PWSTR(buf.as_mut_ptr()));
            if name.is_empty() {
                return Err(SpoolError::NotFound {
                    name: "(default)".to_string(),
                    code: last_error(),
                });
            }
            Ok(name)
        }
    }

    fn open(&self, name: &str, access: PrinterAccess) -> SpoolResult<RawHandle> {
        let name_w = to_wide(name);
        let desired = match access {
            PrinterAccess::All => PRINTER_ALL_ACCESS,
            PrinterAccess::Use => PRINTER_ACCESS_USE,
        };
        let defaults = PRINTER_DEFAULTSW {
            pDatatype: PWSTR::null(),
            pDevMode: std::ptr::null_mut(),
            DesiredAccess: desired,
        };

        unsafe {
            let mut handle = PRINTER_HANDLE::default();
            if OpenPrinterW(
                PCWSTR::from_raw(name_w.as_ptr()),
                &mut handle,
                Some(&defaults as *const PRINTER_DEFAULTSW),
            )
            .is_err()
            {
                let code = last_error();
                return Err(if code == ERROR_ACCESS_DENIED.0 {
                    SpoolError::AccessDenied {
                        name: name.to_string(),
                        code,
                    }
                } else if code == ERROR_INVALID_PRINTER_NAME.0 || code == ERROR_FILE_NOT_FOUND.0 {
                    SpoolError::NotFound {
                        name: name.to_string(),
                        code,
                    }
                } else {
                    SpoolError::Native {
                        call: "OpenPrinterW",
                        code,
                    }
                });
            }
            Ok(RawHandle(handle.0 as isize))
        }
    }

    fn close(&self, handle: RawHandle) {
        if handle.is_null() {
            return;
        }
        unsafe {
            let _ = ClosePrinter(printer_handle(handle));
        }
    }

    fn info_device_mode(&self, handle: RawHandle) -> SpoolResult<Option<Vec<u8>>> {
        unsafe {
            let h = printer_handle(handle);
            let mut needed: u32 = 0;
            let _ = GetPrinterW(h, 2, None, &mut needed);
            if needed == 0 {
                return Err(SpoolError::Allocation { call: "GetPrinterW" });
            }

            let mut buf: Vec<u8> = vec![0; needed as usize];
            GetPrinterW(h, 2, Some(buf.as_mut_slice()), &mut needed)
                .map_err(|_| native("GetPrinterW"))?;

            let info = &*(buf.as_ptr() as *const PRINTER_INFO_2W);
            if info.pDevMode.is_null() {
                return Ok(None);
            }

            let dm = info.pDevMode;
            let total = (*dm).dmSize as usize + (*dm).dmDriverExtra as usize;
            let bytes = std::slice::from_raw_parts(dm as *const u8, total).to_vec();
            Ok(Some(bytes))
        }
    }

    fn driver_device_mode_len(&self, handle: RawHandle, device: &str) -> SpoolResult<i32> {
        let name_w = to_wide(device);
        let len = unsafe {
            DocumentPropertiesW(
                None,
                printer_handle(handle),
                PCWSTR::from_raw(name_w.as_ptr()),
                None,
                None,
                0,
            )
        };
        if len < 0 {
            return Err(native("DocumentPropertiesW"));
        }
        Ok(len)
    }

    fn read_driver_device_mode(
        &self,
        handle: RawHandle,
        device: &str,
        buf: &mut [u8],
    ) -> SpoolResult<()> {
        let name_w = to_wide(device);
        let rc = unsafe {
            DocumentPropertiesW(
                None,
                printer_handle(handle),
                PCWSTR::from_raw(name_w.as_ptr()),
                Some(buf.as_mut_ptr() as *mut DEVMODEW),
                None,
                DM_OUT_BUFFER,
            )
        };
        if rc < 0 {
            return Err(native("DocumentPropertiesW"));
        }
        Ok(())
    }

    fn merge_device_mode(
        &self,
        handle: RawHandle,
        device: &str,
        buf: &mut [u8],
    ) -> SpoolResult<()> {
        let name_w = to_wide(device);
        let rc = unsafe {
            DocumentPropertiesW(
                None,
                printer_handle(handle),
                PCWSTR::from_raw(name_w.as_ptr()),
                Some(buf.as_mut_ptr() as *mut DEVMODEW),
                Some(buf.as_ptr() as *const DEVMODEW),
                DM_IN_BUFFER | DM_OUT_BUFFER,
            )
        };
        if rc < 0 {
            return Err(SpoolError::DriverRejected { code: last_error() });
        }
        Ok(())
    }

    fn commit_device_mode(&self, handle: RawHandle, device_mode: &[u8]) -> SpoolResult<()> {
        unsafe {
            let h = printer_handle(handle);
            let mut needed: u32 = 0;
            let _ = GetPrinterW(h, 2, None, &mut needed);
            if needed == 0 {
                return Err(SpoolError::Allocation { call: "GetPrinterW" });
            }

            let mut buf: Vec<u8> = vec![0; needed as usize];
            GetPrinterW(h, 2, Some(buf.as_mut_slice()), &mut needed)
                .map_err(|_| native("GetPrinterW"))?;

            // Substitute the mutated device mode. The security descriptor
            // is cleared: SetPrinter rejects a round-tripped descriptor
            // without elevated rights.
            let info = buf.as_mut_ptr() as *mut PRINTER_INFO_2W;
            (*info).pDevMode = device_mode.as_ptr() as *mut DEVMODEW;
            (*info).pSecurityDescriptor = PSECURITY_DESCRIPTOR(std::ptr::null_mut());

            SetPrinterW(h, 2, Some(buf.as_ptr()), 0)
                .map_err(|_| SpoolError::CommitFailed { code: last_error() })?;
        }
        Ok(())
    }

    fn broadcast_change(&self, device: &str) {
        let name_w = to_wide(device);
        let mut result: usize = 0;
        let rc = unsafe {
            SendMessageTimeoutW(
                HWND_BROADCAST,
                WM_DEVMODECHANGE,
                WPARAM(0),
                LPARAM(name_w.as_ptr() as isize),
                SMTO_ABORTIFHUNG,
                1000,
                Some(&mut result),
            )
        };
        if rc.0 == 0 {
            warn!(device, "device mode change broadcast not delivered");
        }
    }

    fn printers(&self) -> SpoolResult<Vec<String>> {
        Ok(enum_printers_level5()?
            .into_iter()
            .filter(|(_, port)| !is_virtual_port(port))
            .map(|(name, _)| name)
            .collect())
    }

    fn printer_port(&self, name: &str) -> SpoolResult<Option<String>> {
        Ok(enum_printers_level5()?
            .into_iter()
            .find(|(printer, _)| printer == name)
            .map(|(_, port)| port))
    }

    fn paper_names(&self, device: &str, port: &str) -> SpoolResult<Vec<String>> {
        let device_w = to_wide(device);
        let port_w = to_wide(port);
        unsafe {
            let count = DeviceCapabilitiesW(
                PCWSTR::from_raw(device_w.as_ptr()),
                PCWSTR::from_raw(port_w.as_ptr()),
                DC_PAPERNAMES,
                None,
                None,
            );
            if count < 0 {
                return Err(native("DeviceCapabilitiesW"));
            }
            if count == 0 {
                return Ok(Vec::new());
            }

            let mut buf: Vec<u16> = vec![0; count as usize * PAPER_NAME_CCH];
            let rc = DeviceCapabilitiesW(
                PCWSTR::from_raw(device_w.as_ptr()),
                PCWSTR::from_raw(port_w.as_ptr()),
                DC_PAPERNAMES,
                Some(PWSTR(buf.as_mut_ptr())),
                None,
            );
            if rc < 0 {
                return Err(native("DeviceCapabilitiesW"));
            }

            Ok(buf
                .chunks(PAPER_NAME_CCH)
                .map(|chunk| {
                    let end = chunk.iter().position(|&u| u == 0).unwrap_or(chunk.len());
                    String::from_utf16_lossy(&chunk[..end])
                })
                .collect())
        }
    }

    fn paper_kinds(&self, device: &str, port: &str) -> SpoolResult<Vec<u16>> {
        let device_w = to_wide(device);
        let port_w = to_wide(port);
        unsafe {
            let count = DeviceCapabilitiesW(
                PCWSTR::from_raw(device_w.as_ptr()),
                PCWSTR::from_raw(port_w.as_ptr()),
                DC_PAPERS,
                None,
                None,
            );
            if count < 0 {
                return Err(native("DeviceCapabilitiesW"));
            }
            if count == 0 {
                return Ok(Vec::new());
            }

            let mut buf: Vec<u16> = vec![0; count as usize];
            let rc = DeviceCapabilitiesW(
                PCWSTR::from_raw(device_w.as_ptr()),
                PCWSTR::from_raw(port_w.as_ptr()),
                DC_PAPERS,
                Some(PWSTR(buf.as_mut_ptr())),
                None,
            );
            if rc < 0 {
                return Err(native("DeviceCapabilitiesW"));
            }
            Ok(buf)
        }
    }

    fn jobs(&self, handle: RawHandle) -> SpoolResult<Vec<JobInfo>> {
        unsafe {
            let h = printer_handle(handle);
            let mut needed: u32 = 0;
            let mut returned: u32 = 0;

            let _ = EnumJobsW(h, 0, u32::MAX, 1, None, &mut needed, &mut returned);
            if needed == 0 {
                return Ok(Vec::new());
            }

            let mut buf: Vec<u8> = vec![0; needed as usize];
            EnumJobsW(
                h,
                0,
                u32::MAX,
                1,
                Some(buf.as_mut_slice()),
                &mut needed,
                &mut returned,
            )
            .map_err(|_| native("EnumJobsW"))?;

            let infos =
                std::slice::from_raw_parts(buf.as_ptr() as *const JOB_INFO_1W, returned as usize);

            Ok(infos
                .iter()
                .map(|info| JobInfo {
                    id: info.JobId,
                    document: pwstr_to_string(info.pDocument),
                    user: pwstr_to_string(info.pUserName),
                    status: info.Status,
                    priority: info.Priority,
                    pages: info.TotalPages,
                })
                .collect())
        }
    }

    fn set_job(&self, handle: RawHandle, job_id: u32, command: JobCommand) -> SpoolResult<()> {
        let control = match command {
            JobCommand::Cancel => JOB_CONTROL_CANCEL,
            JobCommand::Delete => JOB_CONTROL_DELETE,
        };
        unsafe {
            SetJobW(printer_handle(handle), job_id, 0, None, control)
                .map_err(|_| native("SetJobW"))
        }
    }
}
