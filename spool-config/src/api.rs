//! The native spooler seam
//!
//! Every native call the library makes goes through [`SpoolApi`]. The
//! portable protocol code (reader, writer, paper catalog, job sweeps) is
//! generic over this trait; the Windows backend realizes it against
//! winspool, and tests substitute a recording double.

use crate::error::SpoolResult;
use crate::jobs::{JobCommand, JobInfo};

/// Access level requested when opening a printer.
///
/// `All` is the default for configuration work. Shared and network
/// printers commonly reject it; callers that want the reduced-access
/// retry documented on [`SpoolError::AccessDenied`](crate::SpoolError::AccessDenied)
/// reopen with `Use` themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrinterAccess {
    #[default]
    All,
    Use,
}

/// Opaque printer handle as issued by the backend.
///
/// Zero is the null handle; closing it is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawHandle(pub isize);

impl RawHandle {
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

/// Narrow interface over the host print subsystem.
///
/// Variable-size queries keep the spooler's probe-then-fetch shape: the
/// caller asks for the byte count, allocates, and asks again to fill the
/// buffer. Methods taking a `device` name need it because the driver-level
/// calls address the driver by name rather than by handle.
pub trait SpoolApi {
    /// Name of the OS default printer
    fn default_printer(&self) -> SpoolResult<String>;

    /// Acquire an exclusive handle to the named printer
    fn open(&self, name: &str, access: PrinterAccess) -> SpoolResult<RawHandle>;

    /// Release a handle. Safe to call with the null handle.
    fn close(&self, handle: RawHandle);

    /// Device mode embedded in the printer's info record, if the record
    /// carries one.
    fn info_device_mode(&self, handle: RawHandle) -> SpoolResult<Option<Vec<u8>>>;

    /// Byte count the driver reports for its device mode block
    fn driver_device_mode_len(&self, handle: RawHandle, device: &str) -> SpoolResult<i32>;

    /// Fill `buf` with the driver's current device mode block
    fn read_driver_device_mode(
        &self,
        handle: RawHandle,
        device: &str,
        buf: &mut [u8],
    ) -> SpoolResult<()>;

    /// Driver merge/validate pass over `buf`, in place; the buffer is both
    /// source and destination so driver-private data gets reconciled.
    fn merge_device_mode(&self, handle: RawHandle, device: &str, buf: &mut [u8])
    -> SpoolResult<()>;

    /// Substitute `device_mode` into the printer's info record and commit
    /// it to the spooler.
    fn commit_device_mode(&self, handle: RawHandle, device_mode: &[u8]) -> SpoolResult<()>;

    /// Best-effort notification to other processes that device settings
    /// changed. Failures are logged, never surfaced.
    fn broadcast_change(&self, device: &str);

    /// Names of installed local and connected printers, virtual ports
    /// filtered out.
    fn printers(&self) -> SpoolResult<Vec<String>>;

    /// Port the named printer is connected through, if the printer exists
    fn printer_port(&self, name: &str) -> SpoolResult<Option<String>>;

    /// Driver capability query: supported paper names, positionally
    /// parallel to [`paper_kinds`](Self::paper_kinds).
    fn paper_names(&self, device: &str, port: &str) -> SpoolResult<Vec<String>>;

    /// Driver capability query: supported paper kind codes
    fn paper_kinds(&self, device: &str, port: &str) -> SpoolResult<Vec<u16>>;

    /// Outstanding jobs on the printer's queue
    fn jobs(&self, handle: RawHandle) -> SpoolResult<Vec<JobInfo>>;

    /// Issue a control command against a single job
    fn set_job(&self, handle: RawHandle, job_id: u32, command: JobCommand) -> SpoolResult<()>;
}

/// Scoped printer handle.
///
/// Closes on drop, exactly once, on every exit path.
pub struct PrinterGuard<'a, A: SpoolApi + ?Sized> {
    api: &'a A,
    handle: Option<RawHandle>,
}

impl<'a, A: SpoolApi + ?Sized> PrinterGuard<'a, A> {
    pub fn open(api: &'a A, name: &str, access: PrinterAccess) -> SpoolResult<Self> {
        let handle = api.open(name, access)?;
        Ok(Self {
            api,
            handle: Some(handle),
        })
    }

    pub fn handle(&self) -> RawHandle {
        self.handle.unwrap_or(RawHandle(0))
    }
}

impl<A: SpoolApi + ?Sized> Drop for PrinterGuard<'_, A> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.api.close(handle);
        }
    }
}
