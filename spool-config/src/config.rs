//! Printer configuration protocol
//!
//! The read path and the write path both work on the device mode
//! descriptor the driver hands out. Reading is probe, allocate, fetch.
//! Writing is read-modify-write with two mandatory trailing phases: the
//! driver's own merge/validate pass over the mutated buffer, then the
//! commit through the printer's info record. Skipping the merge risks a
//! corrupted or silently ignored device mode.

use std::sync::{Arc, LazyLock, Mutex};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::api::{PrinterAccess, PrinterGuard, RawHandle, SpoolApi};
use crate::devmode::{DMDUP_HORIZONTAL, DeviceMode};
use crate::error::{SpoolError, SpoolResult};

// One writer per printer name within this process. Cross-process writers
// still race at the driver; last commit wins.
static WRITER_LOCKS: LazyLock<DashMap<String, Arc<Mutex<()>>>> = LazyLock::new(DashMap::new);

fn writer_lock(name: &str) -> Arc<Mutex<()>> {
    WRITER_LOCKS.entry(name.to_string()).or_default().clone()
}

/// A partial configuration update.
///
/// A field is applied when it differs from its zero/empty value; zero
/// means "leave the printer's current value alone". The convention is
/// kept for compatibility with existing callers and has a known
/// limitation: a zero-valued member can never be requested explicitly.
///
/// Dimensions are in tenths of a millimeter. `duplex` accepts 1 through 3
/// ([`DMDUP_SIMPLEX`](crate::DMDUP_SIMPLEX) through
/// [`DMDUP_HORIZONTAL`](crate::DMDUP_HORIZONTAL)); anything else is
/// rejected before a handle is opened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeRequest {
    pub orientation: i16,
    pub paper_size: i16,
    pub default_source: i16,
    pub duplex: i16,
    pub paper_length: i16,
    pub paper_width: i16,
    pub form_name: String,
}

impl ChangeRequest {
    /// True when no field differs from its unset value
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// Overwrite exactly the requested fields; the setters raise the matching
// presence bits.
fn apply_request(dm: &mut DeviceMode, request: &ChangeRequest) {
    if request.orientation != 0 {
        dm.set_orientation(request.orientation);
    }
    if request.paper_size != 0 {
        dm.set_paper_size(request.paper_size);
    }
    if request.default_source != 0 {
        dm.set_default_source(request.default_source);
    }
    if request.duplex != 0 {
        dm.set_duplex(request.duplex);
    }
    if request.paper_length != 0 {
        dm.set_paper_length(request.paper_length);
    }
    if request.paper_width != 0 {
        dm.set_paper_width(request.paper_width);
    }
    if !request.form_name.is_empty() {
        dm.set_form_name(&request.form_name);
    }
}

/// Entry point for every spooler operation.
///
/// Generic over the [`SpoolApi`] backend; on Windows, `Spooler::system`
/// binds to the live print subsystem. Operations
/// are synchronous and self-contained: each resolves the printer name,
/// opens a handle, does its work and closes before returning. Nothing is
/// cached between calls.
pub struct Spooler<A: SpoolApi> {
    api: A,
}

impl<A: SpoolApi> Spooler<A> {
    pub fn with_api(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Name of the OS default printer
    pub fn default_printer(&self) -> SpoolResult<String> {
        self.api.default_printer()
    }

    /// Installed printer names, virtual ports filtered out
    pub fn printers(&self) -> SpoolResult<Vec<String>> {
        self.api.printers()
    }

    /// An explicit name passes through; absent or empty means the OS
    /// default printer, queried fresh on every call since the default can
    /// change between calls.
    pub fn resolve_printer(&self, printer: Option<&str>) -> SpoolResult<String> {
        match printer {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => self.api.default_printer(),
        }
    }

    /// Read a printer's live device mode descriptor.
    ///
    /// The descriptor comes back with every opaque byte intact, so it can
    /// be mutated and handed to [`apply`](Self::apply) or inspected as-is.
    #[instrument(skip(self))]
    pub fn device_mode(&self, printer: Option<&str>) -> SpoolResult<DeviceMode> {
        let name = self.resolve_printer(printer)?;
        let guard = PrinterGuard::open(&self.api, &name, PrinterAccess::All)?;
        let handle = guard.handle();

        // The info record usually embeds the device mode. When it does
        // not, the driver itself is asked; only then is the printer
        // declared to have no device mode at all.
        if self.api.info_device_mode(handle)?.is_none() {
            debug!(printer = %name, "info record carries no device mode, querying driver");
            let len = self.api.driver_device_mode_len(handle, &name)?;
            if len <= 0 {
                return Err(SpoolError::DeviceModeUnavailable);
            }
            let mut probe = vec![0u8; len as usize];
            self.api.read_driver_device_mode(handle, &name, &mut probe)?;
        }

        // The driver block is re-queried unconditionally and returned as
        // the authoritative descriptor. Redundant with the info-record
        // path on most drivers, kept for the ones where the two disagree.
        let len = self.api.driver_device_mode_len(handle, &name)?;
        if len <= 0 {
            return Err(SpoolError::Allocation {
                call: "driver device mode probe",
            });
        }
        let mut buf = vec![0u8; len as usize];
        self.api.read_driver_device_mode(handle, &name, &mut buf)?;

        DeviceMode::from_vec(buf)
    }

    /// Whether the named form with the given dimensions (tenths of a
    /// millimeter) is the printer's current default.
    #[instrument(skip(self))]
    pub fn is_paper_size(
        &self,
        printer: Option<&str>,
        form: &str,
        width: i16,
        length: i16,
    ) -> SpoolResult<bool> {
        let dm = self.device_mode(printer)?;
        Ok(dm.form_name() == form && dm.paper_width() == width && dm.paper_length() == length)
    }

    /// Apply a partial configuration change to a printer.
    ///
    /// Runs the full read-merge-commit sequence under a per-printer
    /// writer lock, so two in-process writers against the same printer
    /// cannot interleave. The change notification broadcast at the end is
    /// best-effort and never fails the call.
    #[instrument(skip(self, request))]
    pub fn apply(&self, printer: Option<&str>, request: &ChangeRequest) -> SpoolResult<()> {
        // Range check before any native call; 0 is the unset sentinel.
        if request.duplex < 0 || request.duplex > DMDUP_HORIZONTAL {
            return Err(SpoolError::InvalidArgument {
                field: "duplex",
                value: i32::from(request.duplex),
            });
        }

        let name = self.resolve_printer(printer)?;

        let lock = writer_lock(&name);
        let _serial = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let guard = PrinterGuard::open(&self.api, &name, PrinterAccess::All)?;
        let handle = guard.handle();

        let mut dm = self.fetch_for_update(handle, &name)?;
        apply_request(&mut dm, request);

        let mut buf = dm.into_bytes();
        self.api.merge_device_mode(handle, &name, &mut buf)?;
        self.api.commit_device_mode(handle, &buf)?;
        self.api.broadcast_change(&name);

        info!(printer = %name, "configuration committed");
        Ok(())
    }

    // Probe the driver's device mode size and fetch the current block
    // into a buffer with headroom beyond the probed size; the driver may
    // need the scratch space during the later merge.
    fn fetch_for_update(&self, handle: RawHandle, name: &str) -> SpoolResult<DeviceMode> {
        let len = self.api.driver_device_mode_len(handle, name)?;
        if len <= 0 {
            return Err(SpoolError::Allocation {
                call: "driver device mode probe",
            });
        }
        let mut buf = vec![0u8; len as usize * 2];
        self.api.read_driver_device_mode(handle, name, &mut buf)?;
        DeviceMode::from_vec(buf)
    }
}

impl<A: SpoolApi> std::fmt::Debug for Spooler<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Spooler")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devmode::{
        DM_DUPLEX, DM_FORMNAME, DM_PAPERSIZE, DMDUP_VERTICAL, DMPAPER_A4, DeviceMode,
    };

    #[test]
    fn test_apply_request_skips_zero_fields() {
        let mut dm = DeviceMode::blank("dev");
        let request = ChangeRequest {
            paper_size: DMPAPER_A4,
            ..Default::default()
        };
        apply_request(&mut dm, &request);

        assert_eq!(dm.fields(), DM_PAPERSIZE);
        assert_eq!(dm.paper_size(), DMPAPER_A4);
        assert_eq!(dm.duplex(), 0);
        assert_eq!(dm.orientation(), 0);
    }

    #[test]
    fn test_apply_request_sets_each_requested_field() {
        let mut dm = DeviceMode::blank("dev");
        let request = ChangeRequest {
            duplex: DMDUP_VERTICAL,
            form_name: "Letter".into(),
            ..Default::default()
        };
        apply_request(&mut dm, &request);

        assert_eq!(dm.fields(), DM_DUPLEX | DM_FORMNAME);
        assert_eq!(dm.duplex(), DMDUP_VERTICAL);
        assert_eq!(dm.form_name(), "Letter");
    }

    #[test]
    fn test_change_request_is_empty() {
        assert!(ChangeRequest::default().is_empty());
        let request = ChangeRequest {
            orientation: 1,
            ..Default::default()
        };
        assert!(!request.is_empty());
    }

    #[test]
    fn test_change_request_partial_json() {
        let request: ChangeRequest = serde_json::from_str(r#"{"paper_size": 9}"#).unwrap();
        assert_eq!(request.paper_size, 9);
        assert_eq!(request.duplex, 0);
        assert!(request.form_name.is_empty());
    }

    #[test]
    fn test_writer_lock_is_per_name() {
        let a = writer_lock("Printer A");
        let b = writer_lock("Printer B");
        let a2 = writer_lock("Printer A");
        assert!(Arc::ptr_eq(&a, &a2));
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
