//! Paper catalog
//!
//! The driver advertises its supported papers as two parallel arrays: a
//! count of fixed-width name strings and a count of 16-bit kind codes,
//! zipped positionally. The capability query addresses the driver by
//! device and port name, so the port is resolved first by enumerating the
//! installed printers.

use serde::Serialize;
use tracing::{instrument, warn};

use crate::api::{PrinterAccess, PrinterGuard, SpoolApi};
use crate::config::Spooler;
use crate::error::SpoolResult;

/// One supported paper: driver-reported name and numeric kind code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaperInfo {
    pub name: String,
    pub kind: u16,
}

impl<A: SpoolApi> Spooler<A> {
    /// Supported papers for a printer, in the driver's order
    #[instrument(skip(self))]
    pub fn papers(&self, printer: Option<&str>) -> SpoolResult<Vec<PaperInfo>> {
        let name = self.resolve_printer(printer)?;
        // Read-only access suffices; opening also surfaces NotFound for a
        // bogus name before the capability calls run.
        let _guard = PrinterGuard::open(self.api(), &name, PrinterAccess::Use)?;

        let port = self.api().printer_port(&name)?.unwrap_or_default();
        let names = self.api().paper_names(&name, &port)?;
        let kinds = self.api().paper_kinds(&name, &port)?;

        if names.len() != kinds.len() {
            warn!(
                printer = %name,
                names = names.len(),
                kinds = kinds.len(),
                "driver returned unequal paper arrays"
            );
        }

        Ok(names
            .into_iter()
            .zip(kinds)
            .map(|(name, kind)| PaperInfo { name, kind })
            .collect())
    }

    /// Numeric kind code for a paper name.
    ///
    /// Returns 0 when the driver does not advertise the name; 0 is never
    /// a real paper kind, so no error is raised for an unknown name.
    #[instrument(skip(self))]
    pub fn paper_kind(&self, printer: Option<&str>, paper: &str) -> SpoolResult<u16> {
        Ok(self
            .papers(printer)?
            .into_iter()
            .find(|p| p.name == paper)
            .map(|p| p.kind)
            .unwrap_or(0))
    }
}
