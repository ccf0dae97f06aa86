//! # spool-config
//!
//! Programmatic access to the Windows print spooler's configuration
//! surface - no dialogs, no rendering.
//!
//! ## Scope
//!
//! This crate handles printer configuration plumbing:
//! - Device mode read/modify/commit (paper size, orientation, duplex,
//!   custom forms) through the driver's merge-then-commit protocol
//! - Default printer discovery and printer enumeration
//! - Supported-paper catalog lookup
//! - Job queue sweeps (abort all, delete all)
//!
//! Rendering, page content and driver installation stay out; the spooler
//! itself is the system of record and nothing is cached between calls.
//!
//! Native calls sit behind the [`SpoolApi`] trait. On Windows,
//! [`Spooler::system`] binds to the live spooler; elsewhere (and in
//! tests) any `SpoolApi` implementation can be substituted.
//!
//! ## Example
//!
//! ```ignore
//! use spool_config::{ChangeRequest, DMPAPER_A4, Spooler};
//!
//! // Switch the default printer to A4, leave everything else alone.
//! let spooler = Spooler::system();
//! let request = ChangeRequest { paper_size: DMPAPER_A4, ..Default::default() };
//! spooler.apply(None, &request)?;
//!
//! // Inspect the committed configuration.
//! let dm = spooler.device_mode(None)?;
//! assert_eq!(dm.paper_size(), DMPAPER_A4);
//! ```
//!
//! Writers to the same printer are serialized in-process; across
//! processes the last commit wins, as the spooler itself provides no
//! transaction.

mod api;
mod config;
mod devmode;
mod error;
mod jobs;
mod papers;
#[cfg(windows)]
mod winspool;

// Re-exports
pub use api::{PrinterAccess, PrinterGuard, RawHandle, SpoolApi};
pub use config::{ChangeRequest, Spooler};
pub use devmode::{
    CCH_NAME, DMDUP_HORIZONTAL, DMDUP_SIMPLEX, DMDUP_VERTICAL, DMORIENT_LANDSCAPE,
    DMORIENT_PORTRAIT, DMPAPER_A3, DMPAPER_A4, DMPAPER_A5, DMPAPER_LAST, DMPAPER_LEGAL,
    DMPAPER_LETTER, DMPAPER_USER, DM_DEFAULTSOURCE, DM_DUPLEX, DM_FORMNAME, DM_ORIENTATION,
    DM_PAPERLENGTH, DM_PAPERSIZE, DM_PAPERWIDTH, DM_SPECVERSION, DeviceMode, PUBLIC_SIZE,
    PaperSizeClass, duplex_name, orientation_name, paper_size_class,
};
pub use error::{SpoolError, SpoolResult};
pub use jobs::{JobCommand, JobInfo};
pub use papers::PaperInfo;

#[cfg(windows)]
pub use winspool::WinSpool;
