//! Error types for spooler configuration operations

use thiserror::Error;

/// Spooler operation failures.
///
/// Native failures carry the Win32 error code the spooler reported, so
/// callers can tell a missing printer from a permission problem without
/// parsing message text.
#[derive(Debug, Error)]
pub enum SpoolError {
    /// No printer with the given name is installed
    #[error("printer not found: {name} (os error {code})")]
    NotFound { name: String, code: u32 },

    /// The spooler refused the requested access level.
    ///
    /// Shared and network printers commonly reject full access; retrying
    /// with [`PrinterAccess::Use`](crate::PrinterAccess::Use) is a caller
    /// decision and is never attempted internally.
    #[error("access denied to printer {name} (os error {code})")]
    AccessDenied { name: String, code: u32 },

    /// A buffer size probe returned zero or a negative size
    #[error("{call} reported no buffer size")]
    Allocation { call: &'static str },

    /// Neither the printer info record nor the driver returned a device mode
    #[error("printer reported no device mode data")]
    DeviceModeUnavailable,

    /// A change request field is outside its valid range
    #[error("invalid {field} value: {value}")]
    InvalidArgument { field: &'static str, value: i32 },

    /// The driver's own validation pass rejected the device mode
    #[error("driver rejected device mode (os error {code})")]
    DriverRejected { code: u32 },

    /// The spooler refused to commit the updated configuration
    #[error("device mode commit failed (os error {code})")]
    CommitFailed { code: u32 },

    /// A device mode buffer is too short to hold the documented fields
    #[error("device mode buffer too small: {len} bytes")]
    Truncated { len: usize },

    /// Any other native spooler call failure
    #[error("{call} failed (os error {code})")]
    Native { call: &'static str, code: u32 },
}

/// Result type for spooler operations
pub type SpoolResult<T> = std::result::Result<T, SpoolError>;
