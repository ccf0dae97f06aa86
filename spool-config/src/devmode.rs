//! Fixed-layout device mode codec
//!
//! The spooler exchanges a printer's configuration as a single byte buffer:
//! a fixed public record (device name, version fields, presence mask, the
//! configuration fields) followed by a driver-private tail. This module
//! owns the byte layout: field offsets, the fixed 32-character string
//! widths, and the presence-flag vocabulary that marks which fields carry
//! meaning.
//!
//! [`DeviceMode`] keeps the whole buffer it was decoded from. Reads and
//! writes go through offset-based accessors; bytes outside the documented
//! fields are never touched, so a buffer survives a read-modify-write
//! cycle verbatim. Mutators set the matching presence bit, which is how
//! the driver decides which values to honor on a later merge.

use serde::{Deserialize, Serialize};

use crate::error::{SpoolError, SpoolResult};

/// Presence bit: the orientation field is meaningful
pub const DM_ORIENTATION: u32 = 0x0000_0001;
/// Presence bit: the paper size field is meaningful
pub const DM_PAPERSIZE: u32 = 0x0000_0002;
/// Presence bit: the paper length field is meaningful
pub const DM_PAPERLENGTH: u32 = 0x0000_0004;
/// Presence bit: the paper width field is meaningful
pub const DM_PAPERWIDTH: u32 = 0x0000_0008;
/// Presence bit: the default paper source field is meaningful
pub const DM_DEFAULTSOURCE: u32 = 0x0000_0200;
/// Presence bit: the duplex field is meaningful
pub const DM_DUPLEX: u32 = 0x0000_1000;
/// Presence bit: the form name field is meaningful
pub const DM_FORMNAME: u32 = 0x0001_0000;

/// Device mode specification version written by current drivers
pub const DM_SPECVERSION: u16 = 0x0401;

pub const DMORIENT_PORTRAIT: i16 = 1;
pub const DMORIENT_LANDSCAPE: i16 = 2;

pub const DMDUP_SIMPLEX: i16 = 1;
pub const DMDUP_VERTICAL: i16 = 2;
pub const DMDUP_HORIZONTAL: i16 = 3;

pub const DMPAPER_LETTER: i16 = 1;
pub const DMPAPER_LEGAL: i16 = 5;
pub const DMPAPER_A3: i16 = 8;
pub const DMPAPER_A4: i16 = 9;
pub const DMPAPER_A5: i16 = 11;
/// Highest standard paper code; values above it are driver-defined
pub const DMPAPER_LAST: i16 = 41;
/// Custom, user-defined paper size
pub const DMPAPER_USER: i16 = 256;

/// Fixed character width of the device and form name fields
pub const CCH_NAME: usize = 32;

// Byte offsets of the documented fields. The device name occupies the
// first 64 bytes as UTF-16; the form name sits between the collate and
// log-pixels fields. Everything not listed here is opaque pass-through.
const OFF_DEVICE_NAME: usize = 0;
const OFF_SPEC_VERSION: usize = 64;
const OFF_DRIVER_VERSION: usize = 66;
const OFF_SIZE: usize = 68;
const OFF_DRIVER_EXTRA: usize = 70;
const OFF_FIELDS: usize = 72;
const OFF_ORIENTATION: usize = 76;
const OFF_PAPER_SIZE: usize = 78;
const OFF_PAPER_LENGTH: usize = 80;
const OFF_PAPER_WIDTH: usize = 82;
const OFF_DEFAULT_SOURCE: usize = 88;
const OFF_DUPLEX: usize = 94;
const OFF_FORM_NAME: usize = 102;

/// Size of the public record, device name through the panning fields
pub const PUBLIC_SIZE: usize = 220;

// Decoding needs every documented field in range; the form name ends
// highest.
const MIN_LEN: usize = OFF_FORM_NAME + 2 * CCH_NAME;

/// A printer's device mode descriptor.
///
/// Owns the full buffer the spooler handed out, driver-private tail
/// included. `decode` followed by [`as_bytes`](Self::as_bytes) is a
/// byte-for-byte identity; mutators change exactly the field they name
/// plus its presence bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceMode {
    raw: Vec<u8>,
}

impl DeviceMode {
    /// Decode a device mode buffer received from the spooler
    pub fn decode(raw: &[u8]) -> SpoolResult<Self> {
        Self::from_vec(raw.to_vec())
    }

    /// Decode an owned buffer without copying
    pub fn from_vec(raw: Vec<u8>) -> SpoolResult<Self> {
        if raw.len() < MIN_LEN {
            return Err(SpoolError::Truncated { len: raw.len() });
        }
        Ok(Self { raw })
    }

    /// A blank descriptor for the named device.
    ///
    /// All configuration fields are zero and no presence bit is set; the
    /// record size covers the public area only.
    pub fn blank(device_name: &str) -> Self {
        let mut dm = Self {
            raw: vec![0u8; PUBLIC_SIZE],
        };
        write_name(&mut dm.raw, OFF_DEVICE_NAME, device_name);
        dm.put_u16(OFF_SPEC_VERSION, DM_SPECVERSION);
        dm.put_u16(OFF_SIZE, PUBLIC_SIZE as u16);
        dm
    }

    /// The encoded buffer, exactly as it will be handed to the spooler
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    // -- fixed-width reads --

    fn u16_at(&self, off: usize) -> u16 {
        u16::from_le_bytes([self.raw[off], self.raw[off + 1]])
    }

    fn i16_at(&self, off: usize) -> i16 {
        self.u16_at(off) as i16
    }

    fn u32_at(&self, off: usize) -> u32 {
        u32::from_le_bytes([
            self.raw[off],
            self.raw[off + 1],
            self.raw[off + 2],
            self.raw[off + 3],
        ])
    }

    fn put_u16(&mut self, off: usize, v: u16) {
        self.raw[off..off + 2].copy_from_slice(&v.to_le_bytes());
    }

    fn put_i16(&mut self, off: usize, v: i16) {
        self.put_u16(off, v as u16);
    }

    fn put_u32(&mut self, off: usize, v: u32) {
        self.raw[off..off + 4].copy_from_slice(&v.to_le_bytes());
    }

    fn mark(&mut self, flag: u32) {
        let fields = self.fields() | flag;
        self.put_u32(OFF_FIELDS, fields);
    }

    // -- documented fields --

    /// Driver identity string, at most 31 characters
    pub fn device_name(&self) -> String {
        read_name(&self.raw, OFF_DEVICE_NAME)
    }

    pub fn spec_version(&self) -> u16 {
        self.u16_at(OFF_SPEC_VERSION)
    }

    pub fn driver_version(&self) -> u16 {
        self.u16_at(OFF_DRIVER_VERSION)
    }

    /// Size of the public record as the driver wrote it
    pub fn size(&self) -> u16 {
        self.u16_at(OFF_SIZE)
    }

    /// Bytes of driver-private data following the public record
    pub fn driver_extra(&self) -> u16 {
        self.u16_at(OFF_DRIVER_EXTRA)
    }

    /// Presence mask over the configuration fields
    pub fn fields(&self) -> u32 {
        self.u32_at(OFF_FIELDS)
    }

    pub fn orientation(&self) -> i16 {
        self.i16_at(OFF_ORIENTATION)
    }

    pub fn set_orientation(&mut self, v: i16) {
        self.put_i16(OFF_ORIENTATION, v);
        self.mark(DM_ORIENTATION);
    }

    pub fn paper_size(&self) -> i16 {
        self.i16_at(OFF_PAPER_SIZE)
    }

    pub fn set_paper_size(&mut self, v: i16) {
        self.put_i16(OFF_PAPER_SIZE, v);
        self.mark(DM_PAPERSIZE);
    }

    /// Paper length in tenths of a millimeter
    pub fn paper_length(&self) -> i16 {
        self.i16_at(OFF_PAPER_LENGTH)
    }

    pub fn set_paper_length(&mut self, v: i16) {
        self.put_i16(OFF_PAPER_LENGTH, v);
        self.mark(DM_PAPERLENGTH);
    }

    /// Paper width in tenths of a millimeter
    pub fn paper_width(&self) -> i16 {
        self.i16_at(OFF_PAPER_WIDTH)
    }

    pub fn set_paper_width(&mut self, v: i16) {
        self.put_i16(OFF_PAPER_WIDTH, v);
        self.mark(DM_PAPERWIDTH);
    }

    pub fn default_source(&self) -> i16 {
        self.i16_at(OFF_DEFAULT_SOURCE)
    }

    pub fn set_default_source(&mut self, v: i16) {
        self.put_i16(OFF_DEFAULT_SOURCE, v);
        self.mark(DM_DEFAULTSOURCE);
    }

    pub fn duplex(&self) -> i16 {
        self.i16_at(OFF_DUPLEX)
    }

    pub fn set_duplex(&mut self, v: i16) {
        self.put_i16(OFF_DUPLEX, v);
        self.mark(DM_DUPLEX);
    }

    /// Paper form identifier, at most 31 characters
    pub fn form_name(&self) -> String {
        read_name(&self.raw, OFF_FORM_NAME)
    }

    pub fn set_form_name(&mut self, name: &str) {
        write_name(&mut self.raw, OFF_FORM_NAME, name);
        self.mark(DM_FORMNAME);
    }
}

/// Display name for an orientation code
pub fn orientation_name(v: i16) -> &'static str {
    match v {
        DMORIENT_PORTRAIT => "portrait",
        DMORIENT_LANDSCAPE => "landscape",
        _ => "unknown",
    }
}

/// Display name for a duplex code
pub fn duplex_name(v: i16) -> &'static str {
    match v {
        DMDUP_SIMPLEX => "simplex",
        DMDUP_VERTICAL => "vertical",
        DMDUP_HORIZONTAL => "horizontal",
        _ => "unknown",
    }
}

/// Kind of paper size a code denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperSizeClass {
    /// One of the standard codes 1..=41
    Standard,
    /// The user-defined code 256
    Custom,
    /// Driver-defined or out of the documented range
    DriverDefined,
}

/// Classify a paper size code
pub fn paper_size_class(v: i16) -> PaperSizeClass {
    match v {
        DMPAPER_LETTER..=DMPAPER_LAST => PaperSizeClass::Standard,
        DMPAPER_USER => PaperSizeClass::Custom,
        _ => PaperSizeClass::DriverDefined,
    }
}

// Read a NUL-terminated UTF-16 string from a fixed 32-character slot.
fn read_name(raw: &[u8], off: usize) -> String {
    let mut units = [0u16; CCH_NAME];
    for (i, unit) in units.iter_mut().enumerate() {
        *unit = u16::from_le_bytes([raw[off + 2 * i], raw[off + 2 * i + 1]]);
    }
    let end = units.iter().position(|&u| u == 0).unwrap_or(CCH_NAME);
    String::from_utf16_lossy(&units[..end])
}

// Write a UTF-16 string into a fixed 32-character slot, truncating to 31
// units so the terminator always fits.
fn write_name(raw: &mut [u8], off: usize, name: &str) {
    raw[off..off + 2 * CCH_NAME].fill(0);
    for (i, unit) in name.encode_utf16().take(CCH_NAME - 1).enumerate() {
        raw[off + 2 * i..off + 2 * i + 2].copy_from_slice(&unit.to_le_bytes());
    }
}
