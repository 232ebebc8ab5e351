//! ## xattr
//!
//! Extended attribute decoding

use std::io;

use crate::error::{ShareError, ShareResult};

/// Reserved attribute key whose value carries DOS-style mode bits,
/// hex-encoded behind a two-character prefix (`"0x20"` for a plain
/// archive file).
pub const DOS_MODE_ATTRIBUTE: &str = "system.dos_attr.mode";

/// Decoded extended-attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// DOS mode bits, decoded from the hex encoding
    DosMode(u32),
    /// Any other attribute, passed through verbatim
    Text(String),
}

impl AttributeValue {
    /// Decoded mode bits, if this is the DOS mode attribute
    pub fn as_mode(&self) -> Option<u32> {
        match self {
            AttributeValue::DosMode(mode) => Some(*mode),
            AttributeValue::Text(_) => None,
        }
    }

    /// Raw text, if this is a pass-through attribute
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::DosMode(_) => None,
            AttributeValue::Text(text) => Some(text.as_str()),
        }
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::DosMode(mode) => write!(f, "{}", mode),
            AttributeValue::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Decode the raw value returned by the remote attribute query.
///
/// The DOS mode key drops its two-character prefix and parses the rest
/// as a hexadecimal integer; every other key passes through unchanged.
pub fn decode_attribute(name: &str, raw: String) -> ShareResult<AttributeValue> {
    if name != DOS_MODE_ATTRIBUTE {
        return Ok(AttributeValue::Text(raw));
    }
    let digits = raw.get(2..).unwrap_or_default();
    u32::from_str_radix(digits, 16)
        .map(AttributeValue::DosMode)
        .map_err(|_| {
            ShareError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("malformed dos mode value: {:?}", raw),
            ))
        })
}
