//! Fixed-size block header supplied by the caller

use crate::error::{Error, Result};
use std::fmt;

/// Opaque header bytes hashed together with each nonce
#[derive(Clone, PartialEq, Eq)]
pub struct Header {
    bytes: Vec<u8>,
}

impl Header {
    /// Create a header, checking it against its declared size
    pub fn new(bytes: Vec<u8>, declared_size: usize) -> Result<Self> {
        if bytes.len() < declared_size {
            return Err(Error::format(format!(
                "Header is shorter than its declared size: expected {} bytes, got {}",
                declared_size,
                bytes.len()
            )));
        }
        if bytes.len() > declared_size {
            return Err(Error::format(format!(
                "Header is longer than its declared size: expected {} bytes, got {}",
                declared_size,
                bytes.len()
            )));
        }
        Ok(Self { bytes })
    }

    /// Zero-filled header of the given size
    pub fn zeroed(size: usize) -> Self {
        Self {
            bytes: vec![0u8; size],
        }
    }

    /// Parse a header from hex
    pub fn from_hex(hex: &str, declared_size: usize) -> Result<Self> {
        let hex = hex.trim().trim_start_matches("0x");
        let bytes = hex::decode(hex)
            .map_err(|e| Error::format(format!("Invalid header hex: {}", e)))?;
        Self::new(bytes, declared_size)
    }

    /// Header bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Header length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the header has no bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for Header {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Header")
            .field("len", &self.bytes.len())
            .field("hex", &hex::encode(&self.bytes))
            .finish()
    }
}
