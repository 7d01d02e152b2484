//! SHA-256 digest of a template

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// 32-byte SHA-256 digest
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; Digest::SIZE]);

impl Digest {
    /// Digest size in bytes
    pub const SIZE: usize = 32;

    pub fn new(bytes: [u8; Self::SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::SIZE] {
        &self.0
    }

    /// Lowercase hex rendering, 64 characters
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a 64-character hex string
    ///
    /// # Examples
    ///
    /// ```
    /// use fpsensor_types::Digest;
    ///
    /// let digest = Digest::from_hex(&"ab".repeat(32)).unwrap();
    /// assert_eq!(digest.as_bytes()[0], 0xAB);
    /// ```
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| Error::Parse(format!("digest hex: {}", e)))?;
        let array: [u8; Self::SIZE] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| Error::Parse(format!("digest must be {} bytes, got {}", Self::SIZE, bytes.len())))?;
        Ok(Self(array))
    }
}

impl From<[u8; Digest::SIZE]> for Digest {
    fn from(bytes: [u8; Digest::SIZE]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Digest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}
