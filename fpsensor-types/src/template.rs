//! Fingerprint template buffer

use std::fmt;

use crate::error::{Error, Result};

/// Binary feature template produced by the module
///
/// Always exactly [`Template::SIZE`] bytes. The caller owns it once it has
/// been downloaded; nothing in this crate mutates a template after creation.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Template {
    bytes: Box<[u8; Template::SIZE]>,
}

impl Template {
    /// Template size in bytes
    pub const SIZE: usize = 512;

    /// Create a template from a full-size array
    pub fn new(bytes: [u8; Self::SIZE]) -> Self {
        Self {
            bytes: Box::new(bytes),
        }
    }

    /// Create a template from a slice
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] unless `bytes` is exactly 512 bytes long.
    ///
    /// # Examples
    ///
    /// ```
    /// use fpsensor_types::Template;
    ///
    /// assert!(Template::from_slice(&[0u8; 512]).is_ok());
    /// assert!(Template::from_slice(&[0u8; 511]).is_err());
    /// ```
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; Self::SIZE] = bytes.try_into().map_err(|_| {
            Error::Validation(format!(
                "template must be {} bytes, got {}",
                Self::SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self::new(array))
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; Self::SIZE] {
        &self.bytes
    }

    /// Count of trailing zero bytes
    ///
    /// A degraded download is zero-padded, so a long zero tail is a hint that
    /// the template was truncated on the wire.
    pub fn zero_tail(&self) -> usize {
        self.bytes.iter().rev().take_while(|&&b| b == 0).count()
    }
}

impl AsRef<[u8]> for Template {
    fn as_ref(&self) -> &[u8] {
        &self.bytes[..]
    }
}

impl TryFrom<&[u8]> for Template {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::from_slice(bytes)
    }
}

impl TryFrom<Vec<u8>> for Template {
    type Error = Error;

    fn try_from(bytes: Vec<u8>) -> Result<Self> {
        Self::from_slice(&bytes)
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("head", &hex::encode(&self.bytes[..16]))
            .field("zero_tail", &self.zero_tail())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_template_from_slice() {
        let bytes = vec![0xAA; Template::SIZE];
        let template = Template::from_slice(&bytes).unwrap();
        assert_eq!(template.as_bytes()[..], bytes[..]);
    }

    #[test]
    fn test_template_wrong_size() {
        let result = Template::try_from(vec![0u8; 300]);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_template_zero_tail() {
        let mut bytes = [0u8; Template::SIZE];
        bytes[..300].fill(0x11);
        assert_eq!(Template::new(bytes).zero_tail(), 212);
    }
}
