//! Acknowledgement packets

use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    code::ConfirmationCode,
    error::{Error, Result},
    frame::{Frame, PacketType},
};

/// Parsed acknowledgement: confirmation code plus any trailing data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    /// First payload byte
    pub code: ConfirmationCode,

    /// Payload after the confirmation code
    pub data: Bytes,
}

impl Ack {
    /// Create an ack with no trailing data
    pub fn new(code: ConfirmationCode) -> Self {
        Self::with_data(code, Bytes::new())
    }

    /// Create an ack with trailing data
    pub fn with_data(code: ConfirmationCode, data: impl Into<Bytes>) -> Self {
        Self {
            code,
            data: data.into(),
        }
    }

    /// Parse an ack from a received frame
    ///
    /// # Errors
    ///
    /// - [`Error::UnexpectedPacket`] if the frame is not an ack
    /// - [`Error::PacketTooShort`] if the payload has no confirmation code
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        if frame.packet_type != PacketType::Ack {
            return Err(Error::UnexpectedPacket {
                expected: PacketType::Ack,
                found: frame.packet_type,
            });
        }

        let Some((&code, _)) = frame.payload.split_first() else {
            return Err(Error::PacketTooShort {
                expected: 1,
                actual: 0,
            });
        };

        Ok(Self {
            code: ConfirmationCode::from(code),
            data: frame.payload.slice(1..),
        })
    }

    /// Check if the module reported success
    pub fn is_ok(&self) -> bool {
        self.code.is_ok()
    }

    /// Read a big-endian u16 from the trailing data
    ///
    /// `offset` counts from the first byte after the confirmation code.
    pub fn u16_at(&self, offset: usize) -> Result<u16> {
        match self.data.get(offset..offset + 2) {
            Some(&[hi, lo]) => Ok(u16::from_be_bytes([hi, lo])),
            _ => Err(Error::PacketTooShort {
                expected: 1 + offset + 2,
                actual: 1 + self.data.len(),
            }),
        }
    }

    /// Build the ack frame a module would send
    pub fn to_frame(&self, address: u32) -> Frame {
        let mut payload = BytesMut::with_capacity(1 + self.data.len());
        payload.put_u8(self.code.into());
        payload.put_slice(&self.data);
        Frame::with_address(address, PacketType::Ack, payload.freeze())
    }
}
