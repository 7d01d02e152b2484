//! Module frame structure and encoding/decoding

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{
    checksum,
    command::Instruction,
    constants::{BROADCAST_ADDRESS, HEADER},
    error::{Error, Result},
};

/// Packet identifier
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketType {
    /// Host to module instruction
    Command = 0x01,

    /// Intermediate data packet of a multi-packet transfer
    Data = 0x02,

    /// Module reply to a command
    Ack = 0x07,

    /// Final data packet of a multi-packet transfer
    EndData = 0x08,
}

impl PacketType {
    /// Check if this packet carries template/image data
    pub fn is_data(self) -> bool {
        matches!(self, Self::Data | Self::EndData)
    }

    /// Get packet type name
    pub fn name(self) -> &'static str {
        match self {
            Self::Command => "COMMAND",
            Self::Data => "DATA",
            Self::Ack => "ACK",
            Self::EndData => "END_DATA",
        }
    }
}

impl From<PacketType> for u8 {
    fn from(packet_type: PacketType) -> u8 {
        packet_type as u8
    }
}

impl TryFrom<u8> for PacketType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x01 => Ok(Self::Command),
            0x02 => Ok(Self::Data),
            0x07 => Ok(Self::Ack),
            0x08 => Ok(Self::EndData),
            _ => Err(Error::UnknownPacketType(value)),
        }
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u8)
    }
}

/// Frame fields in wire order
///
/// Used to report which part of a frame a streaming read stalled on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FrameField {
    Header,
    Address,
    PacketType,
    Length,
    Payload,
    Checksum,
}

impl fmt::Display for FrameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Header => "header",
            Self::Address => "address",
            Self::PacketType => "packet type",
            Self::Length => "length",
            Self::Payload => "payload",
            Self::Checksum => "checksum",
        };
        f.write_str(name)
    }
}

/// What to do when a received checksum does not match
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ChecksumPolicy {
    /// Accept the frame anyway (behaviour of the stock module drivers)
    #[default]
    Lenient,

    /// Reject the frame with [`Error::ChecksumMismatch`]
    Strict,
}

/// Module protocol frame
///
/// # Frame Structure
///
/// ```text
/// ┌──────────┬──────────┬──────────┬──────────┬───────────┬──────────┐
/// │  Header  │ Address  │   Type   │  Length  │  Payload  │ Checksum │
/// │  2 bytes │ 4 bytes  │  1 byte  │ 2 bytes  │  N bytes  │ 2 bytes  │
/// │  EF 01   │ (BE u32) │          │ (BE u16) │           │ (BE u16) │
/// └──────────┴──────────┴──────────┴──────────┴───────────┴──────────┘
/// ```
///
/// `Length` counts the payload plus the two checksum bytes. All multi-byte
/// values are big-endian.
///
/// # Examples
///
/// ```
/// use fpsensor_core::{ChecksumPolicy, Frame, Instruction};
///
/// let frame = Frame::command(Instruction::GenImg, &[]);
/// let encoded = frame.encode();
///
/// let decoded = Frame::decode(encoded, ChecksumPolicy::Strict).unwrap();
/// assert_eq!(frame, decoded);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    /// Module address
    pub address: u32,

    /// Packet identifier
    pub packet_type: PacketType,

    /// Frame payload (instruction + parameters, ack data, or template data)
    pub payload: Bytes,
}

impl Frame {
    /// Header, address, type and length bytes
    pub const PREFIX_SIZE: usize = 9;

    /// Bytes around the payload (prefix + checksum)
    pub const OVERHEAD: usize = Self::PREFIX_SIZE + 2;

    /// Maximum payload size the length field can describe
    pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize - 2;

    /// Create a frame addressed to the broadcast address
    pub fn new(packet_type: PacketType, payload: impl Into<Bytes>) -> Self {
        Self::with_address(BROADCAST_ADDRESS, packet_type, payload)
    }

    /// Create a frame for a specific module address
    pub fn with_address(address: u32, packet_type: PacketType, payload: impl Into<Bytes>) -> Self {
        Self {
            address,
            packet_type,
            payload: payload.into(),
        }
    }

    /// Create a command frame: instruction code followed by its parameters
    ///
    /// # Examples
    ///
    /// ```
    /// use fpsensor_core::{Frame, Instruction, PacketType};
    ///
    /// let frame = Frame::command(Instruction::UpChar, &[0x01]);
    /// assert_eq!(frame.packet_type, PacketType::Command);
    /// assert_eq!(frame.payload.as_ref(), &[0x08, 0x01]);
    /// ```
    pub fn command(instruction: Instruction, params: &[u8]) -> Self {
        let mut payload = BytesMut::with_capacity(1 + params.len());
        payload.put_u8(instruction.into());
        payload.put_slice(params);
        Self::new(PacketType::Command, payload.freeze())
    }

    /// Value of the length field
    ///
    /// Only meaningful once [`Frame::validate`] has accepted the payload.
    pub fn length(&self) -> u16 {
        (self.payload.len() + 2) as u16
    }

    /// Calculate checksum for this frame
    pub fn checksum(&self) -> u16 {
        checksum::calculate(self.packet_type.into(), self.length(), &self.payload)
    }

    /// Check the payload fits the length field
    pub fn validate(&self) -> Result<()> {
        if self.payload.len() > Self::MAX_PAYLOAD_SIZE {
            return Err(Error::PayloadTooLarge {
                size: self.payload.len(),
                max: Self::MAX_PAYLOAD_SIZE,
            });
        }
        Ok(())
    }

    /// Encode frame to bytes
    ///
    /// The payload must fit the length field; run [`Frame::validate`] first
    /// for payloads that did not come off the wire.
    ///
    /// # Examples
    ///
    /// ```
    /// use fpsensor_core::{Frame, Instruction};
    ///
    /// let bytes = Frame::command(Instruction::GenImg, &[]).encode();
    /// assert_eq!(
    ///     bytes.as_ref(),
    ///     &[0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x00, 0x03, 0x01, 0x00, 0x05]
    /// );
    /// ```
    pub fn encode(&self) -> BytesMut {
        debug_assert!(
            self.payload.len() <= Self::MAX_PAYLOAD_SIZE,
            "payload of {} bytes overflows the length field",
            self.payload.len()
        );

        let mut buf = BytesMut::with_capacity(self.size());

        buf.put_slice(&HEADER);
        buf.put_u32(self.address);
        buf.put_u8(self.packet_type.into());
        buf.put_u16(self.length());
        buf.put_slice(&self.payload);
        buf.put_u16(self.checksum());

        buf
    }

    /// Decode a complete frame from bytes
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Buffer is shorter than the fixed overhead
    /// - Header is not `EF 01`
    /// - Packet type is unknown
    /// - Length field disagrees with the buffer
    /// - Checksum does not match and `policy` is [`ChecksumPolicy::Strict`]
    pub fn decode(mut buf: BytesMut, policy: ChecksumPolicy) -> Result<Self> {
        if buf.len() < Self::OVERHEAD {
            return Err(Error::PacketTooShort {
                expected: Self::OVERHEAD,
                actual: buf.len(),
            });
        }

        let found = [buf.get_u8(), buf.get_u8()];
        if found != HEADER {
            return Err(Error::BadHeader { found });
        }

        let address = buf.get_u32();
        let packet_type = PacketType::try_from(buf.get_u8())?;
        let length = buf.get_u16();

        if length < 2 {
            return Err(Error::InvalidLength(length));
        }
        if buf.remaining() != length as usize {
            return Err(Error::LengthMismatch {
                declared: length as usize,
                actual: buf.remaining(),
            });
        }

        let payload = buf.split_to(length as usize - 2).freeze();
        let checksum_received = buf.get_u16();

        let frame = Self {
            address,
            packet_type,
            payload,
        };

        let checksum_calculated = frame.checksum();
        if policy == ChecksumPolicy::Strict && checksum_calculated != checksum_received {
            return Err(Error::ChecksumMismatch {
                expected: checksum_calculated,
                received: checksum_received,
            });
        }

        Ok(frame)
    }

    /// Get total encoded size
    pub fn size(&self) -> usize {
        Self::OVERHEAD + self.payload.len()
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview = &self.payload[..self.payload.len().min(16)];
        f.debug_struct("Frame")
            .field("address", &format!("0x{:08X}", self.address))
            .field("packet_type", &self.packet_type)
            .field("length", &self.length())
            .field("checksum", &format!("0x{:04X}", self.checksum()))
            .field("payload", &hex::encode(preview))
            .finish()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Frame[{}](addr=0x{:08X}, len={})",
            self.packet_type,
            self.address,
            self.payload.len()
        )
    }
}
