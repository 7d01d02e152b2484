//! Error types for fpsensor-core

use crate::frame::PacketType;

/// Result type alias for fpsensor-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Packet is too short to be valid
    #[error("Packet too short: expected at least {expected} bytes, got {actual} bytes")]
    PacketTooShort {
        expected: usize,
        actual: usize,
    },

    /// Start code did not match 0xEF01
    #[error("Invalid frame header: {:02X} {:02X}", found[0], found[1])]
    BadHeader {
        found: [u8; 2],
    },

    /// Packet identifier byte is not one of the known packet types
    #[error("Unknown packet type: 0x{0:02X}")]
    UnknownPacketType(u8),

    /// Unknown instruction code
    #[error("Unknown instruction code: 0x{0:02X}")]
    UnknownInstruction(u8),

    /// A well-formed frame of the wrong type arrived
    #[error("Unexpected packet: expected {expected}, got {found}")]
    UnexpectedPacket {
        expected: PacketType,
        found: PacketType,
    },

    /// Declared length field cannot hold the checksum
    #[error("Invalid length field: {0} (must be at least 2)")]
    InvalidLength(u16),

    /// Declared length disagrees with the bytes present
    #[error("Length mismatch: header declares {declared} bytes, {actual} present")]
    LengthMismatch {
        declared: usize,
        actual: usize,
    },

    /// Checksum verification failed
    #[error("Checksum mismatch: expected 0x{expected:04X}, received 0x{received:04X}")]
    ChecksumMismatch {
        expected: u16,
        received: u16,
    },

    /// Payload too large
    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge {
        size: usize,
        max: usize,
    },
}

impl Error {
    /// Check if the error means the byte stream is out of step with the framing
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            Self::BadHeader { .. }
                | Self::UnknownPacketType(_)
                | Self::UnexpectedPacket { .. }
                | Self::InvalidLength(_)
                | Self::LengthMismatch { .. }
        )
    }

    /// Check if error is recoverable (retry might succeed)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ChecksumMismatch { .. } | Self::BadHeader { .. })
    }
}
