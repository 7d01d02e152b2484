//! Transport errors

use std::io;

use fpsensor_core::FrameField;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not connected")]
    NotConnected,

    #[error("Already connected")]
    AlreadyConnected,

    #[error("Connection timeout")]
    ConnectionTimeout,

    /// A single byte did not arrive in time
    #[error("Read timeout")]
    ReadTimeout,

    /// A frame read stalled part-way through
    #[error("Timeout reading frame {field}")]
    Timeout { field: FrameField },

    #[error("Connection closed by remote")]
    ConnectionClosed,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Protocol error: {0}")]
    Protocol(#[from] fpsensor_core::Error),
}

impl Error {
    /// Frame field a frame read stalled on, if this is a frame timeout
    pub fn frame_timeout(&self) -> Option<FrameField> {
        match self {
            Self::Timeout { field } => Some(*field),
            _ => None,
        }
    }

    /// Check if this error is any kind of timeout
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ReadTimeout | Self::Timeout { .. } | Self::ConnectionTimeout
        )
    }
}
