//! High-level error types

use std::fmt;

use fpsensor_core::{ConfirmationCode, FrameField};

pub type Result<T> = std::result::Result<T, Error>;

/// Step of an operation an error is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Handshake,
    Probe,
    FirstScan,
    SecondScan,
    Capture,
    QualityCapture,
    RetryCapture,
    CreateModel,
    Download,
    Upload,
    Match,
    Removal,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Self::Handshake => "handshake",
            Self::Probe => "probe",
            Self::FirstScan => "first scan",
            Self::SecondScan => "second scan",
            Self::Capture => "capture",
            Self::QualityCapture => "quality capture",
            Self::RetryCapture => "retry capture",
            Self::CreateModel => "model creation",
            Self::Download => "template download",
            Self::Upload => "template upload",
            Self::Match => "match",
            Self::Removal => "finger removal",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No byte, finger or ack arrived within the bound for this stage
    #[error("Timeout during {0}")]
    Timeout(Stage),

    /// Bad header, unknown or unexpected packet type
    #[error("Framing error: {0}")]
    Framing(#[from] fpsensor_core::Error),

    #[error("Transport error: {0}")]
    Transport(fpsensor_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] fpsensor_types::Error),

    /// The module answered with a non-success confirmation code
    #[error("Device error during {stage}: {code}")]
    Device {
        stage: Stage,
        code: ConfirmationCode,
    },

    /// The two enrollment scans are not of the same finger
    #[error("Enrollment scans do not match")]
    EnrollMismatch,

    /// Verification failed, after the retry where one was allowed
    #[error("No match: {code}")]
    NoMatch { code: ConfirmationCode },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<fpsensor_transport::Error> for Error {
    fn from(err: fpsensor_transport::Error) -> Self {
        match err {
            fpsensor_transport::Error::Protocol(e) => Self::Framing(e),
            other => Self::Transport(other),
        }
    }
}

impl Error {
    /// Attribute a wire timeout to an operation stage
    ///
    /// Byte and frame timeouts become [`Error::Timeout`]; everything else is
    /// returned unchanged.
    pub fn at(self, stage: Stage) -> Self {
        match self {
            Self::Transport(
                fpsensor_transport::Error::ReadTimeout | fpsensor_transport::Error::Timeout { .. },
            ) => Self::Timeout(stage),
            other => other,
        }
    }

    /// Frame field a read stalled on, before the error was attributed to a stage
    pub fn frame_timeout(&self) -> Option<FrameField> {
        match self {
            Self::Transport(e) => e.frame_timeout(),
            _ => None,
        }
    }

    /// Check if this error is any kind of timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Check if repeating the operation might succeed
    ///
    /// Timeouts and capture-quality failures depend on how the finger was
    /// placed; a broken connection or bad configuration does not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::EnrollMismatch | Self::NoMatch { .. } => true,
            Self::Framing(e) => e.is_recoverable(),
            Self::Transport(e) => e.is_timeout(),
            Self::Device { code, .. } => {
                code.is_quality_failure() || *code == ConfirmationCode::ImageFail
            }
            Self::Types(_) | Self::InvalidConfig(_) => false,
        }
    }

    /// Confirmation code carried by the error, if any
    pub fn code(&self) -> Option<ConfirmationCode> {
        match self {
            Self::Device { code, .. } | Self::NoMatch { code } => Some(*code),
            Self::EnrollMismatch => Some(ConfirmationCode::EnrollMismatch),
            _ => None,
        }
    }
}
