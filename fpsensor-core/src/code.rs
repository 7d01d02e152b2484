//! Confirmation codes returned in the first byte of every ack payload

use std::fmt;

/// Module confirmation code
///
/// Unknown values are carried verbatim in [`ConfirmationCode::Other`] so that
/// callers always see the byte the module actually sent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ConfirmationCode {
    Ok,
    PacketReceiveError,
    NoFinger,
    ImageFail,
    ImageMess,
    FeatureFail,
    NoMatch,
    NotFound,
    EnrollMismatch,
    BadLocation,
    DatabaseReadFail,
    UploadFeatureFail,
    PacketResponseFail,
    UploadFail,
    DeleteFail,
    DatabaseClearFail,
    PasswordFail,
    InvalidImage,
    FlashError,
    InvalidRegister,
    AddressCode,
    PasswordVerify,
    BadPacket,
    Timeout,
    Other(u8),
}

impl ConfirmationCode {
    /// Get raw code byte
    pub fn code(self) -> u8 {
        match self {
            Self::Ok => 0x00,
            Self::PacketReceiveError => 0x01,
            Self::NoFinger => 0x02,
            Self::ImageFail => 0x03,
            Self::ImageMess => 0x06,
            Self::FeatureFail => 0x07,
            Self::NoMatch => 0x08,
            Self::NotFound => 0x09,
            Self::EnrollMismatch => 0x0A,
            Self::BadLocation => 0x0B,
            Self::DatabaseReadFail => 0x0C,
            Self::UploadFeatureFail => 0x0D,
            Self::PacketResponseFail => 0x0E,
            Self::UploadFail => 0x0F,
            Self::DeleteFail => 0x10,
            Self::DatabaseClearFail => 0x11,
            Self::PasswordFail => 0x13,
            Self::InvalidImage => 0x15,
            Self::FlashError => 0x18,
            Self::InvalidRegister => 0x1A,
            Self::AddressCode => 0x20,
            Self::PasswordVerify => 0x21,
            Self::BadPacket => 0xFE,
            Self::Timeout => 0xFF,
            Self::Other(code) => code,
        }
    }

    /// Check if this is the success code
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Check if conversion failed because of the image rather than the module
    ///
    /// These are the two codes a quality-seeking capture loop retries on.
    pub fn is_quality_failure(self) -> bool {
        matches!(self, Self::ImageMess | Self::FeatureFail)
    }

    /// Get code name
    pub fn name(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::PacketReceiveError => "PACKET_RECEIVE_ERR",
            Self::NoFinger => "NO_FINGER",
            Self::ImageFail => "IMAGE_FAIL",
            Self::ImageMess => "IMAGE_MESS",
            Self::FeatureFail => "FEATURE_FAIL",
            Self::NoMatch => "NO_MATCH",
            Self::NotFound => "NOT_FOUND",
            Self::EnrollMismatch => "ENROLL_MISMATCH",
            Self::BadLocation => "BAD_LOCATION",
            Self::DatabaseReadFail => "DB_READ_FAIL",
            Self::UploadFeatureFail => "UPLOAD_FEATURE_FAIL",
            Self::PacketResponseFail => "PACKET_RESPONSE_FAIL",
            Self::UploadFail => "UPLOAD_FAIL",
            Self::DeleteFail => "DELETE_FAIL",
            Self::DatabaseClearFail => "DB_CLEAR_FAIL",
            Self::PasswordFail => "PASS_FAIL",
            Self::InvalidImage => "INVALID_IMAGE",
            Self::FlashError => "FLASH_ERR",
            Self::InvalidRegister => "INVALID_REG",
            Self::AddressCode => "ADDR_CODE",
            Self::PasswordVerify => "PASS_VERIFY",
            Self::BadPacket => "BAD_PACKET",
            Self::Timeout => "TIMEOUT",
            Self::Other(_) => "UNKNOWN",
        }
    }
}

impl From<u8> for ConfirmationCode {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::Ok,
            0x01 => Self::PacketReceiveError,
            0x02 => Self::NoFinger,
            0x03 => Self::ImageFail,
            0x06 => Self::ImageMess,
            0x07 => Self::FeatureFail,
            0x08 => Self::NoMatch,
            0x09 => Self::NotFound,
            0x0A => Self::EnrollMismatch,
            0x0B => Self::BadLocation,
            0x0C => Self::DatabaseReadFail,
            0x0D => Self::UploadFeatureFail,
            0x0E => Self::PacketResponseFail,
            0x0F => Self::UploadFail,
            0x10 => Self::DeleteFail,
            0x11 => Self::DatabaseClearFail,
            0x13 => Self::PasswordFail,
            0x15 => Self::InvalidImage,
            0x18 => Self::FlashError,
            0x1A => Self::InvalidRegister,
            0x20 => Self::AddressCode,
            0x21 => Self::PasswordVerify,
            0xFE => Self::BadPacket,
            0xFF => Self::Timeout,
            other => Self::Other(other),
        }
    }
}

impl From<ConfirmationCode> for u8 {
    fn from(code: ConfirmationCode) -> u8 {
        code.code()
    }
}

impl fmt::Display for ConfirmationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), self.code())
    }
}
