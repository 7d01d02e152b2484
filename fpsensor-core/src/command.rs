//! Module instruction codes

use std::fmt;

use crate::error::{Error, Result};

/// Instruction codes carried as the first byte of a command packet
///
/// Codes from the R30x/AS608 user manual.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Instruction {
    // Fingerprint processing
    GenImg = 0x01,
    Img2Tz = 0x02,
    Match = 0x03,
    Search = 0x04,
    RegModel = 0x05,
    Store = 0x06,
    LoadChar = 0x07,
    UpChar = 0x08,
    DownChar = 0x09,
    UpImage = 0x0A,
    DownImage = 0x0B,
    DeleteChar = 0x0C,
    Empty = 0x0D,

    // System
    SetSysPara = 0x0E,
    ReadSysPara = 0x0F,
    SetPwd = 0x12,
    VfyPwd = 0x13,
    SetAddr = 0x15,
    TemplateNum = 0x1D,
    SoftReset = 0x3D,
    HandShake = 0x40,
}

impl Instruction {
    /// Get instruction name as printed in the module manual
    pub fn name(self) -> &'static str {
        match self {
            Self::GenImg => "GenImg",
            Self::Img2Tz => "Img2Tz",
            Self::Match => "Match",
            Self::Search => "Search",
            Self::RegModel => "RegModel",
            Self::Store => "Store",
            Self::LoadChar => "LoadChar",
            Self::UpChar => "UpChar",
            Self::DownChar => "DownChar",
            Self::UpImage => "UpImage",
            Self::DownImage => "DownImage",
            Self::DeleteChar => "DeletChar",
            Self::Empty => "Empty",
            Self::SetSysPara => "SetSysPara",
            Self::ReadSysPara => "ReadSysPara",
            Self::SetPwd => "SetPwd",
            Self::VfyPwd => "VfyPwd",
            Self::SetAddr => "SetAdder",
            Self::TemplateNum => "TempleteNum",
            Self::SoftReset => "SoftRst",
            Self::HandShake => "HandShake",
        }
    }
}

impl From<Instruction> for u8 {
    fn from(instruction: Instruction) -> u8 {
        instruction as u8
    }
}

impl TryFrom<u8> for Instruction {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x01 => Ok(Self::GenImg),
            0x02 => Ok(Self::Img2Tz),
            0x03 => Ok(Self::Match),
            0x04 => Ok(Self::Search),
            0x05 => Ok(Self::RegModel),
            0x06 => Ok(Self::Store),
            0x07 => Ok(Self::LoadChar),
            0x08 => Ok(Self::UpChar),
            0x09 => Ok(Self::DownChar),
            0x0A => Ok(Self::UpImage),
            0x0B => Ok(Self::DownImage),
            0x0C => Ok(Self::DeleteChar),
            0x0D => Ok(Self::Empty),
            0x0E => Ok(Self::SetSysPara),
            0x0F => Ok(Self::ReadSysPara),
            0x12 => Ok(Self::SetPwd),
            0x13 => Ok(Self::VfyPwd),
            0x15 => Ok(Self::SetAddr),
            0x1D => Ok(Self::TemplateNum),
            0x3D => Ok(Self::SoftReset),
            0x40 => Ok(Self::HandShake),
            _ => Err(Error::UnknownInstruction(value)),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_conversion() {
        assert_eq!(u8::from(Instruction::UpChar), 0x08);
        assert_eq!(Instruction::try_from(0x09).unwrap(), Instruction::DownChar);
    }

    #[test]
    fn test_instruction_display() {
        assert_eq!(Instruction::Match.to_string(), "Match(0x03)");
    }

    #[test]
    fn test_unknown_instruction() {
        assert_eq!(
            Instruction::try_from(0xEE),
            Err(Error::UnknownInstruction(0xEE))
        );
    }
}
