//! On-module feature buffers

use std::fmt;

use crate::error::{Error, Result};

/// One of the module's two character buffers
///
/// Captures are converted into a slot; `RegModel` merges both slots into a
/// template which is then read from, or written to, slot one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Slot {
    #[default]
    One = 1,
    Two = 2,
}

impl Slot {
    /// Buffer id as sent on the wire
    pub fn id(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Slot {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Slot::One),
            2 => Ok(Slot::Two),
            other => Err(Error::Validation(format!("invalid buffer slot {}", other))),
        }
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> u8 {
        slot.id()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot {}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_ids() {
        assert_eq!(Slot::One.id(), 1);
        assert_eq!(u8::from(Slot::Two), 2);
        assert_eq!(Slot::try_from(2).unwrap(), Slot::Two);
        assert!(Slot::try_from(0).is_err());
        assert!(Slot::try_from(3).is_err());
    }
}
