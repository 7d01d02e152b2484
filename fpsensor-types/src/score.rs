//! Match confidence score

use std::fmt;

/// Similarity score reported by the module for a successful match
///
/// Higher is more similar. The module does not define an upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MatchScore(pub u16);

impl MatchScore {
    pub fn value(self) -> u16 {
        self.0
    }
}

impl From<u16> for MatchScore {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl From<MatchScore> for u16 {
    fn from(score: MatchScore) -> Self {
        score.0
    }
}

impl fmt::Display for MatchScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
