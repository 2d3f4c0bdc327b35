use serde::{Deserialize, Serialize};
use std::fmt;

/// Star rating in `1..=5`. Construction clamps instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i16")]
pub struct RatingValue(u8);

impl RatingValue {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn clamped(raw: i64) -> Self {
        Self(raw.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl From<i64> for RatingValue {
    fn from(raw: i64) -> Self {
        Self::clamped(raw)
    }
}

impl From<RatingValue> for i16 {
    fn from(value: RatingValue) -> Self {
        i16::from(value.0)
    }
}

impl fmt::Display for RatingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
