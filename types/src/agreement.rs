//! The three-valued agreement scale.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A voter's stance on a point. Serialized on the wire as `-1`, `0`, or `1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Agreement {
    Disagree,
    #[default]
    Neutral,
    Agree,
}

impl Agreement {
    pub fn as_i8(self) -> i8 {
        match self {
            Agreement::Disagree => -1,
            Agreement::Neutral => 0,
            Agreement::Agree => 1,
        }
    }

    pub fn from_i8(value: i8) -> Option<Self> {
        match value {
            -1 => Some(Agreement::Disagree),
            0 => Some(Agreement::Neutral),
            1 => Some(Agreement::Agree),
            _ => None,
        }
    }

    /// Whether this stance counts toward `participants` in an aggregate.
    pub fn is_participating(self) -> bool {
        self != Agreement::Neutral
    }
}

impl fmt::Display for Agreement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}

impl Serialize for Agreement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.as_i8())
    }
}

impl<'de> Deserialize<'de> for Agreement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i8::deserialize(deserializer)?;
        Agreement::from_i8(raw)
            .ok_or_else(|| D::Error::custom(format!("agreement must be -1, 0, or 1, got {raw}")))
    }
}
