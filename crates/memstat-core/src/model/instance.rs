use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lower bound of the generated value. Keeps the hex form at 8 digits.
const ID_BASE: u32 = 0x1000_0000;

/// Identifier of one running service instance.
///
/// Generated once at startup and handed to every request, so observers can
/// tell restarts apart. Always 8 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(u32);

impl InstanceId {
    /// Generates a fresh id in `[0x10000000, 0x1fffffff)`.
    pub fn generate() -> Self {
        Self::from_offset(rand::thread_rng().gen_range(0..ID_BASE - 1))
    }

    fn from_offset(offset: u32) -> Self {
        Self(ID_BASE + offset)
    }

    /// Raw numeric value.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self(ID_BASE)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Error returned when parsing an [`InstanceId`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid instance id {0:?}: expected 8 hex digits")]
pub struct InvalidInstanceId(String);

impl FromStr for InstanceId {
    type Err = InvalidInstanceId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(InvalidInstanceId(s.to_string()));
        }
        u32::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| InvalidInstanceId(s.to_string()))
    }
}

impl Serialize for InstanceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InstanceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
