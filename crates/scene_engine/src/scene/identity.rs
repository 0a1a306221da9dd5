//! Object identity
//!
//! Every scene object is named by an [`ObjectId`]: two independent random
//! 64-bit halves drawn once at creation. Identities are plain values that
//! survive save/load unchanged and are never derived from memory addresses
//! or insertion order. Comparing two identities says nothing about whether
//! either object is still alive.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between the two halves in the textual form
pub const IDENTITY_SEPARATOR: char = '_';

/// Identity parse errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Missing separator or a half that is not an unsigned integer
    #[error("Malformed identity: {0:?}")]
    MalformedIdentity(String),
}

/// Process-unique, serialization-stable object identity
///
/// Deliberately not `Ord`: identities carry no meaningful order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId {
    high: u64,
    low: u64,
}

impl ObjectId {
    /// Draw a fresh identity from the process-wide random source
    ///
    /// No collision check is performed; with 128 random bits a clash is
    /// treated as impossible.
    pub fn generate() -> Self {
        Self {
            high: rand::random(),
            low: rand::random(),
        }
    }

    /// Build an identity from its two halves
    pub const fn from_parts(high: u64, low: u64) -> Self {
        Self { high, low }
    }

    /// Both halves, high first
    pub const fn parts(&self) -> (u64, u64) {
        (self.high, self.low)
    }

    /// Parse the `<u64>_<u64>` textual form
    pub fn parse(text: &str) -> Result<Self, IdentityError> {
        let malformed = || IdentityError::MalformedIdentity(text.to_string());
        let (high, low) = text.split_once(IDENTITY_SEPARATOR).ok_or_else(malformed)?;
        let high = high.parse::<u64>().map_err(|_| malformed())?;
        let low = low.parse::<u64>().map_err(|_| malformed())?;
        Ok(Self { high, low })
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.high, IDENTITY_SEPARATOR, self.low)
    }
}

impl FromStr for ObjectId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
