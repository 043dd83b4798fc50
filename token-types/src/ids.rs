//! Protocol value types for optotoken.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{TOKEN_MAX, TOKEN_MODULUS};
use crate::TokenError;

/// Index of a fixed-length window counted from the synchronization origin.
///
/// Window 0 starts at the origin. Indices never decrease while a side stays
/// synchronized.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct WindowIndex(u32);

impl WindowIndex {
    /// The first window after synchronization.
    pub const ZERO: Self = Self(0);

    /// Create a window index.
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw index.
    pub fn value(&self) -> u32 {
        self.0
    }

    /// The preceding window, clamped at window 0.
    pub fn previous(&self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    /// The following window, clamped at `u32::MAX`.
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for WindowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for WindowIndex {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// A six-digit token in `[0, 999999]`.
///
/// Displayed zero-padded to six digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Token(u32);

impl Token {
    /// Create a token, rejecting values above 999999.
    pub fn new(value: u32) -> Result<Self, TokenError> {
        if value > TOKEN_MAX {
            return Err(TokenError::TokenOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Reduce a 32-bit hash into the token range.
    pub fn from_hash(hash: u32) -> Self {
        Self(hash % TOKEN_MODULUS)
    }

    /// Get the raw value.
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Check whether a user-entered number equals this token.
    pub fn matches(&self, input: u32) -> bool {
        self.0 == input
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.0)
    }
}

impl TryFrom<u32> for Token {
    type Error = TokenError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

/// Monotonic millisecond reading since a platform-chosen epoch.
///
/// Readings from the device and the host are not comparable; they only agree
/// through the synchronization event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a timestamp from milliseconds.
    pub fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Get the reading in milliseconds.
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, zero if `earlier` is later.
    pub fn millis_since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ms", self.0)
    }
}

/// A sampled binary sensor level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Level {
    /// Dark (no pulse).
    #[default]
    Low,
    /// Light detected.
    High,
}

impl Level {
    /// Check whether the level is high.
    pub fn is_high(&self) -> bool {
        matches!(self, Self::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Self::High
        } else {
            Self::Low
        }
    }
}
