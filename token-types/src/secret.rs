//! The shared secret.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::{DEFAULT_SECRET, MAX_SECRET_LEN};
use crate::TokenError;

/// Secret bytes shared by the device and the host.
///
/// Never transmitted, only hashed locally. The firmware copies the secret
/// into a fixed 64-byte buffer as a NUL-terminated string, so a secret is
/// accepted only if it is at most [`MAX_SECRET_LEN`] bytes and has no NUL
/// byte. Within those bounds every implementation hashes exactly the same
/// bytes.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Secret(Vec<u8>);

impl Secret {
    /// Create a secret from raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        let bytes = bytes.into();
        if bytes.len() > MAX_SECRET_LEN {
            return Err(TokenError::SecretTooLong {
                len: bytes.len(),
                max: MAX_SECRET_LEN,
            });
        }
        if let Some(pos) = bytes.iter().position(|&b| b == 0) {
            return Err(TokenError::SecretContainsNul(pos));
        }
        Ok(Self(bytes))
    }

    /// Create a secret from a hex string.
    pub fn from_hex(encoded: &str) -> Result<Self, TokenError> {
        let bytes =
            hex::decode(encoded.trim()).map_err(|e| TokenError::InvalidSecretHex(e.to_string()))?;
        Self::new(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Secret {
    fn default() -> Self {
        Self(DEFAULT_SECRET.as_bytes().to_vec())
    }
}

impl std::str::FromStr for Secret {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.as_bytes())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({} bytes)", self.0.len())
    }
}
