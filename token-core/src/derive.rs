//! Token derivation.
//!
//! `token = FNV-1a-32(secret || window_le) mod 1_000_000`
//!
//! FNV-1a is a fast non-cryptographic hash. The token is a presentation
//! value that both sides can recompute, not an authentication code: six
//! digits can be brute-forced and nothing here is keyed against replay.

use token_types::{Secret, Token, WindowIndex};

/// FNV-1a 32-bit offset basis.
pub const FNV_OFFSET_BASIS: u32 = 2_166_136_261;

/// FNV-1a 32-bit prime.
pub const FNV_PRIME: u32 = 16_777_619;

/// Incremental 32-bit FNV-1a hasher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fnv1a32 {
    state: u32,
}

impl Fnv1a32 {
    /// Start a new hash at the offset basis.
    pub fn new() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }

    /// Feed bytes into the hash, one XOR-then-multiply step per byte.
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.state ^= u32::from(byte);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    /// Current hash value.
    pub fn finish(&self) -> u32 {
        self.state
    }
}

impl Default for Fnv1a32 {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a byte slice with 32-bit FNV-1a.
pub fn fnv1a32(data: &[u8]) -> u32 {
    let mut hasher = Fnv1a32::new();
    hasher.update(data);
    hasher.finish()
}

/// Derive the token for a window.
///
/// Hashes the secret followed by the window index as 4 little-endian bytes.
/// [`Secret`] guarantees the pair fits the firmware's 64-byte buffer, so no
/// truncation ever applies.
pub fn derive(secret: &Secret, window: WindowIndex) -> Token {
    let mut hasher = Fnv1a32::new();
    hasher.update(secret.as_bytes());
    hasher.update(&window.value().to_le_bytes());
    Token::from_hash(hasher.finish())
}
