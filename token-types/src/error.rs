//! Error types for optotoken values.

use thiserror::Error;

/// Errors raised when constructing protocol values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Secret does not fit the hashing buffer alongside the window index.
    #[error("secret too long: {len} bytes (max {max})")]
    SecretTooLong {
        /// Actual length in bytes.
        len: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// Secret contains a NUL byte, which the firmware treats as a terminator.
    #[error("secret contains a NUL byte at offset {0}")]
    SecretContainsNul(usize),

    /// Secret given as hex could not be decoded.
    #[error("invalid secret hex: {0}")]
    InvalidSecretHex(String),

    /// Value is outside the six-digit token range.
    #[error("token out of range: {0} (max 999999)")]
    TokenOutOfRange(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TokenError::SecretTooLong { len: 61, max: 60 };
        assert_eq!(err.to_string(), "secret too long: 61 bytes (max 60)");
        assert_eq!(
            TokenError::TokenOutOfRange(1_000_000).to_string(),
            "token out of range: 1000000 (max 999999)"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TokenError>();
    }
}
