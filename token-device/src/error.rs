//! Error types for the device runtime.

use thiserror::Error;

use crate::display::DisplayError;

/// Errors that stop the device runtime.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The display could not be brought up. The token would be invisible,
    /// so the device does not run headless.
    #[error("display unavailable: {0}")]
    DisplayUnavailable(#[source] DisplayError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DeviceError::DisplayUnavailable(DisplayError::NotFound);
        assert_eq!(err.to_string(), "display unavailable: no display responded");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DeviceError>();
    }
}
