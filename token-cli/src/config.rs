//! Configuration loading for optotoken.
//!
//! Configuration is loaded from a TOML file: `--config <path>` if given,
//! otherwise `optotoken.toml` in the platform config directory. A missing
//! default file means built-in defaults. Every section and field is
//! optional.
//!
//! ```toml
//! [token]
//! secret = "USAB_2025_LAB3"   # or secret_hex = "..."
//! window_secs = 30
//!
//! [host]
//! pulse_ms = 800
//!
//! [device]
//! synced_refresh_ms = 200
//! waiting_refresh_ms = 300
//! ```
//!
//! The secret and window length must be identical on the device and the
//! host. Nothing is negotiated at runtime.

use serde::Deserialize;
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use token_device::ReporterConfig;
use token_types::constants::{
    SYNCED_REFRESH_MS, SYNC_PULSE_MS, WAITING_REFRESH_MS, WINDOW_LENGTH_S,
};
use token_types::{Secret, TokenError};

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Shared protocol parameters.
    pub token: TokenConfig,
    /// Host verifier settings.
    pub host: HostConfig,
    /// Device runtime settings.
    pub device: DeviceConfig,
}

/// Shared protocol parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenConfig {
    /// Secret as text.
    pub secret: Option<String>,
    /// Secret as hex bytes.
    pub secret_hex: Option<String>,
    /// Window length in seconds (default: 30).
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

/// Host verifier settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    /// How long the sync pulse stays lit (default: 800).
    #[serde(default = "default_pulse_ms")]
    pub pulse_ms: u64,
    /// Pulse block width in terminal columns (default: 32).
    #[serde(default = "default_pulse_width")]
    pub pulse_width: u16,
    /// Pulse block height in terminal rows (default: 8).
    #[serde(default = "default_pulse_height")]
    pub pulse_height: u16,
}

/// Device runtime settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    /// Elapsed-time refresh interval while synchronized (default: 200).
    #[serde(default = "default_synced_refresh_ms")]
    pub synced_refresh_ms: u64,
    /// Waiting-line refresh interval (default: 300).
    #[serde(default = "default_waiting_refresh_ms")]
    pub waiting_refresh_ms: u64,
}

// Default value functions
fn default_window_secs() -> u64 {
    WINDOW_LENGTH_S
}

fn default_pulse_ms() -> u64 {
    SYNC_PULSE_MS
}

fn default_pulse_width() -> u16 {
    32
}

fn default_pulse_height() -> u16 {
    8
}

fn default_synced_refresh_ms() -> u64 {
    SYNCED_REFRESH_MS
}

fn default_waiting_refresh_ms() -> u64 {
    WAITING_REFRESH_MS
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: None,
            secret_hex: None,
            window_secs: default_window_secs(),
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            pulse_ms: default_pulse_ms(),
            pulse_width: default_pulse_width(),
            pulse_height: default_pulse_height(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            synced_refresh_ms: default_synced_refresh_ms(),
            waiting_refresh_ms: default_waiting_refresh_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// values fail validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the explicit file if given, else the default file if it exists,
    /// else built-in defaults. Returns the file actually read.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }
        match default_config_path() {
            Some(path) if path.exists() => Ok((Self::from_file(&path)?, Some(path))),
            _ => Ok((Self::default(), None)),
        }
    }

    /// Check values that deserialization alone cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.secret()?;
        self.window_secs()?;
        Ok(())
    }

    /// The configured secret, or the built-in one.
    pub fn secret(&self) -> Result<Secret, ConfigError> {
        match (&self.token.secret, &self.token.secret_hex) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingSecrets),
            (Some(text), None) => text.parse().map_err(ConfigError::InvalidSecret),
            (None, Some(encoded)) => Secret::from_hex(encoded).map_err(ConfigError::InvalidSecret),
            (None, None) => Ok(Secret::default()),
        }
    }

    /// The window length, guaranteed non-zero.
    pub fn window_secs(&self) -> Result<NonZeroU64, ConfigError> {
        NonZeroU64::new(self.token.window_secs).ok_or(ConfigError::ZeroWindow)
    }

    /// Timing configuration for the device reporter.
    pub fn reporter_config(&self) -> Result<ReporterConfig, ConfigError> {
        Ok(ReporterConfig {
            window_secs: self.window_secs()?,
            synced_refresh_ms: self.device.synced_refresh_ms,
            waiting_refresh_ms: self.device.waiting_refresh_ms,
        })
    }
}

/// Platform default location of the configuration file.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "ydun", "optotoken")
        .map(|dirs| dirs.config_dir().join("optotoken.toml"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// Secret rejected.
    #[error("invalid secret: {0}")]
    InvalidSecret(#[source] TokenError),
    /// Both `secret` and `secret_hex` were given.
    #[error("set either token.secret or token.secret_hex, not both")]
    ConflictingSecrets,
    /// Window length of zero.
    #[error("token.window_secs must be greater than zero")]
    ZeroWindow,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_matches_protocol_constants() {
        let config = Config::default();
        assert_eq!(config.token.window_secs, 30);
        assert_eq!(config.host.pulse_ms, 800);
        assert_eq!(config.device.synced_refresh_ms, 200);
        assert_eq!(config.device.waiting_refresh_ms, 300);
        assert_eq!(config.secret().unwrap(), Secret::default());
    }

    #[test]
    fn config_from_toml_string() {
        let toml = r#"
[token]
secret = "LAB_SECRET"
window_secs = 60

[host]
pulse_ms = 500

[device]
synced_refresh_ms = 100
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.secret().unwrap().as_bytes(), b"LAB_SECRET");
        assert_eq!(config.window_secs().unwrap().get(), 60);
        assert_eq!(config.host.pulse_ms, 500);
        assert_eq!(config.host.pulse_height, 8);
        assert_eq!(config.device.synced_refresh_ms, 100);
        assert_eq!(config.device.waiting_refresh_ms, 300);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.token.window_secs, 30);
        assert!(config.token.secret.is_none());
    }

    #[test]
    fn secret_hex_is_decoded() {
        let config: Config = toml::from_str(
            r#"
[token]
secret_hex = "555341425f323032355f4c414233"
"#,
        )
        .unwrap();
        assert_eq!(config.secret().unwrap(), Secret::default());
    }

    #[test]
    fn both_secrets_conflict() {
        let config: Config = toml::from_str(
            r#"
[token]
secret = "a"
secret_hex = "61"
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ConflictingSecrets)
        ));
    }

    #[test]
    fn zero_window_rejected() {
        let config: Config = toml::from_str("[token]\nwindow_secs = 0\n").unwrap();
        assert!(matches!(config.window_secs(), Err(ConfigError::ZeroWindow)));
        assert!(config.reporter_config().is_err());
    }

    #[test]
    fn unknown_field_rejected() {
        let result: Result<Config, _> = toml::from_str("[token]\nsecrett = \"x\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn from_file_reads_and_validates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("optotoken.toml");
        std::fs::write(&path, "[token]\nsecret = \"abc\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.secret().unwrap().as_bytes(), b"abc");

        let long = "x".repeat(61);
        std::fs::write(&path, format!("[token]\nsecret = \"{long}\"\n")).unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::InvalidSecret(TokenError::SecretTooLong { .. }))
        ));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn load_reports_source_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.toml");
        std::fs::write(&path, "").unwrap();
        let (_, source) = Config::load(Some(&path)).unwrap();
        assert_eq!(source, Some(path));
    }

    #[test]
    fn reporter_config_carries_intervals() {
        let config: Config =
            toml::from_str("[device]\nsynced_refresh_ms = 50\nwaiting_refresh_ms = 75\n").unwrap();
        let reporter = config.reporter_config().unwrap();
        assert_eq!(reporter.window_secs.get(), 30);
        assert_eq!(reporter.synced_refresh_ms, 50);
        assert_eq!(reporter.waiting_refresh_ms, 75);
    }
}
