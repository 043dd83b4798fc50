//! Protocol constants shared by the device and the host.
//!
//! The secret and the window length have no runtime negotiation: both sides
//! must be built (or configured) with the same values.

/// Secret used when no other secret is configured.
pub const DEFAULT_SECRET: &str = "USAB_2025_LAB3";

/// Length of one token window in seconds.
pub const WINDOW_LENGTH_S: u64 = 30;

/// Tokens are reduced modulo this value (six decimal digits).
pub const TOKEN_MODULUS: u32 = 1_000_000;

/// Largest valid token value.
pub const TOKEN_MAX: u32 = TOKEN_MODULUS - 1;

/// Size of the hashing buffer used by the device firmware.
pub const HASH_BUFFER_LEN: usize = 64;

/// Longest secret that still leaves room for the 4-byte window index.
pub const MAX_SECRET_LEN: usize = HASH_BUFFER_LEN - 4;

/// Duration the host renders the synchronization pulse.
pub const SYNC_PULSE_MS: u64 = 800;

/// Device display refresh interval while synchronized.
pub const SYNCED_REFRESH_MS: u64 = 200;

/// Device display refresh interval while waiting for the pulse.
pub const WAITING_REFRESH_MS: u64 = 300;

/// Character columns per display line.
pub const DISPLAY_COLUMNS: usize = 16;

/// Device hardware counter rate: 16 MHz / 100 = 160 kHz.
pub const COUNTER_TICKS_PER_MS: u32 = 160;
