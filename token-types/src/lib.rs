//! # token-types
//!
//! Value types for the optotoken optical-sync token protocol.
//!
//! This crate provides the foundational types used across all optotoken crates:
//! - [`Secret`] - The shared secret both sides derive tokens from
//! - [`WindowIndex`], [`Token`], [`Timestamp`] - Protocol values
//! - [`Level`] - A sampled binary sensor level
//! - [`TokenError`] - Error types
//! - [`constants`] - Values that must match on the device and the host

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
mod error;
mod ids;
mod secret;

pub use error::TokenError;
pub use ids::{Level, Timestamp, Token, WindowIndex};
pub use secret::Secret;
