//! CLI command implementations.

pub mod device;
pub mod token;
pub mod verify;
