//! # token-device
//!
//! Device side of optotoken: watches a light sensor for the host's
//! synchronization pulse and shows the current token on a two-line
//! character display.
//!
//! ## Components
//!
//! - [`Display`] - the character display collaborator (row text, indicator)
//! - [`Sensor`] - the photo sensor collaborator (one binary level)
//! - [`Reporter`] - the non-blocking polling loop tying clock, sensor,
//!   protocol logic and display together
//!
//! The reporter never sleeps. All pacing comes from comparing clock samples
//! against the time of the last display update, so sensor polling latency
//! stays bounded by one loop iteration.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod display;
mod error;
pub mod reporter;
pub mod sensor;

pub use display::{Display, DisplayError, DisplayLine, MockDisplay, Row};
pub use error::DeviceError;
pub use reporter::{Reporter, ReporterConfig, Step, Update};
pub use sensor::{FnSensor, ScriptedSensor, Sensor};
