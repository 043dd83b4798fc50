//! # token-core
//!
//! Pure protocol logic for optotoken (no I/O, instant tests).
//!
//! This crate implements the pieces both the device and the host need to
//! agree on a rotating six-digit token:
//! - [`derive`] - (secret, window) -> token, bit-identical on every side
//! - [`window`] - elapsed time since the origin -> window index
//! - [`sync`] - rising-edge detection and the synchronization state
//! - [`verify`] - the ±1 window tolerance policy
//! - [`clock`] - the monotonic millisecond capability
//!
//! ## Design Philosophy
//!
//! Everything here takes input and produces output without touching
//! hardware, terminals or files. Timestamps and sensor levels are passed in,
//! so the device runtime, the host verifier and the tests all drive the same
//! code with their own clocks.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod derive;
pub mod sync;
pub mod verify;
pub mod window;

pub use clock::{Clock, CounterClock, InstantClock, ManualClock, TickCounter};
pub use derive::{derive, fnv1a32, Fnv1a32};
pub use sync::{EdgeDetector, SyncDetector, SyncEvent, SyncState};
pub use verify::{Candidates, Match, Verdict, Verifier};
pub use window::{WindowPosition, WindowScheduler, WindowTick};
