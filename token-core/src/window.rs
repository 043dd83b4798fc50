//! Window scheduling.
//!
//! Elapsed time since the synchronization origin maps onto consecutive
//! fixed-length windows:
//!
//! ```text
//! elapsed_s = (now - origin) / 1000
//! window    = elapsed_s / window_secs
//! ```
//!
//! Both divisions truncate, so a boundary is a hard step at exact multiples
//! of the window length. There is no smoothing or look-ahead.

use std::num::NonZeroU64;
use token_types::constants::WINDOW_LENGTH_S;
use token_types::{Timestamp, WindowIndex};

/// Where a moment falls relative to the window grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPosition {
    /// Current window index.
    pub window: WindowIndex,
    /// Whole seconds elapsed since the origin.
    pub elapsed_secs: u64,
    /// Whole seconds left before the next window starts (1..=window_secs).
    pub remaining_secs: u64,
}

/// Result of observing the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowTick {
    /// Position at the observed moment.
    pub position: WindowPosition,
    /// True if the window differs from the one seen on the previous check.
    pub changed: bool,
}

/// Converts elapsed time into window indices and tracks boundary crossings.
#[derive(Debug, Clone)]
pub struct WindowScheduler {
    window_secs: NonZeroU64,
    last: Option<WindowIndex>,
}

impl WindowScheduler {
    /// Create a scheduler with the given window length.
    pub fn new(window_secs: NonZeroU64) -> Self {
        Self {
            window_secs,
            last: None,
        }
    }

    /// Window length in seconds.
    pub fn window_secs(&self) -> u64 {
        self.window_secs.get()
    }

    /// Compute the position of `now` relative to `origin`.
    ///
    /// Pure: does not affect the change tracking.
    pub fn position(&self, origin: Timestamp, now: Timestamp) -> WindowPosition {
        let window_secs = self.window_secs.get();
        let elapsed_secs = now.millis_since(origin) / 1000;
        let window = u32::try_from(elapsed_secs / window_secs).unwrap_or(u32::MAX);
        WindowPosition {
            window: WindowIndex::new(window),
            elapsed_secs,
            remaining_secs: window_secs - elapsed_secs % window_secs,
        }
    }

    /// Compute the window for `now` and report whether it changed since the
    /// previous call.
    ///
    /// The first observation after construction or [`reset`](Self::reset)
    /// always reports a change.
    pub fn observe(&mut self, origin: Timestamp, now: Timestamp) -> WindowTick {
        let position = self.position(origin, now);
        let changed = self.last != Some(position.window);
        self.last = Some(position.window);
        WindowTick { position, changed }
    }

    /// Window reported by the most recent observation.
    pub fn last_window(&self) -> Option<WindowIndex> {
        self.last
    }

    /// Forget the last observed window, e.g. after a new origin is latched.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for WindowScheduler {
    fn default() -> Self {
        Self::new(NonZeroU64::new(WINDOW_LENGTH_S).unwrap_or(NonZeroU64::MIN))
    }
}
