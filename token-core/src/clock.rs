//! Monotonic millisecond clocks.
//!
//! Every side reads time through [`Clock`]. The device wraps a free-running
//! hardware counter ([`CounterClock`]), the host uses the OS monotonic clock
//! ([`InstantClock`]) and tests drive a [`ManualClock`]. Readings from two
//! clocks are never compared directly; they only meet through the
//! synchronization event.

use std::cell::Cell;
use std::time::Instant;
use token_types::Timestamp;

/// Source of monotonic millisecond readings.
pub trait Clock {
    /// Current reading. Never decreases between calls.
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Host clock: milliseconds since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct InstantClock {
    start: Instant,
}

impl InstantClock {
    /// Start a clock at zero.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for InstantClock {
    fn now(&self) -> Timestamp {
        let ms = u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX);
        Timestamp::from_millis(ms)
    }
}

/// Manually driven clock for tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    /// Create a clock reading `start_ms`.
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    /// Jump to an absolute reading. Ignored if it would go backwards.
    pub fn set(&self, ms: u64) {
        if ms > self.now.get() {
            self.now.set(ms);
        }
    }

    /// Move forward by `ms`.
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.now.get())
    }
}

/// A free-running 32-bit hardware counter.
pub trait TickCounter {
    /// Raw counter value. Wraps to zero after `u32::MAX`.
    fn ticks(&self) -> u32;
}

/// Millisecond clock over a wrapping 32-bit tick counter.
///
/// Wrapping deltas are accumulated into a 64-bit tick total, so the reading
/// keeps increasing across counter wraps provided the clock is sampled at
/// least once per wrap period (about 7.4 hours at 160 kHz).
#[derive(Debug)]
pub struct CounterClock<T> {
    counter: T,
    ticks_per_ms: u64,
    last_raw: Cell<u32>,
    total_ticks: Cell<u64>,
}

impl<T: TickCounter> CounterClock<T> {
    /// Wrap a counter running at `ticks_per_ms`. The current counter value
    /// becomes the epoch.
    pub fn new(counter: T, ticks_per_ms: u32) -> Self {
        let last_raw = counter.ticks();
        Self {
            counter,
            ticks_per_ms: u64::from(ticks_per_ms.max(1)),
            last_raw: Cell::new(last_raw),
            total_ticks: Cell::new(0),
        }
    }

    /// Access the underlying counter.
    pub fn counter(&self) -> &T {
        &self.counter
    }
}

impl<T: TickCounter> Clock for CounterClock<T> {
    fn now(&self) -> Timestamp {
        let raw = self.counter.ticks();
        let delta = raw.wrapping_sub(self.last_raw.get());
        self.last_raw.set(raw);
        let total = self.total_ticks.get().saturating_add(u64::from(delta));
        self.total_ticks.set(total);
        Timestamp::from_millis(total / self.ticks_per_ms)
    }
}
