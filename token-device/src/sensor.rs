//! Photo sensor abstraction.

use std::collections::VecDeque;
use token_types::Level;

/// A binary light sensor, sampled on demand.
///
/// No debounce or interrupt support is assumed.
pub trait Sensor {
    /// Sample the current level.
    fn level(&mut self) -> Level;
}

impl<S: Sensor + ?Sized> Sensor for &mut S {
    fn level(&mut self) -> Level {
        (**self).level()
    }
}

/// Sensor backed by a closure.
#[derive(Debug, Clone)]
pub struct FnSensor<F>(F);

impl<F: FnMut() -> Level> FnSensor<F> {
    /// Wrap a closure returning the current level.
    pub fn new(read: F) -> Self {
        Self(read)
    }
}

impl<F: FnMut() -> Level> Sensor for FnSensor<F> {
    fn level(&mut self) -> Level {
        (self.0)()
    }
}

/// Sensor that replays a fixed sequence of levels, then holds the last one.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSensor {
    pending: VecDeque<Level>,
    last: Level,
}

impl ScriptedSensor {
    /// Replay `levels` in order.
    pub fn new(levels: impl IntoIterator<Item = Level>) -> Self {
        Self {
            pending: levels.into_iter().collect(),
            last: Level::Low,
        }
    }

    /// Build from 0/1 samples.
    pub fn from_bits(bits: &[u8]) -> Self {
        Self::new(bits.iter().map(|&b| Level::from(b != 0)))
    }

    /// Append more samples.
    pub fn push(&mut self, level: Level) {
        self.pending.push_back(level);
    }

    /// Number of samples not yet read.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl Sensor for ScriptedSensor {
    fn level(&mut self) -> Level {
        if let Some(level) = self.pending.pop_front() {
            self.last = level;
        }
        self.last
    }
}
