//! Clock alignment between the device and the host.
//!
//! The host starts rendering a light pulse and latches that instant as its
//! origin. The device polls a light sensor and latches the instant it sees
//! the pulse's rising edge. Both origins refer to the same physical moment,
//! up to display latency and sensor response time.
//!
//! The device-side detector holds one bit of state (the previous level) and
//! has no debounce. It fires once per low-to-high transition; every refire
//! replaces the origin.

use token_types::{Level, Timestamp};

/// Synchronization state of one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    /// No origin yet; window indices cannot be computed.
    #[default]
    Unsynchronized,
    /// Origin latched.
    Synchronized {
        /// Clock reading that marks elapsed time zero.
        origin: Timestamp,
    },
}

impl SyncState {
    /// Create a state machine in the Unsynchronized state.
    pub fn new() -> Self {
        Self::Unsynchronized
    }

    /// Latch a new origin, replacing any previous one.
    pub fn synchronize(&mut self, origin: Timestamp) -> SyncEvent {
        let event = match *self {
            Self::Unsynchronized => SyncEvent::Synchronized { origin },
            Self::Synchronized { origin: previous } => {
                SyncEvent::Resynchronized { previous, origin }
            }
        };
        *self = Self::Synchronized { origin };
        event
    }

    /// The latched origin, if synchronized.
    pub fn origin(&self) -> Option<Timestamp> {
        match self {
            Self::Unsynchronized => None,
            Self::Synchronized { origin } => Some(*origin),
        }
    }

    /// Check if an origin is latched.
    pub fn is_synchronized(&self) -> bool {
        matches!(self, Self::Synchronized { .. })
    }
}

/// Emitted when an origin is latched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    /// First synchronization.
    Synchronized {
        /// The new origin.
        origin: Timestamp,
    },
    /// A later pulse replaced the origin.
    Resynchronized {
        /// The replaced origin.
        previous: Timestamp,
        /// The new origin.
        origin: Timestamp,
    },
}

impl SyncEvent {
    /// The origin latched by this event.
    pub fn origin(&self) -> Timestamp {
        match self {
            Self::Synchronized { origin } | Self::Resynchronized { origin, .. } => *origin,
        }
    }
}

/// Rising-edge detector over sampled binary levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeDetector {
    last_level: Level,
}

impl EdgeDetector {
    /// Create a detector primed with the level sampled at start-up.
    ///
    /// A sensor that is already lit at start-up does not count as an edge.
    pub fn new(initial: Level) -> Self {
        Self {
            last_level: initial,
        }
    }

    /// Record a sample. Returns true on a low-to-high transition.
    pub fn observe(&mut self, level: Level) -> bool {
        let rising = !self.last_level.is_high() && level.is_high();
        self.last_level = level;
        rising
    }

    /// Level recorded by the most recent sample.
    pub fn last_level(&self) -> Level {
        self.last_level
    }
}

/// Device-side synchronization: edge detector plus sync state.
#[derive(Debug, Clone, Default)]
pub struct SyncDetector {
    edge: EdgeDetector,
    state: SyncState,
}

impl SyncDetector {
    /// Create an unsynchronized detector primed with the start-up level.
    pub fn new(initial: Level) -> Self {
        Self {
            edge: EdgeDetector::new(initial),
            state: SyncState::Unsynchronized,
        }
    }

    /// Feed one sensor sample taken at `now`.
    ///
    /// Safe to call on every loop iteration; only an exact rising edge has an
    /// effect.
    pub fn poll(&mut self, level: Level, now: Timestamp) -> Option<SyncEvent> {
        if self.edge.observe(level) {
            Some(self.state.synchronize(now))
        } else {
            None
        }
    }

    /// Current synchronization state.
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// The latched origin, if synchronized.
    pub fn origin(&self) -> Option<Timestamp> {
        self.state.origin()
    }

    /// Check if an origin is latched.
    pub fn is_synchronized(&self) -> bool {
        self.state.is_synchronized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(bits: &[u8]) -> Vec<Level> {
        bits.iter().map(|&b| Level::from(b != 0)).collect()
    }

    #[test]
    fn starts_unsynchronized() {
        let detector = SyncDetector::default();
        assert!(!detector.is_synchronized());
        assert_eq!(detector.origin(), None);
        assert_eq!(detector.state(), SyncState::Unsynchronized);
    }

    #[test]
    fn fires_on_each_rising_edge() {
        let mut detector = SyncDetector::new(Level::Low);
        let fired: Vec<usize> = levels(&[0, 0, 1, 1, 0, 1])
            .into_iter()
            .enumerate()
            .filter_map(|(i, level)| {
                detector
                    .poll(level, Timestamp::from_millis(i as u64 * 10))
                    .map(|_| i)
            })
            .collect();

        assert_eq!(fired, vec![2, 5]);
        assert_eq!(detector.origin(), Some(Timestamp::from_millis(50)));
    }

    #[test]
    fn refire_replaces_origin() {
        let mut detector = SyncDetector::new(Level::Low);

        let first = detector.poll(Level::High, Timestamp::from_millis(100));
        assert_eq!(
            first,
            Some(SyncEvent::Synchronized {
                origin: Timestamp::from_millis(100)
            })
        );

        detector.poll(Level::Low, Timestamp::from_millis(200));
        let second = detector.poll(Level::High, Timestamp::from_millis(300));
        assert_eq!(
            second,
            Some(SyncEvent::Resynchronized {
                previous: Timestamp::from_millis(100),
                origin: Timestamp::from_millis(300),
            })
        );
        assert_eq!(detector.origin(), Some(Timestamp::from_millis(300)));
    }

    #[test]
    fn steady_high_does_not_refire() {
        let mut detector = SyncDetector::new(Level::Low);
        assert!(detector.poll(Level::High, Timestamp::from_millis(1)).is_some());
        for ms in 2..100 {
            assert!(detector.poll(Level::High, Timestamp::from_millis(ms)).is_none());
        }
        assert_eq!(detector.origin(), Some(Timestamp::from_millis(1)));
    }

    #[test]
    fn lit_at_startup_needs_a_dark_sample_first() {
        let mut detector = SyncDetector::new(Level::High);
        assert!(detector.poll(Level::High, Timestamp::from_millis(1)).is_none());
        assert!(detector.poll(Level::Low, Timestamp::from_millis(2)).is_none());
        assert!(detector.poll(Level::High, Timestamp::from_millis(3)).is_some());
    }

    #[test]
    fn falling_edge_is_ignored() {
        let mut edge = EdgeDetector::new(Level::High);
        assert!(!edge.observe(Level::Low));
        assert_eq!(edge.last_level(), Level::Low);
    }

    #[test]
    fn host_synchronizes_directly() {
        let mut state = SyncState::new();
        let event = state.synchronize(Timestamp::from_millis(42));
        assert_eq!(event.origin(), Timestamp::from_millis(42));
        assert!(state.is_synchronized());
        assert_eq!(state.origin(), Some(Timestamp::from_millis(42)));
    }
}
