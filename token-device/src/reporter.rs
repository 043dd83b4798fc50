//! Device reporting loop.
//!
//! Each [`Reporter::step`] takes one clock sample and one sensor sample and
//! does at most one display update:
//!
//! 1. Feed the sensor level to the sync detector; a rising edge latches the
//!    sample as the new origin.
//! 2. Synchronized and the window changed: derive the token, redraw both rows.
//! 3. Synchronized, same window, refresh interval elapsed: redraw the
//!    elapsed-time row only.
//! 4. Not synchronized, refresh interval elapsed: redraw the waiting row with
//!    a toggling dot.
//!
//! The same clock sample drives the edge detector, the window computation
//! and the refresh throttling. Nothing in a step blocks.

use std::num::NonZeroU64;
use token_core::{derive, Clock, SyncDetector, SyncEvent, WindowScheduler};
use token_types::constants::{SYNCED_REFRESH_MS, WAITING_REFRESH_MS, WINDOW_LENGTH_S};
use token_types::{Secret, Timestamp, Token, WindowIndex};

use crate::display::{Display, DisplayLine, Row};
use crate::sensor::Sensor;
use crate::DeviceError;

/// Timing configuration for the reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReporterConfig {
    /// Window length in seconds (must match the host).
    pub window_secs: NonZeroU64,
    /// Elapsed-time refresh interval while synchronized.
    pub synced_refresh_ms: u64,
    /// Waiting-line refresh interval while unsynchronized.
    pub waiting_refresh_ms: u64,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            window_secs: NonZeroU64::new(WINDOW_LENGTH_S).unwrap_or(NonZeroU64::MIN),
            synced_refresh_ms: SYNCED_REFRESH_MS,
            waiting_refresh_ms: WAITING_REFRESH_MS,
        }
    }
}

/// What one loop iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Clock sample the iteration used.
    pub now: Timestamp,
    /// Origin latched during this iteration, if any.
    pub sync: Option<SyncEvent>,
    /// Display update performed.
    pub update: Update,
}

/// Display update performed by one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    /// Nothing was due.
    None,
    /// New window: both rows redrawn with a fresh token.
    Token {
        /// The new window.
        window: WindowIndex,
        /// Its token.
        token: Token,
        /// Whole seconds since the origin.
        elapsed_secs: u64,
    },
    /// Elapsed-time row refreshed.
    Elapsed {
        /// Whole seconds since the origin.
        elapsed_secs: u64,
    },
    /// Waiting row refreshed.
    Waiting {
        /// State of the liveness dot after the toggle.
        dot: bool,
    },
}

/// The device loop context: clock, sensor, display and protocol state.
pub struct Reporter<C, S, D> {
    clock: C,
    sensor: S,
    display: D,
    secret: Secret,
    config: ReporterConfig,
    detector: SyncDetector,
    scheduler: WindowScheduler,
    rows: [DisplayLine; 2],
    last_ui: Timestamp,
    dot: bool,
    token: Option<Token>,
}

impl<C, S, D> std::fmt::Debug for Reporter<C, S, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("config", &self.config)
            .field("sync", &self.detector.state())
            .field("window", &self.scheduler.last_window())
            .field("last_ui", &self.last_ui)
            .finish_non_exhaustive()
    }
}

impl<C: Clock, S: Sensor, D: Display> Reporter<C, S, D> {
    /// Bring the display up and prime the detector with the current sensor
    /// level.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::DisplayUnavailable`] if the display cannot be
    /// started or the initial screen cannot be drawn. The caller must halt:
    /// without a display the token is unobservable.
    pub fn new(
        config: ReporterConfig,
        secret: Secret,
        clock: C,
        mut sensor: S,
        mut display: D,
    ) -> Result<Self, DeviceError> {
        display.begin().map_err(DeviceError::DisplayUnavailable)?;

        let rows = [waiting_line(false), DisplayLine::new("t=---- s TOKEN")];
        for row in Row::ALL {
            display
                .write_line(row, &rows[row.index()])
                .map_err(DeviceError::DisplayUnavailable)?;
        }
        display.flush().map_err(DeviceError::DisplayUnavailable)?;

        let initial = sensor.level();
        let last_ui = clock.now();
        tracing::info!(
            window_secs = config.window_secs.get(),
            initial_level = ?initial,
            "device reporter started, awaiting sync pulse"
        );

        Ok(Self {
            clock,
            sensor,
            display,
            secret,
            config,
            detector: SyncDetector::new(initial),
            scheduler: WindowScheduler::new(config.window_secs),
            rows,
            last_ui,
            dot: false,
            token: None,
        })
    }

    /// Run one loop iteration.
    pub fn step(&mut self) -> Step {
        let now = self.clock.now();
        let level = self.sensor.level();

        let sync = self.detector.poll(level, now);
        if let Some(event) = sync {
            self.on_sync(event);
        }

        let update = match self.detector.origin() {
            Some(origin) => self.update_synced(origin, now),
            None => self.update_waiting(now),
        };

        Step { now, sync, update }
    }

    /// Run forever. The device has no exit; it stops on reset.
    pub fn run(&mut self) -> ! {
        loop {
            self.step();
        }
    }

    /// Run until `stop` returns true for a completed step.
    pub fn run_until<F>(&mut self, mut stop: F) -> Step
    where
        F: FnMut(&Step) -> bool,
    {
        loop {
            let step = self.step();
            if stop(&step) {
                return step;
            }
        }
    }

    /// The latched origin, if synchronized.
    pub fn origin(&self) -> Option<Timestamp> {
        self.detector.origin()
    }

    /// Check if an origin is latched.
    pub fn is_synchronized(&self) -> bool {
        self.detector.is_synchronized()
    }

    /// Token currently on the display.
    pub fn current_token(&self) -> Option<Token> {
        self.token
    }

    /// Text last sent to a row.
    pub fn row(&self, row: Row) -> &DisplayLine {
        &self.rows[row.index()]
    }

    /// The clock driving this reporter.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn on_sync(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::Synchronized { origin } => {
                tracing::info!(origin = origin.as_millis(), "sync pulse detected");
            }
            SyncEvent::Resynchronized { previous, origin } => {
                tracing::info!(
                    previous = previous.as_millis(),
                    origin = origin.as_millis(),
                    "sync pulse detected again, origin replaced"
                );
            }
        }
        // Redraw on the next window observation even if the index repeats.
        self.scheduler.reset();
        if let Err(e) = self.display.set_indicator(true) {
            tracing::warn!("failed to switch indicator on: {}", e);
        }
    }

    fn update_synced(&mut self, origin: Timestamp, now: Timestamp) -> Update {
        let tick = self.scheduler.observe(origin, now);
        let elapsed_secs = tick.position.elapsed_secs;

        if tick.changed {
            let window = tick.position.window;
            let token = derive(&self.secret, window);
            tracing::debug!(window = window.value(), elapsed_secs, "window changed");

            self.token = Some(token);
            self.rows[Row::Top.index()] = synced_line(elapsed_secs);
            self.rows[Row::Bottom.index()] = token_line(token);
            self.push_rows(&Row::ALL);
            self.last_ui = now;
            return Update::Token {
                window,
                token,
                elapsed_secs,
            };
        }

        if now.millis_since(self.last_ui) >= self.config.synced_refresh_ms {
            self.last_ui = now;
            self.rows[Row::Top.index()] = synced_line(elapsed_secs);
            self.push_rows(&[Row::Top]);
            return Update::Elapsed { elapsed_secs };
        }

        Update::None
    }

    fn update_waiting(&mut self, now: Timestamp) -> Update {
        if now.millis_since(self.last_ui) < self.config.waiting_refresh_ms {
            return Update::None;
        }
        self.last_ui = now;
        self.dot = !self.dot;
        self.rows[Row::Top.index()] = waiting_line(self.dot);
        self.push_rows(&[Row::Top]);
        Update::Waiting { dot: self.dot }
    }

    /// Write rows to the display. Failures are logged; the next refresh
    /// rewrites the row anyway.
    fn push_rows(&mut self, rows: &[Row]) {
        for &row in rows {
            if let Err(e) = self.display.write_line(row, &self.rows[row.index()]) {
                tracing::warn!(row = row.index(), "display write failed: {}", e);
            }
        }
        if let Err(e) = self.display.flush() {
            tracing::warn!("display flush failed: {}", e);
        }
    }
}

fn waiting_line(dot: bool) -> DisplayLine {
    DisplayLine::new(&format!("Awaiting sync  {}", if dot { '.' } else { ' ' }))
}

fn synced_line(elapsed_secs: u64) -> DisplayLine {
    DisplayLine::new(&format!("SYNC ok  t={:>4}s", elapsed_secs))
}

fn token_line(token: Token) -> DisplayLine {
    DisplayLine::new(&format!("TOKEN: {}", token))
}
