//! Device simulator: the reporting loop driven by the host clock, a timed
//! sensor and a terminal display.

use anyhow::{Context, Result};
use token_core::{Clock, InstantClock};
use token_device::{FnSensor, Reporter, Update};
use token_types::{Level, Timestamp};

use crate::config::Config;
use crate::terminal::TerminalDisplay;

/// Options for the device command.
#[derive(Debug, Clone, Copy)]
pub struct DeviceOptions {
    /// When the simulated pulse starts, in ms after startup.
    pub sync_after_ms: u64,
    /// How long the simulated pulse lasts.
    pub pulse_ms: u64,
    /// Stop after this many seconds.
    pub run_secs: u64,
}

impl DeviceOptions {
    /// Sensor level the simulated photo sensor reads at `now`.
    fn level_at(&self, now: Timestamp) -> Level {
        let t = now.as_millis();
        let end = self.sync_after_ms.saturating_add(self.pulse_ms.max(1));
        Level::from((self.sync_after_ms..end).contains(&t))
    }
}

/// Run the device command.
pub async fn run(config: &Config, options: DeviceOptions) -> Result<()> {
    let reporter_config = config.reporter_config()?;
    let secret = config.secret()?;
    let stop_ms = options.run_secs.saturating_mul(1000);

    let last = tokio::task::spawn_blocking(move || -> Result<Update> {
        let clock = InstantClock::new();
        let sensor = FnSensor::new(move || options.level_at(clock.now()));
        let display = TerminalDisplay::new(std::io::stdout());

        let mut reporter = Reporter::new(reporter_config, secret, clock, sensor, display)
            .context("Device display failed to start")?;

        let mut last = Update::None;
        reporter.run_until(|step| {
            if step.update != Update::None {
                last = step.update;
            }
            // Leave the terminal some air between iterations.
            std::thread::yield_now();
            step.now.as_millis() >= stop_ms
        });
        Ok(last)
    })
    .await
    .context("Device loop panicked")??;

    println!();
    tracing::info!(?last, "device simulation finished");
    Ok(())
}
