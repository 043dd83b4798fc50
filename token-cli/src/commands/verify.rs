//! Host verifier: synchronize with the device, then check typed tokens.

use anyhow::{Context, Result};
use std::num::NonZeroU64;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use token_core::{
    Clock, InstantClock, Match, SyncState, Verdict, Verifier, WindowPosition, WindowScheduler,
};
use token_types::{Secret, Timestamp};

use crate::config::Config;
use crate::terminal::{PulseRenderer, TerminalPulse};

/// Options for the verify command.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerifyOptions {
    /// Override the configured pulse duration.
    pub pulse_ms: Option<u64>,
    /// Start the pulse immediately instead of waiting for ENTER.
    pub no_wait: bool,
}

/// Run the verify command on the process console.
pub async fn run(config: &Config, options: VerifyOptions) -> Result<()> {
    let secret = config.secret()?;
    let window_secs = config.window_secs()?;
    let pulse_ms = options.pulse_ms.unwrap_or(config.host.pulse_ms);

    let mut input = BufReader::new(tokio::io::stdin());
    let mut output = tokio::io::stdout();

    output.write_all(b"optotoken host verifier\n").await?;
    if !options.no_wait {
        output
            .write_all(b"Press ENTER to synchronize (white pulse)...\n")
            .await?;
        output.flush().await?;
        let mut line = String::new();
        input
            .read_line(&mut line)
            .await
            .context("Failed to read from stdin")?;
    }
    output.flush().await?;

    let mut session = Session::new(secret, window_secs, InstantClock::new());
    let mut pulse = TerminalPulse::new(
        std::io::stdout(),
        config.host.pulse_width,
        config.host.pulse_height,
    );
    let origin = session
        .synchronize(&mut pulse, Duration::from_millis(pulse_ms))
        .await
        .context("Failed to render sync pulse")?;

    output
        .write_all(format!("Synchronized. origin = {origin}\n").as_bytes())
        .await?;

    let summary = session.run(&mut input, &mut output).await?;
    tracing::info!(
        accepted = summary.accepted,
        rejected = summary.rejected,
        invalid = summary.invalid,
        "verification loop finished"
    );
    Ok(())
}

/// Outcome of one console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// The user asked to quit.
    Quit,
    /// The line was not an unsigned integer.
    InvalidInput,
    /// The entry was checked against a window.
    Checked {
        /// Position of the check.
        position: WindowPosition,
        /// The verdict.
        verdict: Verdict,
    },
}

/// Counts for one verification run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Entries accepted.
    pub accepted: u32,
    /// Entries checked and rejected.
    pub rejected: u32,
    /// Lines that were not numbers.
    pub invalid: u32,
}

/// Host-side verification session.
///
/// Synchronizes once per run. All entries are checked against the window
/// the clock is in when the entry arrives.
#[derive(Debug)]
pub struct Session<C> {
    verifier: Verifier,
    scheduler: WindowScheduler,
    state: SyncState,
    clock: C,
}

impl<C: Clock> Session<C> {
    /// Create an unsynchronized session.
    pub fn new(secret: Secret, window_secs: NonZeroU64, clock: C) -> Self {
        Self {
            verifier: Verifier::new(secret),
            scheduler: WindowScheduler::new(window_secs),
            state: SyncState::new(),
            clock,
        }
    }

    /// Show the pulse for `duration` and latch the moment it appeared.
    pub async fn synchronize<P: PulseRenderer>(
        &mut self,
        pulse: &mut P,
        duration: Duration,
    ) -> std::io::Result<Timestamp> {
        pulse.show()?;
        let origin = self.clock.now();
        self.state.synchronize(origin);
        tracing::info!(origin = origin.as_millis(), "sync pulse started");

        tokio::time::sleep(duration).await;
        pulse.hide()?;
        Ok(origin)
    }

    /// Where the clock is now, if synchronized.
    pub fn position(&self) -> Option<WindowPosition> {
        let origin = self.state.origin()?;
        Some(self.scheduler.position(origin, self.clock.now()))
    }

    /// Interpret one console line.
    pub fn handle_line(&self, line: &str) -> Reply {
        if line.starts_with(['q', 'Q']) {
            return Reply::Quit;
        }
        // Whole-line parse: "123abc" or "+5" is not a token entry.
        let Ok(input) = line.trim().parse::<u32>() else {
            return Reply::InvalidInput;
        };
        let Some(position) = self.position() else {
            // Not synchronized: nothing can match.
            return Reply::InvalidInput;
        };
        let verdict = self.verifier.check(input, position.window);
        tracing::debug!(window = position.window.value(), ?verdict, "token checked");
        Reply::Checked { position, verdict }
    }

    /// Prompt/verify loop. Ends on `q`/`Q` or end of input.
    pub async fn run<R, W>(&self, input: &mut R, output: &mut W) -> Result<Summary>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut summary = Summary::default();
        let mut buf = Vec::new();

        loop {
            if let Some(position) = self.position() {
                let prompt = format!(
                    "\nWindow #{} ({}s left). Enter 6-digit token (or 'q' to quit): ",
                    position.window.value(),
                    position.remaining_secs
                );
                output.write_all(prompt.as_bytes()).await?;
            }
            output.flush().await?;

            // Raw bytes: a line that is not UTF-8 is bad input, not a broken console.
            buf.clear();
            let read = input
                .read_until(b'\n', &mut buf)
                .await
                .context("Failed to read from stdin")?;
            if read == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);

            let message = match self.handle_line(&line) {
                Reply::Quit => break,
                Reply::InvalidInput => {
                    summary.invalid += 1;
                    "Invalid input.".to_string()
                }
                Reply::Checked {
                    verdict: Verdict::Accepted(matched),
                    ..
                } => {
                    summary.accepted += 1;
                    match matched {
                        Match::Current => "Token valid.".to_string(),
                        Match::Previous => "Token valid (previous window).".to_string(),
                        Match::Next => "Token valid (next window).".to_string(),
                    }
                }
                Reply::Checked {
                    verdict: Verdict::Rejected(candidates),
                    ..
                } => {
                    summary.rejected += 1;
                    format!(
                        "Token invalid. (current={}, -1={}, +1={})",
                        candidates.current, candidates.previous, candidates.next
                    )
                }
            };
            output.write_all(message.as_bytes()).await?;
            output.write_all(b"\n").await?;
        }

        output.flush().await?;
        Ok(summary)
    }
}
