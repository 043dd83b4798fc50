//! # optotoken
//!
//! Host verifier and device simulator for optical-sync rotating tokens.
//!
//! ## Commands
//!
//! - `verify`: Flash the sync pulse, then check tokens read off the device
//! - `token`: Print the tokens accepted for a window
//! - `device`: Run the device loop against the terminal
//!
//! ## Example
//!
//! ```bash
//! # Synchronize and verify interactively
//! optotoken verify
//!
//! # What should the device show 65 s after sync?
//! optotoken token --elapsed-secs 65
//!
//! # Watch a simulated device pick up a pulse after 2 s
//! optotoken device --sync-after-ms 2000
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod terminal;

use commands::{device, token, verify};
use config::Config;

/// Host verifier and device simulator for optical-sync rotating tokens.
#[derive(Parser, Debug)]
#[command(name = "optotoken")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synchronize with the device and verify typed tokens
    Verify {
        /// Pulse duration in milliseconds (overrides config)
        #[arg(long)]
        pulse_ms: Option<u64>,

        /// Flash the pulse immediately instead of waiting for ENTER
        #[arg(long)]
        no_wait: bool,
    },

    /// Print the tokens accepted for a window
    Token {
        /// Window index
        #[arg(long, conflicts_with = "elapsed_secs", required_unless_present = "elapsed_secs")]
        window: Option<u32>,

        /// Seconds since synchronization
        #[arg(long)]
        elapsed_secs: Option<u64>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run the device loop on the terminal with a simulated sensor
    Device {
        /// When the simulated sensor sees the pulse (ms, at least 1)
        #[arg(long, default_value = "2000", value_parser = clap::value_parser!(u64).range(1..))]
        sync_after_ms: u64,

        /// How long the simulated pulse lasts (overrides config)
        #[arg(long)]
        pulse_ms: Option<u64>,

        /// Stop after this many seconds
        #[arg(long, default_value = "65")]
        run_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (config, source) = Config::load(cli.config.as_deref())?;
    match &source {
        Some(path) => tracing::debug!(path = %path.display(), "loaded config"),
        None => tracing::debug!("no config file, using defaults"),
    }

    match cli.command {
        Commands::Verify { pulse_ms, no_wait } => {
            verify::run(&config, verify::VerifyOptions { pulse_ms, no_wait }).await?;
        }
        Commands::Token {
            window,
            elapsed_secs,
            json,
        } => {
            let at = match (window, elapsed_secs) {
                (Some(w), _) => token::At::Window(w),
                (None, Some(s)) => token::At::Elapsed(s),
                (None, None) => anyhow::bail!("Must specify --window or --elapsed-secs"),
            };
            token::run(&config, at, json)?;
        }
        Commands::Device {
            sync_after_ms,
            pulse_ms,
            run_secs,
        } => {
            let options = device::DeviceOptions {
                sync_after_ms,
                pulse_ms: pulse_ms.unwrap_or(config.host.pulse_ms),
                run_secs,
            };
            device::run(&config, options).await?;
        }
    }

    Ok(())
}

/// Log to stderr so stdout stays clean for tokens and prompts.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
