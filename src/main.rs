//! # Condor Bridge
//!
//! Receive Condor 2 telemetry over UDP and log or record it.
//!
//! # Examples
//!
//! Run with defaults (listen on 127.0.0.1:55278):
//! ```bash
//! cargo run --release
//! ```
//!
//! Record to JSONL files with a custom config:
//! ```bash
//! cargo run --release -- --config config/default.toml --record
//! ```
//!
//! Expected output:
//! ```text
//! INFO condor_bridge: Condor Bridge v0.1.0 starting...
//! INFO condor_bridge::listener: Condor listener bound to 127.0.0.1:55278
//! INFO condor_bridge::listener: Condor telemetry connected from 127.0.0.1:50112
//! INFO condor_bridge: #600 pitch=4.91 roll=-4.06 yaw=30.41 surge=0.145 heave=0.372
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::{interval, Duration};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use condor_bridge::config::Config;
use condor_bridge::provider::{CondorProvider, TelemetryProvider};
use condor_bridge::telemetry::event::TelemetryEvent;
use condor_bridge::telemetry::recorder::TelemetryRecorder;

/// Number of records between telemetry log messages (10 s at 60 Hz)
const LOG_INTERVAL_RECORDS: u64 = 600;

/// Seconds between status log messages
const STATUS_INTERVAL_SECS: u64 = 5;

/// Condor 2 UDP telemetry bridge
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the UDP port
    #[arg(short, long)]
    port: Option<u16>,

    /// Record telemetry to JSONL files
    #[arg(short, long)]
    record: bool,

    /// Also write application logs to daily files in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

/// Install the tracing subscriber. The returned guard must be held for the
/// life of the process when file logging is enabled.
fn init_logging(log_dir: Option<&PathBuf>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "condor-bridge.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(port) = args.port {
        config.listener.port = port;
    }
    if args.record {
        config.recorder.enabled = true;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Build the sink: periodic log lines, plus the recorder when enabled
fn build_sink(config: &Config) -> Result<impl FnMut(&TelemetryEvent) + Send> {
    let mut recorder = if config.recorder.enabled {
        Some(TelemetryRecorder::new(&config.recorder).context("Failed to start recorder")?)
    } else {
        None
    };

    Ok(move |event: &TelemetryEvent| {
        if event.sequence() % LOG_INTERVAL_RECORDS == 0 {
            let record = event.record();
            info!(
                "#{} pitch={:.2} roll={:.2} yaw={:.2} surge={:.3} heave={:.3}",
                event.sequence(),
                record.pitch,
                record.roll,
                record.yaw,
                record.surge,
                record.heave
            );
        }

        if let Some(recorder) = recorder.as_mut() {
            if let Err(e) = recorder.record(event) {
                tracing::warn!("Failed to record telemetry: {}", e);
            }
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(args.log_dir.as_ref());

    info!("Condor Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args)?;
    let sink = build_sink(&config)?;

    let mut provider = CondorProvider::new(config);
    provider.init().await?;
    provider.start(Box::new(sink)).await?;

    info!("Listening for {} telemetry, press Ctrl+C to exit", provider.name());

    let mut status = interval(Duration::from_secs(STATUS_INTERVAL_SECS));
    loop {
        tokio::select! {
            _ = status.tick() => {
                let listener = provider.listener();
                info!(
                    "Status: connected={} packets={} records={}",
                    provider.is_connected(),
                    listener.packets_received(),
                    listener.records_emitted()
                );
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    provider.stop().await?;
    info!("Total records delivered: {}", provider.listener().records_emitted());

    Ok(())
}
