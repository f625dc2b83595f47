//! # Telemetry Recorder
//!
//! Writes decoded records to rotating JSON Lines files.
//!
//! Each line is one object: the wall-clock timestamp, the event sequence
//! number, and every record field under its accessor name.
//!
//! ```text
//! {"timestamp":"2026-10-18T14:02:11.532+02:00","sequence":42,"time":17.02,"airSpeed":30.97,...}
//! ```
//!
//! A new file is started after `max_records_per_file` records and only the
//! newest `max_files_to_keep` files are kept.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Local;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::event::TelemetryEvent;
use super::record::TelemetryRecord;
use crate::config::RecorderConfig;
use crate::error::Result;
use crate::listener::TelemetrySink;

/// Recorder file name prefix
const FILE_PREFIX: &str = "condor_";

/// Recorder file extension
const FILE_EXTENSION: &str = "jsonl";

#[derive(Serialize)]
struct RecordLine<'a> {
    timestamp: String,
    sequence: u64,
    #[serde(flatten)]
    record: &'a TelemetryRecord,
}

/// Rotating JSONL writer for telemetry events
pub struct TelemetryRecorder {
    log_dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    min_interval: Duration,
    writer: Option<BufWriter<File>>,
    current_path: Option<PathBuf>,
    records_in_file: usize,
    files_created: u64,
    last_write: Option<Instant>,
}

impl std::fmt::Debug for TelemetryRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryRecorder")
            .field("log_dir", &self.log_dir)
            .field("current_path", &self.current_path)
            .field("records_in_file", &self.records_in_file)
            .finish_non_exhaustive()
    }
}

impl TelemetryRecorder {
    /// Create a recorder, creating `log_dir` if needed
    ///
    /// # Errors
    ///
    /// Returns error if the log directory cannot be created
    pub fn new(config: &RecorderConfig) -> Result<Self> {
        let log_dir = PathBuf::from(&config.log_dir);
        fs::create_dir_all(&log_dir)?;
        info!("Recording telemetry to {}", log_dir.display());

        Ok(Self {
            log_dir,
            max_records_per_file: config.max_records_per_file.max(1),
            max_files_to_keep: config.max_files_to_keep.max(1),
            min_interval: Duration::from_millis(config.log_interval_ms),
            writer: None,
            current_path: None,
            records_in_file: 0,
            files_created: 0,
            last_write: None,
        })
    }

    /// Write one event, unless the previous write was less than
    /// `log_interval_ms` ago. Returns whether a line was written.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or file I/O fails
    pub fn record(&mut self, event: &TelemetryEvent) -> Result<bool> {
        if let Some(last) = self.last_write {
            if last.elapsed() < self.min_interval {
                return Ok(false);
            }
        }

        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        let line = RecordLine {
            timestamp: Local::now().to_rfc3339(),
            sequence: event.sequence(),
            record: event.record(),
        };

        if let Some(writer) = self.writer.as_mut() {
            serde_json::to_writer(&mut *writer, &line)?;
            writer.write_all(b"\n")?;
        }

        self.records_in_file += 1;
        self.last_write = Some(Instant::now());
        Ok(true)
    }

    /// Flush buffered lines to disk
    pub fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    /// File currently being written, if any
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    fn rotate(&mut self) -> Result<()> {
        self.flush()?;

        // Names already taken, e.g. by another run in the same second, are skipped
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let (path, file) = loop {
            let path = self.log_dir.join(format!(
                "{}{}_{:04}.{}",
                FILE_PREFIX, stamp, self.files_created, FILE_EXTENSION
            ));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => self.files_created += 1,
                Err(e) => return Err(e.into()),
            }
        };
        debug!("Opened telemetry log {}", path.display());

        self.writer = Some(BufWriter::new(file));
        self.current_path = Some(path);
        self.records_in_file = 0;
        self.files_created += 1;

        self.prune()
    }

    /// Delete the oldest recorder files beyond `max_files_to_keep`
    fn prune(&self) -> Result<()> {
        let mut files = recorder_files(&self.log_dir)?;
        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        files.sort();
        let excess = files.len() - self.max_files_to_keep;
        for path in files.into_iter().take(excess) {
            debug!("Removing old telemetry log {}", path.display());
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

impl TelemetrySink for TelemetryRecorder {
    fn on_telemetry(&mut self, event: &TelemetryEvent) {
        if let Err(e) = self.record(event) {
            warn!("Failed to record telemetry: {}", e);
        }
    }
}

impl Drop for TelemetryRecorder {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!("Failed to flush telemetry log: {}", e);
        }
    }
}

/// Recorder files in `dir`, unsorted
fn recorder_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_recorder_file = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with(FILE_PREFIX) && name.ends_with(FILE_EXTENSION))
            .unwrap_or(false);
        if is_recorder_file {
            files.push(path);
        }
    }
    Ok(files)
}
