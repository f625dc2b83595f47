//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and every field is optional; missing values fall back to
//! the Condor defaults (loopback, port 55278, 500 ms idle timeout, 1 s backoff).
//!
//! ```toml
//! [listener]
//! port = 55278
//! idle_timeout_ms = 500
//!
//! [recorder]
//! enabled = true
//! log_dir = "./logs"
//! ```

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use crate::condor::protocol::{
    DEFAULT_PORT, IDLE_TIMEOUT_MS, MAX_DATAGRAM_SIZE, MIN_LINE_COUNT, RECONNECT_BACKOFF_MS,
    UPDATE_FREQUENCY_HZ,
};
use crate::error::{BridgeError, Result};

/// Largest UDP payload over IPv4
const MAX_UDP_PAYLOAD: usize = 65_507;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub listener: ListenerConfig,
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub recorder: RecorderConfig,
}

/// UDP listener configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ListenerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    #[serde(default = "default_reconnect_backoff_ms")]
    pub reconnect_backoff_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Receive buffer size. A longer datagram is dropped (Windows) or
    /// truncated (elsewhere), never treated as a socket fault.
    #[serde(default = "default_max_datagram_size")]
    pub max_datagram_size: usize,

    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,
}

/// Datagram decoder configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DecoderConfig {
    #[serde(default = "default_min_line_count")]
    pub min_line_count: usize,
}

/// Provider configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    #[serde(default = "default_update_frequency_hz")]
    pub update_frequency_hz: u32,
}

/// Telemetry recorder configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RecorderConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_log_interval_ms")]
    pub log_interval_ms: u64,

    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_bind_address() -> IpAddr { IpAddr::V4(Ipv4Addr::LOCALHOST) }
fn default_port() -> u16 { DEFAULT_PORT }
fn default_idle_timeout_ms() -> u64 { IDLE_TIMEOUT_MS }
fn default_reconnect_backoff_ms() -> u64 { RECONNECT_BACKOFF_MS }
fn default_poll_interval_ms() -> u64 { 100 }
fn default_max_datagram_size() -> usize { MAX_DATAGRAM_SIZE }
fn default_stop_timeout_ms() -> u64 { 2000 }

fn default_min_line_count() -> usize { MIN_LINE_COUNT }

fn default_update_frequency_hz() -> u32 { UPDATE_FREQUENCY_HZ }

fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }
fn default_log_interval_ms() -> u64 { 100 }
fn default_log_format() -> String { "jsonl".to_string() }

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            idle_timeout_ms: default_idle_timeout_ms(),
            reconnect_backoff_ms: default_reconnect_backoff_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            max_datagram_size: default_max_datagram_size(),
            stop_timeout_ms: default_stop_timeout_ms(),
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self { min_line_count: default_min_line_count() }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self { update_frequency_hz: default_update_frequency_hz() }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
            log_interval_ms: default_log_interval_ms(),
            format: default_log_format(),
        }
    }
}

impl ListenerConfig {
    /// Socket address the listener binds to
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    /// Silence after which the source counts as disconnected
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    /// Pause after going idle or after a fault
    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_backoff_ms)
    }

    /// Longest single wait on the socket
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// How long `stop` waits for the worker before aborting it
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use condor_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        let listener = &self.listener;

        if listener.idle_timeout_ms == 0 || listener.idle_timeout_ms > 60000 {
            return Err(invalid("idle_timeout_ms must be between 1 and 60000"));
        }

        if listener.reconnect_backoff_ms == 0 || listener.reconnect_backoff_ms > 60000 {
            return Err(invalid("reconnect_backoff_ms must be between 1 and 60000"));
        }

        if listener.poll_interval_ms == 0 || listener.poll_interval_ms > listener.idle_timeout_ms {
            return Err(invalid("poll_interval_ms must be between 1 and idle_timeout_ms"));
        }

        if listener.max_datagram_size < 64 || listener.max_datagram_size > MAX_UDP_PAYLOAD {
            return Err(invalid(format!(
                "max_datagram_size must be between 64 and {}",
                MAX_UDP_PAYLOAD
            )));
        }

        if listener.stop_timeout_ms == 0 || listener.stop_timeout_ms > 60000 {
            return Err(invalid("stop_timeout_ms must be between 1 and 60000"));
        }

        if self.decoder.min_line_count == 0 || self.decoder.min_line_count > 64 {
            return Err(invalid("min_line_count must be between 1 and 64"));
        }

        if self.provider.update_frequency_hz == 0 || self.provider.update_frequency_hz > 1000 {
            return Err(invalid("update_frequency_hz must be between 1 and 1000"));
        }

        let recorder = &self.recorder;

        if recorder.enabled && recorder.log_dir.is_empty() {
            return Err(invalid("recorder log_dir cannot be empty when enabled"));
        }

        if recorder.max_records_per_file == 0 {
            return Err(invalid("max_records_per_file must be greater than 0"));
        }

        if recorder.max_files_to_keep == 0 {
            return Err(invalid("max_files_to_keep must be greater than 0"));
        }

        if recorder.log_interval_ms > 60000 {
            return Err(invalid("log_interval_ms must be between 0 and 60000"));
        }

        if recorder.format != "jsonl" {
            return Err(invalid("log format must be 'jsonl' (only supported format)"));
        }

        Ok(())
    }
}

fn invalid(msg: impl std::fmt::Display) -> BridgeError {
    BridgeError::Config(toml::de::Error::custom(msg))
}
