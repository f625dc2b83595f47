//! # Telemetry Provider
//!
//! Lifecycle contract the host application drives, and its Condor
//! implementation on top of [`UdpListener`].

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::listener::{TelemetrySink, UdpListener};
use crate::telemetry::accessor;

/// Provider identifier reported to the host
pub const PROVIDER_NAME: &str = "condor2";

/// Descriptive information about a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMetadata {
    pub author: &'static str,
    pub version: &'static str,
    pub description: &'static str,
}

/// A telemetry source the host can start and stop
#[async_trait]
pub trait TelemetryProvider: Send {
    /// Stable identifier of the source
    fn name(&self) -> &str;

    fn metadata(&self) -> ProviderMetadata;

    /// Nominal sample rate in Hz
    fn update_frequency(&self) -> u32;

    /// Field names every emitted record can be queried with
    fn value_list(&self) -> Vec<&'static str>;

    /// Prepare the provider. Must be called before [`TelemetryProvider::start`].
    async fn init(&mut self) -> Result<()>;

    /// Begin delivering events to `sink`
    async fn start(&mut self, sink: Box<dyn TelemetrySink>) -> Result<()>;

    /// Stop delivering events. Returns once no further events can arrive.
    async fn stop(&mut self) -> Result<()>;

    /// Whether the source is currently producing samples
    fn is_connected(&self) -> bool;

    /// Whether the simulator is currently running
    fn is_running(&self) -> bool;
}

/// Condor 2 telemetry over UDP
#[derive(Debug)]
pub struct CondorProvider {
    config: Config,
    listener: UdpListener,
}

impl CondorProvider {
    pub fn new(config: Config) -> Self {
        let listener = UdpListener::new(config.listener.clone(), config.decoder.clone());
        Self { config, listener }
    }

    /// The underlying listener
    pub fn listener(&self) -> &UdpListener {
        &self.listener
    }

    /// Time between samples at the configured update frequency
    pub fn sample_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.update_frequency().max(1)))
    }
}

#[async_trait]
impl TelemetryProvider for CondorProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            author: "condor-bridge contributors",
            version: env!("CARGO_PKG_VERSION"),
            description: "Condor 2 glider simulator telemetry over UDP",
        }
    }

    fn update_frequency(&self) -> u32 {
        self.config.provider.update_frequency_hz
    }

    fn value_list(&self) -> Vec<&'static str> {
        accessor::field_names().collect()
    }

    async fn init(&mut self) -> Result<()> {
        self.config.validate()?;
        info!(
            "Provider {} v{} initialized ({} Hz, {:?} per sample, {} fields)",
            PROVIDER_NAME,
            env!("CARGO_PKG_VERSION"),
            self.update_frequency(),
            self.sample_period(),
            accessor::FIELDS.len()
        );
        Ok(())
    }

    async fn start(&mut self, sink: Box<dyn TelemetrySink>) -> Result<()> {
        self.listener.start(sink);
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.listener.stop().await;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.listener.is_connected()
    }

    fn is_running(&self) -> bool {
        self.listener.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::event::TelemetryEvent;
    use std::net::{IpAddr, Ipv4Addr};

    fn loopback_config() -> Config {
        let mut config = Config::default();
        config.listener.bind_address = IpAddr::V4(Ipv4Addr::LOCALHOST);
        config.listener.port = 0;
        config
    }

    #[test]
    fn test_identity() {
        let provider = CondorProvider::new(Config::default());
        assert_eq!(provider.name(), "condor2");
        assert_eq!(provider.update_frequency(), 60);
        assert_eq!(provider.metadata().version, env!("CARGO_PKG_VERSION"));
        assert!(!provider.is_connected());
        assert!(!provider.is_running());
    }

    #[test]
    fn test_value_list_matches_accessor() {
        let provider = CondorProvider::new(Config::default());
        let values = provider.value_list();
        assert_eq!(values.len(), accessor::FIELDS.len());
        assert!(values.contains(&"pitch"));
        assert!(values.contains(&"surgeAlternative"));
    }

    #[test]
    fn test_sample_period() {
        let provider = CondorProvider::new(Config::default());
        let period = provider.sample_period();
        assert!((period.as_secs_f64() - 1.0 / 60.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_init_rejects_invalid_config() {
        let mut config = Config::default();
        config.listener.idle_timeout_ms = 0;
        let mut provider = CondorProvider::new(config);
        assert!(provider.init().await.is_err());
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let mut provider = CondorProvider::new(loopback_config());
        provider.init().await.unwrap();
        provider
            .start(Box::new(|_: &TelemetryEvent| {}))
            .await
            .unwrap();

        tokio::time::timeout(Duration::from_secs(2), async {
            while provider.listener().local_addr().is_none() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        assert!(provider.listener().is_started());
        assert!(!provider.is_connected());

        provider.stop().await.unwrap();
        assert!(!provider.listener().is_started());
        assert!(!provider.is_running());
        assert!(!provider.is_connected());
    }

    #[test]
    fn test_provider_is_object_safe() {
        let provider: Box<dyn TelemetryProvider> = Box::new(CondorProvider::new(Config::default()));
        assert_eq!(provider.name(), PROVIDER_NAME);
    }
}
