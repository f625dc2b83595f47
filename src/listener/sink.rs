//! Consumer-side callback for decoded telemetry

use crate::telemetry::event::TelemetryEvent;

/// Receives one event per decoded datagram, in receipt order.
///
/// Called synchronously on the listener's worker; a slow sink slows the
/// receive loop down rather than queueing events. Any `FnMut(&TelemetryEvent)`
/// closure is a sink.
#[cfg_attr(test, mockall::automock)]
pub trait TelemetrySink: Send {
    /// Handle one event
    fn on_telemetry(&mut self, event: &TelemetryEvent);
}

impl<F> TelemetrySink for F
where
    F: FnMut(&TelemetryEvent) + Send,
{
    fn on_telemetry(&mut self, event: &TelemetryEvent) {
        self(event)
    }
}
