//! # Condor Datagram Decoder
//!
//! Turns one UDP payload into a [`TelemetryRecord`].
//!
//! Decoding never fails. Lines without `=` are skipped, values that do not
//! parse as finite numbers are dropped, and a datagram with fewer than
//! [`MIN_LINE_COUNT`] lines is treated as garbled and yields a default record.

use std::time::Instant;

use tracing::{debug, trace};

use super::protocol::*;
use crate::config::DecoderConfig;
use crate::telemetry::record::TelemetryRecord;

/// Split a payload into `key=value` pairs.
///
/// Accepts `\n` and `\r\n` terminators. Keys and values are trimmed, and only
/// the first `=` separates them, so `a=b=c` carries the value `b=c` and is
/// dropped as non-numeric.
///
/// The line count includes the empty line after a trailing terminator, so
/// `"a=1\r\n"` counts as two lines.
///
/// # Examples
///
/// ```
/// use condor_bridge::condor::decoder::parse_sample;
///
/// let sample = parse_sample("time=17.5\r\nairspeed=oops\nnoise\n");
/// assert_eq!(sample.get("time"), Some(17.5));
/// assert_eq!(sample.get("airspeed"), None);
/// assert_eq!(sample.line_count(), 4);
/// ```
pub fn parse_sample(payload: &str) -> RawSample {
    let mut sample = RawSample::with_line_count(payload.split('\n').count());

    for line in payload.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        match value.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => sample.push(key, v),
            _ => trace!("Dropping malformed value for {}: {:?}", key, value),
        }
    }

    sample
}

/// One datagram in wire units, one field per known key.
///
/// Every field is `0.0` when its key was absent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawTelemetry {
    pub time: f64,
    pub airspeed: f64,
    pub altitude: f64,
    pub vario: f64,
    pub evario: f64,
    pub nettovario: f64,
    pub integrator: f64,
    pub compass: f64,
    pub slipball: f64,
    pub turnrate: f64,
    pub yawstringangle: f64,
    pub radiofrequency: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub bank: f64,
    pub quaternionx: f64,
    pub quaterniony: f64,
    pub quaternionz: f64,
    pub quaternionw: f64,
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    pub rollrate: f64,
    pub pitchrate: f64,
    pub yawrate: f64,
    pub gforce: f64,
    pub height: f64,
    pub wheelheight: f64,
    pub turbulencestrength: f64,
    pub surfaceroughness: f64,
}

impl From<&RawSample> for RawTelemetry {
    fn from(sample: &RawSample) -> Self {
        let get = |key| sample.get_or_zero(key);

        Self {
            time: get(KEY_TIME),
            airspeed: get(KEY_AIRSPEED),
            altitude: get(KEY_ALTITUDE),
            vario: get(KEY_VARIO),
            evario: get(KEY_EVARIO),
            nettovario: get(KEY_NETTOVARIO),
            integrator: get(KEY_INTEGRATOR),
            compass: get(KEY_COMPASS),
            slipball: get(KEY_SLIPBALL),
            turnrate: get(KEY_TURNRATE),
            yawstringangle: get(KEY_YAWSTRINGANGLE),
            radiofrequency: get(KEY_RADIOFREQUENCY),
            yaw: get(KEY_YAW),
            pitch: get(KEY_PITCH),
            bank: get(KEY_BANK),
            quaternionx: get(KEY_QUATERNION_X),
            quaterniony: get(KEY_QUATERNION_Y),
            quaternionz: get(KEY_QUATERNION_Z),
            quaternionw: get(KEY_QUATERNION_W),
            ax: get(KEY_AX),
            ay: get(KEY_AY),
            az: get(KEY_AZ),
            vx: get(KEY_VX),
            vy: get(KEY_VY),
            vz: get(KEY_VZ),
            rollrate: get(KEY_ROLLRATE),
            pitchrate: get(KEY_PITCHRATE),
            yawrate: get(KEY_YAWRATE),
            gforce: get(KEY_GFORCE),
            height: get(KEY_HEIGHT),
            wheelheight: get(KEY_WHEELHEIGHT),
            turbulencestrength: get(KEY_TURBULENCESTRENGTH),
            surfaceroughness: get(KEY_SURFACEROUGHNESS),
        }
    }
}

/// Stateful decoder that keeps the last published record.
///
/// # Examples
///
/// ```
/// use condor_bridge::condor::decoder::Decoder;
///
/// let mut decoder = Decoder::new();
///
/// // Too short to be a full sample
/// assert!(decoder.decode("time=1.0\nairspeed=20.0").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Decoder {
    /// Monotonic origin for `elapsed_milliseconds`
    origin: Instant,
    /// Datagrams with fewer lines are ignored
    min_line_count: usize,
    /// Last record returned by `decode`
    previous: TelemetryRecord,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Create a decoder with the protocol's minimum line count
    pub fn new() -> Self {
        Self::with_min_line_count(MIN_LINE_COUNT)
    }

    /// Create a decoder with a custom minimum line count
    pub fn with_min_line_count(min_line_count: usize) -> Self {
        Self {
            origin: Instant::now(),
            min_line_count,
            previous: TelemetryRecord::default(),
        }
    }

    /// Create a decoder from configuration
    pub fn from_config(config: &DecoderConfig) -> Self {
        Self::with_min_line_count(config.min_line_count)
    }

    /// Decode `payload` against an explicit previous record.
    ///
    /// Does not touch the decoder's own state. A datagram below the minimum
    /// line count gives `TelemetryRecord::default()`.
    pub fn parse(&self, payload: &str, previous: &TelemetryRecord) -> TelemetryRecord {
        self.decode_with(payload, previous).unwrap_or_default()
    }

    /// Decode `payload` against the retained previous record.
    ///
    /// Returns `None` for a datagram below the minimum line count; the
    /// retained record is then left as it was. Otherwise the new record
    /// becomes the previous one for the next call.
    pub fn decode(&mut self, payload: &str) -> Option<TelemetryRecord> {
        let record = self.decode_with(payload, &self.previous)?;
        self.previous = record;
        Some(record)
    }

    /// Last record returned by [`Decoder::decode`]
    pub fn previous(&self) -> &TelemetryRecord {
        &self.previous
    }

    /// Forget the retained record, e.g. after the source restarted
    pub fn reset(&mut self) {
        self.previous = TelemetryRecord::default();
    }

    fn decode_with(&self, payload: &str, previous: &TelemetryRecord) -> Option<TelemetryRecord> {
        let sample = parse_sample(payload);
        if sample.line_count() < self.min_line_count {
            debug!(
                "Ignoring short datagram: {} lines (need {})",
                sample.line_count(),
                self.min_line_count
            );
            return None;
        }

        let raw = RawTelemetry::from(&sample);
        Some(TelemetryRecord::from_raw(&raw, previous, self.elapsed_ms()))
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}
