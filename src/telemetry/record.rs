//! # Telemetry Record
//!
//! The normalized, per-sample snapshot handed to consumers.
//!
//! A record is built exactly once, by [`TelemetryRecord::from_raw`], from the
//! wire-unit [`RawTelemetry`] of one datagram and the record that preceded
//! it. Nothing converts on read: every field already holds its output unit.
//!
//! | field | source | transform |
//! |-------|--------|-----------|
//! | `pitch`, `roll` | `pitch`, `bank` | rad → deg, folded into ±90° |
//! | `yaw` | `yaw` | `180 − deg(yaw)` |
//! | `surge`, `sway`, `heave` | `ax`, `ay`, `az` | m/s² → g |
//! | `slip_ball`, `turn_rate`, `yaw_string_angle` | same | rad → deg |
//! | `roll_rate`, `pitch_rate`, `yaw_rate` | same | rad/s → deg/s |
//! | `surge_alternative` | derived | d(airspeed)/d(time) / 100 |
//! | everything else | same | passthrough |

use serde::Serialize;

use crate::condor::convert::{accel_to_g, radians_to_degrees, wrap_angle};
use crate::condor::decoder::RawTelemetry;
use crate::condor::protocol::ATTITUDE_WRAP_BAND;

/// Normalized flight-dynamics sample.
///
/// Fields that were absent from the datagram are `0.0`.
///
/// # Examples
///
/// ```
/// use condor_bridge::telemetry::record::TelemetryRecord;
///
/// let record = TelemetryRecord::default();
/// assert_eq!(record.pitch, 0.0);
/// assert_eq!(record.elapsed_milliseconds, 0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRecord {
    /// In-game time, decimal hours
    pub time: f64,
    pub air_speed: f64,
    pub altitude: f64,
    pub vario: f64,
    pub evario: f64,
    pub nettovario: f64,
    pub integrator: f64,
    /// Compass heading, degrees
    pub compass: f64,
    /// Slip ball deflection, degrees
    pub slip_ball: f64,
    /// Slip ball deflection folded into ±90°
    pub slip_ball_alternative: f64,
    /// Turn indicator, deg/s
    pub turn_rate: f64,
    /// Yaw string angle, degrees
    pub yaw_string_angle: f64,
    /// Radio frequency, MHz
    pub radio_frequency: f64,

    /// Pitch, degrees in ±90°
    pub pitch: f64,
    /// Roll (bank), degrees in ±90°
    pub roll: f64,
    /// Yaw, `180 − heading` in degrees
    pub yaw: f64,
    /// `sin(pitch)`
    pub pitch_alternative: f64,
    /// `cos(pitch) · sin(bank)`
    pub roll_alternative: f64,
    /// `sin(yaw)`
    pub yaw_alternative: f64,

    /// Longitudinal acceleration, g
    pub surge: f64,
    /// Lateral acceleration, g
    pub sway: f64,
    /// Vertical acceleration, g
    pub heave: f64,
    /// Airspeed derivative over simulator time, scaled by 1/100
    pub surge_alternative: f64,

    /// Roll rate, deg/s
    pub roll_rate: f64,
    /// Pitch rate, deg/s
    pub pitch_rate: f64,
    /// Yaw rate, deg/s
    pub yaw_rate: f64,
    pub g_force: f64,

    /// Speed vector, m/s
    pub speed_x: f64,
    pub speed_y: f64,
    pub speed_z: f64,

    pub quaternion_x: f64,
    pub quaternion_y: f64,
    pub quaternion_z: f64,
    pub quaternion_w: f64,

    // Extended data, zero unless ExtendedData1=1
    /// Height of CG above ground, m
    pub height: f64,
    /// Height of wheel above ground, m
    pub wheel_height: f64,
    pub turbulence_strength: f64,
    pub surface_roughness: f64,

    /// Monotonic milliseconds since the decoder started, sampled at parse time
    pub elapsed_milliseconds: u64,
}

impl TelemetryRecord {
    /// Build a record from wire-unit values.
    ///
    /// `previous` is only read, for the surge derivative.
    pub fn from_raw(raw: &RawTelemetry, previous: &TelemetryRecord, elapsed_milliseconds: u64) -> Self {
        Self {
            time: raw.time,
            air_speed: raw.airspeed,
            altitude: raw.altitude,
            vario: raw.vario,
            evario: raw.evario,
            nettovario: raw.nettovario,
            integrator: raw.integrator,
            compass: raw.compass,
            slip_ball: radians_to_degrees(raw.slipball),
            slip_ball_alternative: wrap_angle(radians_to_degrees(raw.slipball), ATTITUDE_WRAP_BAND),
            turn_rate: radians_to_degrees(raw.turnrate),
            yaw_string_angle: radians_to_degrees(raw.yawstringangle),
            radio_frequency: raw.radiofrequency,

            pitch: wrap_angle(radians_to_degrees(raw.pitch), ATTITUDE_WRAP_BAND),
            roll: wrap_angle(radians_to_degrees(raw.bank), ATTITUDE_WRAP_BAND),
            yaw: 180.0 - radians_to_degrees(raw.yaw),
            pitch_alternative: raw.pitch.sin(),
            roll_alternative: raw.pitch.cos() * raw.bank.sin(),
            yaw_alternative: raw.yaw.sin(),

            surge: accel_to_g(raw.ax),
            sway: accel_to_g(raw.ay),
            heave: accel_to_g(raw.az),
            surge_alternative: surge_alternative(raw, previous),

            roll_rate: radians_to_degrees(raw.rollrate),
            pitch_rate: radians_to_degrees(raw.pitchrate),
            yaw_rate: radians_to_degrees(raw.yawrate),
            g_force: raw.gforce,

            speed_x: raw.vx,
            speed_y: raw.vy,
            speed_z: raw.vz,

            quaternion_x: raw.quaternionx,
            quaternion_y: raw.quaterniony,
            quaternion_z: raw.quaternionz,
            quaternion_w: raw.quaternionw,

            height: raw.height,
            wheel_height: raw.wheelheight,
            turbulence_strength: raw.turbulencestrength,
            surface_roughness: raw.surfaceroughness,

            elapsed_milliseconds,
        }
    }
}

/// Rate of change of airspeed over simulator time.
///
/// Stays zero until the sim produces non-zero airspeed or time, and falls
/// back to the previous value when time did not advance.
fn surge_alternative(raw: &RawTelemetry, previous: &TelemetryRecord) -> f64 {
    if raw.airspeed + raw.time <= 0.0 {
        return 0.0;
    }

    let dt = raw.time - previous.time;
    if dt > 0.0 {
        (raw.airspeed - previous.air_speed) / dt / 100.0
    } else {
        previous.surge_alternative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condor::protocol::STANDARD_GRAVITY;
    use std::f64::consts::{FRAC_PI_2, PI};

    const EPSILON: f64 = 1e-9;

    fn raw_at(time: f64, airspeed: f64) -> RawTelemetry {
        RawTelemetry {
            time,
            airspeed,
            ..RawTelemetry::default()
        }
    }

    #[test]
    fn test_zero_raw_gives_default_like_record() {
        let record = TelemetryRecord::from_raw(&RawTelemetry::default(), &TelemetryRecord::default(), 0);
        // yaw is 180 − 0 even for an empty sample
        assert_eq!(record.yaw, 180.0);
        assert_eq!(record.pitch, 0.0);
        assert_eq!(record.surge_alternative, 0.0);
        assert_eq!(record.height, 0.0);
    }

    #[test]
    fn test_attitude_conversion() {
        let raw = RawTelemetry {
            pitch: FRAC_PI_2 + 0.1,
            bank: -(FRAC_PI_2 + 0.1),
            yaw: PI,
            ..RawTelemetry::default()
        };
        let record = TelemetryRecord::from_raw(&raw, &TelemetryRecord::default(), 0);

        let folded = 180.0 - radians_to_degrees(FRAC_PI_2 + 0.1);
        assert!((record.pitch - folded).abs() < EPSILON);
        assert!((record.roll + folded).abs() < EPSILON);
        assert!(record.yaw.abs() < EPSILON);
    }

    #[test]
    fn test_accelerations_in_g() {
        let raw = RawTelemetry {
            ax: STANDARD_GRAVITY,
            ay: -STANDARD_GRAVITY / 2.0,
            az: 0.0,
            ..RawTelemetry::default()
        };
        let record = TelemetryRecord::from_raw(&raw, &TelemetryRecord::default(), 0);
        assert!((record.surge - 1.0).abs() < EPSILON);
        assert!((record.sway + 0.5).abs() < EPSILON);
        assert_eq!(record.heave, 0.0);
    }

    #[test]
    fn test_alternative_attitude_values() {
        let raw = RawTelemetry {
            pitch: 0.3,
            bank: -0.2,
            yaw: 1.1,
            ..RawTelemetry::default()
        };
        let record = TelemetryRecord::from_raw(&raw, &TelemetryRecord::default(), 0);
        assert!((record.pitch_alternative - 0.3f64.sin()).abs() < EPSILON);
        assert!((record.roll_alternative - 0.3f64.cos() * (-0.2f64).sin()).abs() < EPSILON);
        assert!((record.yaw_alternative - 1.1f64.sin()).abs() < EPSILON);
    }

    #[test]
    fn test_surge_alternative_derivative() {
        let previous = TelemetryRecord {
            time: 10.0,
            air_speed: 20.0,
            ..TelemetryRecord::default()
        };
        let record = TelemetryRecord::from_raw(&raw_at(10.5, 30.0), &previous, 0);
        // (30 − 20) / 0.5 / 100
        assert!((record.surge_alternative - 0.2).abs() < EPSILON);
    }

    #[test]
    fn test_surge_alternative_reuses_previous_when_time_stalls() {
        let previous = TelemetryRecord {
            time: 10.0,
            air_speed: 20.0,
            surge_alternative: 0.42,
            ..TelemetryRecord::default()
        };
        let same_time = TelemetryRecord::from_raw(&raw_at(10.0, 25.0), &previous, 0);
        assert_eq!(same_time.surge_alternative, 0.42);

        let time_went_back = TelemetryRecord::from_raw(&raw_at(9.0, 25.0), &previous, 0);
        assert_eq!(time_went_back.surge_alternative, 0.42);
        assert!(time_went_back.surge_alternative.is_finite());
    }

    #[test]
    fn test_surge_alternative_zero_before_sim_starts() {
        let previous = TelemetryRecord {
            surge_alternative: 0.42,
            ..TelemetryRecord::default()
        };
        let record = TelemetryRecord::from_raw(&raw_at(0.0, 0.0), &previous, 0);
        assert_eq!(record.surge_alternative, 0.0);
    }

    #[test]
    fn test_from_raw_leaves_previous_untouched() {
        let previous = TelemetryRecord {
            time: 1.0,
            air_speed: 2.0,
            surge_alternative: 3.0,
            ..TelemetryRecord::default()
        };
        let snapshot = previous;
        let _ = TelemetryRecord::from_raw(&raw_at(2.0, 4.0), &previous, 7);
        assert_eq!(previous, snapshot);
    }

    #[test]
    fn test_serializes_with_camel_case_names() {
        let json = serde_json::to_value(TelemetryRecord::default()).unwrap();
        assert!(json.get("airSpeed").is_some());
        assert!(json.get("gForce").is_some());
        assert!(json.get("surgeAlternative").is_some());
        assert!(json.get("elapsedMilliseconds").is_some());
        assert!(json.get("air_speed").is_none());
    }
}
