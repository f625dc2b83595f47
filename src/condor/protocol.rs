//! # Condor UDP Protocol Constants and Types
//!
//! Core definitions for the Condor 2 "simkit" UDP output.
//!
//! Every datagram is one sample: UTF-8 text, one `key=value` pair per line,
//! values are doubles with `.` as decimal separator. Keys marked extended are
//! only sent when `ExtendedData1=1` is set in the simulator's `UDP.ini`.
//!
//! ```text
//! time=17.0253499342059
//! airspeed=0.812818467617035
//! altitude=501.60693359375
//! ...
//! gforce=1.12094616671221
//! height=0.61981201171875
//! ```

/// Loopback address Condor sends telemetry to
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";

/// UDP port Condor sends telemetry to
pub const DEFAULT_PORT: u16 = 55278;

/// Standard gravity in m/s² used to express accelerations in g
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// Minimum number of lines for a datagram to count as a full sample
pub const MIN_LINE_COUNT: usize = 16;

/// Attitude band (degrees) that pitch and roll are folded into
pub const ATTITUDE_WRAP_BAND: f64 = 90.0;

/// Silence on the socket longer than this marks the source disconnected
pub const IDLE_TIMEOUT_MS: u64 = 500;

/// Pause after going idle or after a transport fault
pub const RECONNECT_BACKOFF_MS: u64 = 1000;

/// Largest datagram the listener reads
pub const MAX_DATAGRAM_SIZE: usize = 4096;

/// Rate at which Condor emits samples
pub const UPDATE_FREQUENCY_HZ: u32 = 60;

// Wire keys (case-sensitive)

/// In-game display time, decimal hours
pub const KEY_TIME: &str = "time";
/// Airspeed
pub const KEY_AIRSPEED: &str = "airspeed";
/// Altimeter reading, m or ft depending on units selected
pub const KEY_ALTITUDE: &str = "altitude";
/// Pneumatic variometer, m/s
pub const KEY_VARIO: &str = "vario";
/// Electronic variometer, m/s
pub const KEY_EVARIO: &str = "evario";
/// Netto variometer, m/s
pub const KEY_NETTOVARIO: &str = "nettovario";
/// Integrator, m/s
pub const KEY_INTEGRATOR: &str = "integrator";
/// Compass, degrees
pub const KEY_COMPASS: &str = "compass";
/// Slip ball deflection, rad
pub const KEY_SLIPBALL: &str = "slipball";
/// Turn indicator, rad/s
pub const KEY_TURNRATE: &str = "turnrate";
/// Yaw string angle, rad
pub const KEY_YAWSTRINGANGLE: &str = "yawstringangle";
/// Radio frequency, MHz
pub const KEY_RADIOFREQUENCY: &str = "radiofrequency";
/// Yaw, rad
pub const KEY_YAW: &str = "yaw";
/// Pitch, rad
pub const KEY_PITCH: &str = "pitch";
/// Bank, rad
pub const KEY_BANK: &str = "bank";
/// Attitude quaternion x
pub const KEY_QUATERNION_X: &str = "quaternionx";
/// Attitude quaternion y
pub const KEY_QUATERNION_Y: &str = "quaterniony";
/// Attitude quaternion z
pub const KEY_QUATERNION_Z: &str = "quaternionz";
/// Attitude quaternion w
pub const KEY_QUATERNION_W: &str = "quaternionw";
/// Acceleration vector x, m/s²
pub const KEY_AX: &str = "ax";
/// Acceleration vector y, m/s²
pub const KEY_AY: &str = "ay";
/// Acceleration vector z, m/s²
pub const KEY_AZ: &str = "az";
/// Speed vector x, m/s
pub const KEY_VX: &str = "vx";
/// Speed vector y, m/s
pub const KEY_VY: &str = "vy";
/// Speed vector z, m/s
pub const KEY_VZ: &str = "vz";
/// Roll rate (local system), rad/s
pub const KEY_ROLLRATE: &str = "rollrate";
/// Pitch rate (local system), rad/s
pub const KEY_PITCHRATE: &str = "pitchrate";
/// Yaw rate (local system), rad/s
pub const KEY_YAWRATE: &str = "yawrate";
/// G force
pub const KEY_GFORCE: &str = "gforce";
/// Extended: height of CG above ground, m
pub const KEY_HEIGHT: &str = "height";
/// Extended: height of wheel above ground, m
pub const KEY_WHEELHEIGHT: &str = "wheelheight";
/// Extended: turbulence strength
pub const KEY_TURBULENCESTRENGTH: &str = "turbulencestrength";
/// Extended: surface roughness
pub const KEY_SURFACEROUGHNESS: &str = "surfaceroughness";

/// One parsed datagram: `(key, value)` pairs in wire order.
///
/// Unknown keys (`MC`, `water`, ...) are kept. When a key repeats, the last
/// occurrence wins on lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSample {
    entries: Vec<(String, f64)>,
    line_count: usize,
}

impl RawSample {
    /// Create an empty sample that saw `line_count` lines on the wire
    pub fn with_line_count(line_count: usize) -> Self {
        Self {
            entries: Vec::new(),
            line_count,
        }
    }

    /// Append a pair
    pub fn push(&mut self, key: impl Into<String>, value: f64) {
        self.entries.push((key.into(), value));
    }

    /// Value of the last occurrence of `key`
    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|&(_, v)| v)
    }

    /// Value of `key`, `0.0` when absent
    pub fn get_or_zero(&self, key: &str) -> f64 {
        self.get(key).unwrap_or(0.0)
    }

    /// All pairs in wire order
    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    /// Number of pairs that parsed
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no pair parsed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of terminator-separated lines the datagram contained,
    /// including ignored ones. A trailing terminator opens one more, empty,
    /// line.
    pub fn line_count(&self) -> usize {
        self.line_count
    }
}
