//! # Unit Conversions
//!
//! Maps Condor's SI wire units onto the units motion consumers expect.
//!
//! ## Angle wrap
//!
//! Condor reports pitch and bank so that they flip past vertical. For a
//! motion platform a continuous value is more useful, so angles outside the
//! `±band` range are folded back:
//!
//! ```text
//! |a| <= band  ->  a                (boundary inclusive)
//! |a| >  band  ->  180·sign(a) − a
//! ```
//!
//! so `91° -> 89°`, `-91° -> -89°` and `180° -> 0°`.
//!
//! ```
//! use condor_bridge::condor::convert::wrap_angle;
//!
//! assert_eq!(wrap_angle(135.0, 90.0), 45.0);
//! assert_eq!(wrap_angle(-135.0, 90.0), -45.0);
//! ```

use super::protocol::STANDARD_GRAVITY;

/// Degrees per radian
const DEGREES_PER_RADIAN: f64 = 180.0 / std::f64::consts::PI;

/// Convert radians (or rad/s) to degrees (or deg/s)
#[inline]
pub fn radians_to_degrees(radians: f64) -> f64 {
    DEGREES_PER_RADIAN * radians
}

/// Convert an acceleration in m/s² to multiples of standard gravity
#[inline]
pub fn accel_to_g(accel: f64) -> f64 {
    accel / STANDARD_GRAVITY
}

/// Fold an angle in degrees that went past `±band` back towards zero.
///
/// Values with `|angle| <= band` pass through unchanged. The fold is
/// mirrored about ±90°, so it only brings values into the band for
/// `|angle| <= 180` when `band` is 90.
pub fn wrap_angle(angle: f64, band: f64) -> f64 {
    let magnitude = angle.abs();
    if magnitude <= band {
        return angle;
    }

    let direction = angle / magnitude;
    180.0 * direction - angle
}
