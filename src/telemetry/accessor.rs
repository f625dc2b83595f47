//! # Field Accessor
//!
//! Name-indexed access to [`TelemetryRecord`] fields for generic consumers
//! that pick channels from configuration.
//!
//! Lookup goes through a static table of `(name, unit, accessor fn)` entries,
//! so the set of names is fixed at compile time and can be enumerated.
//!
//! ```
//! use condor_bridge::telemetry::accessor::{field_names, lookup};
//! use condor_bridge::telemetry::record::TelemetryRecord;
//!
//! let record = TelemetryRecord { air_speed: 31.5, ..Default::default() };
//! assert_eq!(lookup(&record, "airSpeed")?, 31.5);
//! assert!(lookup(&record, "bogus").is_err());
//! assert!(field_names().any(|name| name == "surgeAlternative"));
//! # Ok::<(), condor_bridge::error::BridgeError>(())
//! ```

use std::fmt;

use super::record::TelemetryRecord;
use crate::error::{BridgeError, Result};

/// Unit a field is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Dimensionless or simulator-defined
    None,
    Hours,
    Milliseconds,
    Meters,
    MetersPerSecond,
    Degrees,
    DegreesPerSecond,
    /// Multiples of standard gravity
    G,
    Megahertz,
}

impl Unit {
    /// Short symbol, empty for [`Unit::None`]
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::None => "",
            Unit::Hours => "h",
            Unit::Milliseconds => "ms",
            Unit::Meters => "m",
            Unit::MetersPerSecond => "m/s",
            Unit::Degrees => "deg",
            Unit::DegreesPerSecond => "deg/s",
            Unit::G => "g",
            Unit::Megahertz => "MHz",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One entry of the field table
#[derive(Clone, Copy)]
pub struct FieldDescriptor {
    /// Channel name as used in consumer configuration
    pub name: &'static str,
    pub unit: Unit,
    read: fn(&TelemetryRecord) -> f64,
}

impl FieldDescriptor {
    /// Read this field from `record`
    pub fn read(&self, record: &TelemetryRecord) -> f64 {
        (self.read)(record)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("unit", &self.unit)
            .finish_non_exhaustive()
    }
}

macro_rules! field {
    ($name:literal, $unit:ident, $field:ident) => {
        FieldDescriptor {
            name: $name,
            unit: Unit::$unit,
            read: |record: &TelemetryRecord| record.$field,
        }
    };
}

/// Every field the accessor supports, in presentation order
pub static FIELDS: &[FieldDescriptor] = &[
    field!("time", Hours, time),
    field!("airSpeed", None, air_speed),
    field!("altitude", Meters, altitude),
    field!("vario", MetersPerSecond, vario),
    field!("evario", MetersPerSecond, evario),
    field!("nettovario", MetersPerSecond, nettovario),
    field!("integrator", MetersPerSecond, integrator),
    field!("compass", Degrees, compass),
    field!("slipBall", Degrees, slip_ball),
    field!("slipBallAlternative", Degrees, slip_ball_alternative),
    field!("turnRate", DegreesPerSecond, turn_rate),
    field!("yawStringAngle", Degrees, yaw_string_angle),
    field!("radioFrequency", Megahertz, radio_frequency),
    field!("pitch", Degrees, pitch),
    field!("yaw", Degrees, yaw),
    field!("roll", Degrees, roll),
    field!("pitchAlternative", None, pitch_alternative),
    field!("yawAlternative", None, yaw_alternative),
    field!("rollAlternative", None, roll_alternative),
    field!("surge", G, surge),
    field!("sway", G, sway),
    field!("heave", G, heave),
    field!("surgeAlternative", None, surge_alternative),
    field!("rollRate", DegreesPerSecond, roll_rate),
    field!("pitchRate", DegreesPerSecond, pitch_rate),
    field!("yawRate", DegreesPerSecond, yaw_rate),
    field!("gForce", G, g_force),
    field!("speedX", MetersPerSecond, speed_x),
    field!("speedY", MetersPerSecond, speed_y),
    field!("speedZ", MetersPerSecond, speed_z),
    field!("quaternionX", None, quaternion_x),
    field!("quaternionY", None, quaternion_y),
    field!("quaternionZ", None, quaternion_z),
    field!("quaternionW", None, quaternion_w),
    field!("height", Meters, height),
    field!("wheelHeight", Meters, wheel_height),
    field!("turbulenceStrength", None, turbulence_strength),
    field!("surfaceRoughness", None, surface_roughness),
    FieldDescriptor {
        name: "elapsedMilliseconds",
        unit: Unit::Milliseconds,
        read: |record: &TelemetryRecord| record.elapsed_milliseconds as f64,
    },
];

/// Find the table entry for `name` (case-sensitive)
pub fn descriptor(name: &str) -> Option<&'static FieldDescriptor> {
    FIELDS.iter().find(|field| field.name == name)
}

/// Read the field called `name` from `record`
///
/// # Errors
///
/// Returns [`BridgeError::FieldNotFound`] if `name` is not in [`FIELDS`]
pub fn lookup(record: &TelemetryRecord, name: &str) -> Result<f64> {
    descriptor(name)
        .map(|field| field.read(record))
        .ok_or_else(|| BridgeError::FieldNotFound(name.to_string()))
}

/// Names of all supported fields, in table order
pub fn field_names() -> impl Iterator<Item = &'static str> {
    FIELDS.iter().map(|field| field.name)
}

/// A named, unit-tagged value read from a record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryValue {
    pub name: &'static str,
    pub value: f64,
    pub unit: Unit,
}

impl fmt::Display for TelemetryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Unit::None => write!(f, "{}", self.value),
            unit => write!(f, "{} {}", self.value, unit),
        }
    }
}

impl TelemetryRecord {
    /// Read a field by name, see [`lookup`]
    pub fn value(&self, name: &str) -> Result<f64> {
        lookup(self, name)
    }

    /// Read a field by name together with its unit
    pub fn value_by_name(&self, name: &str) -> Result<TelemetryValue> {
        let field = descriptor(name).ok_or_else(|| BridgeError::FieldNotFound(name.to_string()))?;
        Ok(TelemetryValue {
            name: field.name,
            value: field.read(self),
            unit: field.unit,
        })
    }

    /// Every field as a named value, in table order
    pub fn values(&self) -> impl Iterator<Item = TelemetryValue> + '_ {
        FIELDS.iter().map(move |field| TelemetryValue {
            name: field.name,
            value: field.read(self),
            unit: field.unit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample_record() -> TelemetryRecord {
        TelemetryRecord {
            time: 17.0,
            air_speed: 30.5,
            pitch: 4.9,
            roll: -4.1,
            yaw: 30.4,
            surge: 0.14,
            g_force: 1.38,
            wheel_height: -0.03,
            elapsed_milliseconds: 1234,
            ..TelemetryRecord::default()
        }
    }

    #[test]
    fn test_lookup_known_fields() {
        let record = sample_record();
        assert_eq!(lookup(&record, "airSpeed").unwrap(), 30.5);
        assert_eq!(lookup(&record, "pitch").unwrap(), 4.9);
        assert_eq!(lookup(&record, "roll").unwrap(), -4.1);
        assert_eq!(lookup(&record, "gForce").unwrap(), 1.38);
        assert_eq!(lookup(&record, "wheelHeight").unwrap(), -0.03);
        assert_eq!(lookup(&record, "elapsedMilliseconds").unwrap(), 1234.0);
    }

    #[test]
    fn test_lookup_unknown_field() {
        let record = sample_record();
        match lookup(&record, "bogus") {
            Err(BridgeError::FieldNotFound(name)) => assert_eq!(name, "bogus"),
            other => panic!("Expected FieldNotFound, got: {:?}", other),
        }
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let record = sample_record();
        assert!(lookup(&record, "AirSpeed").is_err());
        assert!(lookup(&record, "airspeed").is_err());
    }

    #[test]
    fn test_field_names_unique_and_resolvable() {
        let record = sample_record();
        let names: Vec<&str> = field_names().collect();
        let unique: HashSet<&str> = names.iter().copied().collect();
        assert_eq!(names.len(), unique.len(), "duplicate field names");

        for name in names {
            assert!(lookup(&record, name).is_ok(), "{} should resolve", name);
        }
    }

    #[test]
    fn test_field_names_cover_schema() {
        let names: HashSet<&str> = field_names().collect();
        for expected in [
            "time", "airSpeed", "altitude", "vario", "evario", "nettovario", "integrator",
            "compass", "slipBall", "turnRate", "yawStringAngle", "radioFrequency", "pitch",
            "yaw", "roll", "surge", "sway", "heave", "rollRate", "pitchRate", "yawRate",
            "gForce", "speedX", "speedY", "speedZ", "quaternionX", "quaternionY",
            "quaternionZ", "quaternionW", "height", "wheelHeight", "turbulenceStrength",
            "surfaceRoughness", "surgeAlternative", "elapsedMilliseconds",
        ] {
            assert!(names.contains(expected), "missing field {}", expected);
        }
    }

    #[test]
    fn test_field_names_match_serialized_record() {
        let json = serde_json::to_value(TelemetryRecord::default()).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), FIELDS.len());
        for name in field_names() {
            assert!(object.contains_key(name), "{} missing from serialized record", name);
        }
    }

    #[test]
    fn test_value_by_name_carries_unit() {
        let record = sample_record();
        let value = record.value_by_name("surge").unwrap();
        assert_eq!(value.name, "surge");
        assert_eq!(value.value, 0.14);
        assert_eq!(value.unit, Unit::G);
        assert_eq!(value.to_string(), "0.14 g");

        let unitless = record.value_by_name("surgeAlternative").unwrap();
        assert_eq!(unitless.to_string(), "0");
    }

    #[test]
    fn test_values_iterates_in_table_order() {
        let record = sample_record();
        let values: Vec<TelemetryValue> = record.values().collect();
        assert_eq!(values.len(), FIELDS.len());
        assert_eq!(values[0].name, "time");
        assert_eq!(values[0].value, 17.0);
    }
}
