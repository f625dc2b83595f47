//! Property tests for the datagram decoder and angle conversions.
//!
//! The decoder faces whatever arrives on the port, so it must never panic
//! and must never let a malformed value into a record.

use condor_bridge::condor::convert::wrap_angle;
use condor_bridge::condor::decoder::{parse_sample, Decoder};
use condor_bridge::condor::protocol::{ATTITUDE_WRAP_BAND, MIN_LINE_COUNT};
use proptest::prelude::*;

const FILLER_KEYS: [&str; 16] = [
    "airspeed", "altitude", "vario", "evario", "nettovario", "integrator", "compass",
    "slipball", "turnrate", "yawstringangle", "radiofrequency", "yaw", "pitch", "bank",
    "ax", "az",
];

/// A well-formed datagram with `time` first and 16 filler lines after it
fn datagram_with_time(time: f64, filler: &[f64]) -> String {
    let mut payload = format!("time={time}\n");
    for (key, value) in FILLER_KEYS.iter().zip(filler) {
        payload.push_str(&format!("{key}={value}\n"));
    }
    payload
}

proptest! {
    #[test]
    fn decode_no_panic_on_arbitrary_bytes(
        data in proptest::collection::vec(any::<u8>(), 0..2048)
    ) {
        let mut decoder = Decoder::new();
        let payload = String::from_utf8_lossy(&data);
        if decoder.decode(&payload).is_some() {
            prop_assert!(payload.split('\n').count() >= MIN_LINE_COUNT);
        }
    }

    #[test]
    fn decode_no_panic_on_arbitrary_lines(
        lines in proptest::collection::vec("[a-z]{0,12}(=[-+0-9.eEinfNa ]{0,16})?", 0..40)
    ) {
        let payload = lines.join("\n");
        let sample = parse_sample(&payload);
        for (key, value) in sample.entries() {
            prop_assert!(value.is_finite(), "{} = {}", key, value);
        }

        let mut decoder = Decoder::new();
        let record = decoder.decode(&payload);
        prop_assert_eq!(record.is_some(), payload.split('\n').count() >= MIN_LINE_COUNT);
    }

    #[test]
    fn short_datagrams_are_never_published(
        lines in proptest::collection::vec("[a-z]{1,8}=[0-9]{1,4}", 0..MIN_LINE_COUNT)
    ) {
        let payload = lines.join("\n");
        let mut decoder = Decoder::new();
        prop_assert!(decoder.decode(&payload).is_none());
    }

    #[test]
    fn parsed_values_round_trip(
        time in -1.0e6f64..1.0e6,
        filler in proptest::collection::vec(-1.0e3f64..1.0e3, 16)
    ) {
        let payload = datagram_with_time(time, &filler);
        let sample = parse_sample(&payload);
        prop_assert_eq!(sample.get("time"), Some(time));
        // 17 terminated lines plus the empty one after the last
        prop_assert_eq!(sample.line_count(), 18);

        let mut decoder = Decoder::new();
        let record = decoder.decode(&payload);
        prop_assert!(record.is_some());
        prop_assert_eq!(record.map(|r| r.time), Some(time));
    }

    #[test]
    fn wrap_stays_within_band(angle in -180.0f64..=180.0) {
        let wrapped = wrap_angle(angle, ATTITUDE_WRAP_BAND);
        prop_assert!(wrapped.abs() <= ATTITUDE_WRAP_BAND, "{} -> {}", angle, wrapped);
    }

    #[test]
    fn wrap_is_identity_inside_band(angle in -90.0f64..=90.0) {
        prop_assert_eq!(wrap_angle(angle, ATTITUDE_WRAP_BAND), angle);
    }

    #[test]
    fn wrap_preserves_sign_outside_band(angle in 90.0001f64..180.0) {
        prop_assert!(wrap_angle(angle, ATTITUDE_WRAP_BAND) > 0.0);
        prop_assert!(wrap_angle(-angle, ATTITUDE_WRAP_BAND) < 0.0);
    }
}
