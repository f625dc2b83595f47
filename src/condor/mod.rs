//! # Condor Protocol Module
//!
//! Decoding of the Condor 2 UDP telemetry stream.
//!
//! This module handles:
//! - Wire constants and the raw key/value sample
//! - Unit conversions and attitude angle wrapping
//! - Parsing datagrams into normalized telemetry records

pub mod protocol;
pub mod convert;
pub mod decoder;
