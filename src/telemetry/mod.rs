//! # Telemetry Module
//!
//! Normalized telemetry records and the ways consumers read them.
//!
//! This module handles:
//! - The immutable per-datagram record
//! - Field lookup by name with units
//! - The event payload handed to sinks
//! - Optional recording to rotating JSONL files

pub mod record;
pub mod accessor;
pub mod event;
pub mod recorder;
