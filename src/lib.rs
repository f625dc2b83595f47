//! # Condor Bridge Library
//!
//! Ingest Condor 2 glider simulator telemetry over UDP.
//!
//! This library receives the simulator's line-oriented `key=value` datagrams,
//! decodes them into normalized [`telemetry::record::TelemetryRecord`]s
//! (degrees, g, derived accelerations) and hands each one to a consumer
//! sink, while tracking whether the simulator is live.

pub mod config;
pub mod error;
pub mod condor;
pub mod listener;
pub mod provider;
pub mod telemetry;
