//! # Telemetry Event
//!
//! Payload delivered to the consumer once per decoded datagram.

use std::net::SocketAddr;

use super::accessor::{self, TelemetryValue};
use super::record::TelemetryRecord;
use crate::error::Result;

/// One decoded sample plus where and when it came from.
///
/// The event owns its copy of the record; the listener keeps its own.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryEvent {
    record: TelemetryRecord,
    sequence: u64,
    source: SocketAddr,
    datagram_len: usize,
}

impl TelemetryEvent {
    pub fn new(record: TelemetryRecord, sequence: u64, source: SocketAddr, datagram_len: usize) -> Self {
        Self {
            record,
            sequence,
            source,
            datagram_len,
        }
    }

    /// The decoded record
    pub fn record(&self) -> &TelemetryRecord {
        &self.record
    }

    /// Take ownership of the record
    pub fn into_record(self) -> TelemetryRecord {
        self.record
    }

    /// Position in receipt order, starting at 0 for each listener start
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Address the datagram was sent from
    pub fn source(&self) -> SocketAddr {
        self.source
    }

    /// Size of the datagram in bytes
    pub fn datagram_len(&self) -> usize {
        self.datagram_len
    }

    /// Read a field of the record by name
    pub fn value_by_name(&self, name: &str) -> Result<TelemetryValue> {
        self.record.value_by_name(name)
    }

    /// Names accepted by [`TelemetryEvent::value_by_name`]
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> {
        accessor::field_names()
    }
}
