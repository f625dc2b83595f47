//! # Error Types
//!
//! Custom error types for Condor Bridge using `thiserror`.

use std::net::SocketAddr;
use thiserror::Error;

/// Main error type for Condor Bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A field name that is not part of the telemetry schema
    #[error("Unknown telemetry field: {0}")]
    FieldNotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// UDP socket could not be bound
    #[error("Failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Telemetry recorder serialization errors
    #[error("Recorder error: {0}")]
    Recorder(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Condor Bridge
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_not_found_message() {
        let err = BridgeError::FieldNotFound("bogus".to_string());
        assert_eq!(err.to_string(), "Unknown telemetry field: bogus");
    }

    #[test]
    fn test_bind_error_keeps_source() {
        use std::error::Error;

        let addr: SocketAddr = "127.0.0.1:55278".parse().unwrap();
        let err = BridgeError::Bind {
            addr,
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
        };
        assert!(err.to_string().contains("127.0.0.1:55278"));
        assert!(err.source().is_some());
    }
}
