//! Transport Error Types
//!
//! Failures of the HTTP round trip itself. Gateway-reported errors arrive as
//! a successful transport response and are decoded by the codec.

use thiserror::Error;

/// Main transport error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection could not be established or was dropped
    #[error("Connection error: {message} (url: {url})")]
    Connection { message: String, url: String },

    /// Request exceeded its deadline
    #[error("Timeout error: {operation} exceeded {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    /// Gateway answered with a non-success status and no usable envelope
    #[error("HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// Response body could not be read
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// Transport could not be configured
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
    },
}

/// Result type alias for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

impl TransportError {
    /// Create a connection error
    pub fn connection(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    pub fn status(status: u16, url: impl Into<String>) -> Self {
        Self::Status {
            status,
            url: url.into(),
        }
    }

    /// Create a protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>, field: Option<&str>) -> Self {
        Self::Configuration {
            message: message.into(),
            field: field.map(|s| s.to_string()),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            TransportError::Connection { .. } => "connection",
            TransportError::Timeout { .. } => "timeout",
            TransportError::Status { .. } => "status",
            TransportError::Protocol { .. } => "protocol",
            TransportError::Configuration { .. } => "configuration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(TransportError::connection("refused", "https://gw").category(), "connection");
        assert_eq!(TransportError::status(503, "https://gw").category(), "status");
        assert_eq!(TransportError::protocol("truncated").category(), "protocol");
        assert_eq!(
            TransportError::configuration("bad agent", Some("user_agent")).category(),
            "configuration"
        );
    }

    #[test]
    fn test_error_display() {
        let err = TransportError::timeout("send", 1500);
        assert_eq!(err.to_string(), "Timeout error: send exceeded 1500ms");
        assert_eq!(err.category(), "timeout");

        let err = TransportError::status(502, "https://gw/submission");
        assert_eq!(err.to_string(), "HTTP status 502 from https://gw/submission");
    }
}
