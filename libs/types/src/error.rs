//! Validation errors raised when a value violates its protocol contract
//!
//! A `ValidationError` always means the offending write was rejected and the
//! target field or table is unchanged.

use thiserror::Error;

/// Rejection reasons for setters and table admissions
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown authentication method '{0}': expected 'clear' or 'alternative'")]
    UnknownAuthentication(String),

    #[error("Unknown message qualifier '{0}'")]
    UnknownQualifier(String),

    #[error("Unknown transformation '{0}': expected 'XML', 'HTML' or 'text'")]
    UnknownTransformation(String),

    #[error("Message class '{0}' is not a registered GovTalk class")]
    UnknownMessageClass(String),

    #[error("Invalid email address '{0}'")]
    InvalidEmail(String),

    #[error("Invalid date-time '{0}': expected YYYY-MM-DDThh:mm[:ss][.fff]")]
    InvalidTimestamp(String),

    #[error("Invalid correlation id '{0}': expected up to 32 upper-case hex characters")]
    InvalidCorrelationId(String),

    #[error("Invalid gateway URL '{url}': {reason}")]
    InvalidGatewayUrl { url: String, reason: String },

    #[error("Field '{field}' must be a non-empty string")]
    EmptyField { field: &'static str },

    #[error("Field '{field}' exceeds {max} characters (got {got})")]
    FieldTooLong {
        field: &'static str,
        max: usize,
        got: usize,
    },

    #[error("Channel route id must be a (type, value) pair, got {got} element(s)")]
    MalformedRouteId { got: usize },
}

impl ValidationError {
    /// Short machine-readable code used when the error is recorded
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownAuthentication(_) => "unknown-authentication",
            Self::UnknownQualifier(_) => "unknown-qualifier",
            Self::UnknownTransformation(_) => "unknown-transformation",
            Self::UnknownMessageClass(_) => "unknown-message-class",
            Self::InvalidEmail(_) => "invalid-email",
            Self::InvalidTimestamp(_) => "invalid-timestamp",
            Self::InvalidCorrelationId(_) => "invalid-correlation-id",
            Self::InvalidGatewayUrl { .. } => "invalid-gateway-url",
            Self::EmptyField { .. } => "empty-field",
            Self::FieldTooLong { .. } => "field-too-long",
            Self::MalformedRouteId { .. } => "malformed-route-id",
        }
    }

    /// Whether this rejects a malformed compound value rather than a scalar
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::MalformedRouteId { .. })
    }
}

/// Result type for validation
pub type ValidationResult<T> = Result<T, ValidationError>;
