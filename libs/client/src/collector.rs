//! # Error Collector
//!
//! Ordered history of everything that went wrong for one client: rejected
//! setter values, failed builds and transports, unparsable responses and the
//! errors the gateway itself reported. Sends append; only `clear` empties it.

use govtalk_codec::{BuildError, ParseError};
use govtalk_network::TransportError;
use govtalk_types::{ErrorSource, GatewayError, ValidationError};
use std::fmt;

/// Origin of an [`ErrorRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Scalar value rejected by a setter
    Validation,
    /// Malformed compound value rejected by a table
    Structural,
    /// Envelope could not be packaged
    Build,
    /// Network round trip failed
    Transport,
    /// Response was not a usable envelope
    Parse,
    /// `GovTalkErrors` entry reported by the gateway
    Gateway,
    /// `ErrorResponse` entry reported by the back-end system
    Business,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Structural => "structural",
            ErrorKind::Build => "build",
            ErrorKind::Transport => "transport",
            ErrorKind::Parse => "parse",
            ErrorKind::Gateway => "gateway",
            ErrorKind::Business => "business",
        }
    }

    /// Errors raised by the remote side rather than by this client
    pub fn is_remote(&self) -> bool {
        matches!(self, ErrorKind::Gateway | ErrorKind::Business)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One collected error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub code: String,
    pub description: String,
    /// Operation name for local errors, gateway `Location` for remote ones
    pub location: Option<String>,
}

impl ErrorRecord {
    pub fn validation(err: &ValidationError, operation: &str) -> Self {
        let kind = if err.is_structural() {
            ErrorKind::Structural
        } else {
            ErrorKind::Validation
        };
        Self {
            kind,
            code: err.code().to_string(),
            description: err.to_string(),
            location: Some(operation.to_string()),
        }
    }

    pub fn build(err: &BuildError) -> Self {
        let code = match err {
            BuildError::MissingField { .. } => "missing-field",
            BuildError::AlternativeAuthenticationUnavailable => "no-authenticator",
            BuildError::AuthenticationFailed { .. } => "authentication-failed",
            BuildError::BodyNotText { .. } => "body-not-text",
            BuildError::Malformed(_) => "malformed-envelope",
            BuildError::Xml(_) => "xml-write",
        };
        Self {
            kind: ErrorKind::Build,
            code: code.to_string(),
            description: err.to_string(),
            location: None,
        }
    }

    pub fn transport(err: &TransportError, url: &str) -> Self {
        Self {
            kind: ErrorKind::Transport,
            code: err.category().to_string(),
            description: err.to_string(),
            location: Some(url.to_string()),
        }
    }

    pub fn parse(err: &ParseError) -> Self {
        let code = match err {
            ParseError::Empty => "empty-response",
            ParseError::Xml { .. } => "malformed-xml",
            ParseError::NotAnEnvelope { .. } => "not-an-envelope",
            ParseError::MissingElement { .. } => "missing-element",
            ParseError::UnknownQualifier(_) => "unknown-qualifier",
        };
        Self {
            kind: ErrorKind::Parse,
            code: code.to_string(),
            description: err.to_string(),
            location: None,
        }
    }

    pub fn gateway(err: &GatewayError) -> Self {
        let kind = match err.source {
            ErrorSource::Envelope => ErrorKind::Gateway,
            ErrorSource::Business => ErrorKind::Business,
        };
        Self {
            kind,
            code: err.number.clone(),
            description: err.text.clone(),
            location: err.location.clone(),
        }
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}] {}", self.kind, self.code, self.description)?;
        if let Some(location) = &self.location {
            write!(f, " at {}", location)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ErrorCollector {
    records: Vec<ErrorRecord>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: ErrorRecord) {
        self.records.push(record);
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn list(&self) -> &[ErrorRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&ErrorRecord> {
        self.records.last()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn of_kind(&self, kind: ErrorKind) -> impl Iterator<Item = &ErrorRecord> {
        self.records.iter().filter(move |record| record.kind == kind)
    }
}
