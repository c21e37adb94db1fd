//! Codec errors for envelope construction and response parsing
//!
//! Build errors abort a send before any network activity; parse errors mean
//! the gateway answered with something that is not a usable envelope.

use thiserror::Error;

/// Reasons an outgoing envelope cannot be produced
#[derive(Debug, Error)]
pub enum BuildError {
    /// A field the envelope cannot omit was never set
    #[error("Cannot package envelope: required field '{field}' is not set")]
    MissingField { field: &'static str },

    /// Alternative authentication selected without an authenticator to derive the value
    #[error("Alternative authentication requested but no authenticator is configured")]
    AlternativeAuthenticationUnavailable,

    /// The authenticator declined to produce a value
    #[error("Alternative authenticator failed: {reason}")]
    AuthenticationFailed { reason: String },

    /// Message body could not be rendered as text
    #[error("Message body is not valid UTF-8 text: {reason}")]
    BodyNotText { reason: String },

    /// Packaged envelope failed the well-formedness check
    #[error("Packaged envelope is malformed: {0}")]
    Malformed(#[from] ParseError),

    /// XML writer failure
    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Reasons a gateway response cannot be decoded
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Response contained no XML at all
    #[error("Response document is empty")]
    Empty,

    /// XML syntax error
    #[error("Malformed XML at byte {position}: {message}")]
    Xml { position: usize, message: String },

    /// Document root is not a GovTalk envelope
    #[error("Not a GovTalk envelope: root element is '{root}'")]
    NotAnEnvelope { root: String },

    /// A mandatory element is absent
    #[error("Required element '{element}' missing from response")]
    MissingElement { element: &'static str },

    /// Qualifier outside the protocol's enumeration
    #[error("Response carries unknown qualifier '{0}'")]
    UnknownQualifier(String),
}

impl ParseError {
    pub fn xml(position: usize, err: impl std::fmt::Display) -> Self {
        Self::Xml {
            position,
            message: err.to_string(),
        }
    }
}

/// Result type for envelope construction
pub type BuildResult<T> = Result<T, BuildError>;

/// Result type for response parsing
pub type ParseResult<T> = Result<T, ParseError>;
