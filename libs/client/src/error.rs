//! Client error type
//!
//! Every failure a client operation can report, wrapping the error of the
//! layer it came from. Gateway-reported errors are not failures: they arrive
//! inside a successfully exchanged response.

use govtalk_codec::{BuildError, ParseError};
use govtalk_network::TransportError;
use govtalk_types::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// A setter or table admission rejected its value
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The envelope could not be packaged; nothing was sent
    #[error("Envelope build failed: {0}")]
    Build(#[from] BuildError),

    /// The round trip to the gateway failed
    #[error("Transport failed: {0}")]
    Transport(#[from] TransportError),

    /// The gateway answered with something that is not a GovTalk envelope
    #[error("Response could not be parsed: {0}")]
    Parse(#[from] ParseError),
}

impl ClientError {
    /// Whether the gateway was contacted before the failure
    pub fn reached_gateway(&self) -> bool {
        matches!(self, ClientError::Parse(_))
            || matches!(self, ClientError::Transport(TransportError::Status { .. }))
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
