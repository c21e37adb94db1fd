//! Network Infrastructure
//!
//! Transport layer for GovTalk submissions. The client hands a packaged
//! envelope and a gateway URL to a [`Transport`]; the transport returns the
//! gateway's status code and raw body, or a [`TransportError`].
//!
//! - [`HttpTransport`]: default HTTPS transport built on `reqwest`
//! - [`MockTransport`]: scripted transport for tests and offline use

pub mod error;
pub mod transports;

pub use error::{Result, TransportError};
pub use transports::{HttpTransport, MockTransport, Transport, TransportResponse};
