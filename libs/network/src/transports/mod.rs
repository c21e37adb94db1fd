//! Unified Transport Layer
//!
//! One trait for every way an envelope can reach a gateway. The client only
//! sees `Transport`; the concrete choice is made at construction time.

use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;

pub mod http;
pub mod mock;

pub use http::HttpTransport;
pub use mock::{MockTransport, RecordedRequest};

/// Transport trait for all gateway transports
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `url` and return the gateway's raw answer
    async fn send(&self, url: &str, body: Bytes) -> Result<TransportResponse>;
}

/// Status code and raw body returned by the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 response carrying `body`
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
