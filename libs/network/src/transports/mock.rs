//! Scripted transport
//!
//! Replies are served first-in first-out. Every request is recorded so tests
//! can inspect exactly what would have gone over the wire.

use super::{Transport, TransportResponse};
use crate::{Result, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::debug;

/// A request seen by [`MockTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Result<TransportResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a 200 reply
    pub fn push_ok(&self, body: impl Into<Bytes>) {
        self.push_response(TransportResponse::ok(body));
    }

    pub fn push_response(&self, response: TransportResponse) {
        self.replies.lock().push_back(Ok(response));
    }

    pub fn push_failure(&self, error: TransportError) {
        self.replies.lock().push_back(Err(error));
    }

    /// Replies not yet consumed
    pub fn pending(&self) -> usize {
        self.replies.lock().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, url: &str, body: Bytes) -> Result<TransportResponse> {
        self.requests.lock().push(RecordedRequest {
            url: url.to_string(),
            body,
        });

        let reply = self.replies.lock().pop_front();
        debug!(url, scripted = reply.is_some(), "Mock transport send");
        reply.unwrap_or_else(|| {
            Err(TransportError::connection(
                "no scripted reply available",
                url,
            ))
        })
    }
}
