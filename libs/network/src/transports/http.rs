//! HTTPS transport backed by `reqwest`

use super::{Transport, TransportResponse};
use crate::{Result, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use govtalk_config::gateway::{defaults, CONTENT_TYPE};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default transport used when the client is not given one
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Transport with the default timeout and user agent
    pub fn new() -> Result<Self> {
        Self::with_options(
            Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS),
            defaults::USER_AGENT,
        )
    }

    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(defaults::CONNECT_TIMEOUT_SECS).min(timeout))
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                TransportError::configuration(format!("Failed to build HTTP client: {}", e), None)
            })?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn map_error(&self, url: &str, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::timeout("send", self.timeout.as_millis() as u64)
        } else {
            TransportError::connection(err.to_string(), url)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, url: &str, body: Bytes) -> Result<TransportResponse> {
        let started = Instant::now();
        let request_bytes = body.len();

        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                let err = self.map_error(url, e);
                warn!(url, error = %err, "Gateway request failed");
                err
            })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            TransportError::protocol(format!("Failed to read response body: {}", e))
        })?;

        debug!(
            url,
            status,
            request_bytes,
            response_bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Gateway round trip complete"
        );

        Ok(TransportResponse { status, body })
    }
}
