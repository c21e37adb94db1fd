//! Decoded gateway responses
//!
//! `GovTalkResponse` is the uniform shape every gateway reply (acknowledgement,
//! error, response, poll answer) is decoded into.

use crate::message::MessageQualifier;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Formats the gateway uses for `GatewayTimestamp`
const GATEWAY_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M%.f"];

/// Where an error record was found in the response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSource {
    /// `GovTalkDetails/GovTalkErrors/Error`
    Envelope,
    /// `Body/ErrorResponse/Error`, raised by the back-end business system
    Business,
}

/// One error reported by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayError {
    pub source: ErrorSource,
    pub raised_by: Option<String>,
    pub number: String,
    pub error_type: Option<String>,
    pub text: String,
    pub location: Option<String>,
}

/// `ResponseEndPoint` together with its `PollInterval` attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEndpoint {
    pub url: String,
    /// Seconds to wait before polling
    pub poll_interval: Option<u64>,
}

/// Entry of a `StatusReport` returned for a list request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub timestamp: String,
    pub correlation_id: String,
    pub transaction_id: String,
    pub status: String,
}

/// Structured view of one gateway response envelope
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GovTalkResponse {
    pub qualifier: Option<MessageQualifier>,
    pub class: Option<String>,
    pub function: Option<String>,
    pub correlation_id: Option<String>,
    pub transaction_id: Option<String>,
    pub gateway_timestamp: Option<String>,
    pub response_endpoint: Option<ResponseEndpoint>,
    /// Inner markup of `Body`, verbatim
    pub body: String,
    pub errors: Vec<GatewayError>,
}

impl GovTalkResponse {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// `GatewayTimestamp` as a date-time, when present and well formed
    pub fn gateway_timestamp_parsed(&self) -> Option<NaiveDateTime> {
        let raw = self.gateway_timestamp.as_deref()?;
        GATEWAY_TIMESTAMP_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    }

    /// Errors raised by the envelope layer only
    pub fn envelope_errors(&self) -> impl Iterator<Item = &GatewayError> {
        self.errors
            .iter()
            .filter(|e| e.source == ErrorSource::Envelope)
    }

    /// Errors raised by the business back end only
    pub fn business_errors(&self) -> impl Iterator<Item = &GatewayError> {
        self.errors
            .iter()
            .filter(|e| e.source == ErrorSource::Business)
    }
}
