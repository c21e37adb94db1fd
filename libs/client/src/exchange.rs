//! Snapshot of the most recent request/response exchange

use govtalk_types::GovTalkResponse;

/// Everything observed during one send
///
/// Replaced wholesale at the start of every send, never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exchange {
    /// Outgoing document, kept even when it was rejected before sending
    pub request: Option<String>,
    /// Raw text returned by the gateway
    pub response_document: Option<String>,
    /// HTTP status of the gateway's answer
    pub status: Option<u16>,
    /// Decoded response, when the answer was a GovTalk envelope
    pub response: Option<GovTalkResponse>,
}
