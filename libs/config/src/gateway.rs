//! GovTalk envelope constants and gateway defaults

/// Namespace of the GovTalk 2.0 envelope
pub const ENVELOPE_NAMESPACE: &str = "http://www.govtalk.gov.uk/CM/envelope";

/// Envelope schema version written into every request
pub const ENVELOPE_VERSION: &str = "2.0";

/// Root element of every GovTalk document
pub const ROOT_ELEMENT: &str = "GovTalkMessage";

/// Content type used when posting envelopes
pub const CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Client defaults
pub mod defaults {
    /// Request timeout (seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Connection timeout (seconds)
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// User agent sent with every request
    pub const USER_AGENT: &str = concat!("govtalk-rs/", env!("CARGO_PKG_VERSION"));
}
