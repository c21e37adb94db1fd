//! # GovTalk Client
//!
//! Client for the GovTalk envelope protocol used to file submissions with
//! UK government gateways (HMRC Transaction Engine, Companies House).
//!
//! ```text
//! GovTalkClient
//!   ├── ConfigurationState     validated scalar settings
//!   ├── MessageKeyStore        <Keys>
//!   ├── TargetOrganisationList <TargetDetails>
//!   ├── ChannelRoutingTable    <ChannelRouting>, one per message
//!   ├── Transport              HTTPS or scripted
//!   └── ErrorCollector         history of local and gateway errors
//! ```
//!
//! A typical submission:
//!
//! ```no_run
//! # async fn submit() -> govtalk_client::ClientResult<()> {
//! use govtalk_client::GovTalkClient;
//!
//! let mut client = GovTalkClient::new(
//!     "https://transaction-engine.tax.service.gov.uk/submission",
//!     "sender-id",
//!     "password",
//!     None,
//! )?;
//! client.set_message_class("HMRC-VAT-DEC")?;
//! client.set_message_qualifier("request")?;
//! client.set_message_function("submit")?;
//! client.add_message_key("VATRegNo", "999900001")?;
//! client.set_message_body("<IRenvelope/>");
//!
//! client.send_message(None).await?;
//! if client.response_has_errors() {
//!     for error in client.response_errors() {
//!         eprintln!("{}: {}", error.number, error.text);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod collector;
pub mod error;
pub mod exchange;

pub use client::GovTalkClient;
pub use collector::{ErrorCollector, ErrorKind, ErrorRecord};
pub use error::{ClientError, ClientResult};
pub use exchange::Exchange;

pub use govtalk_codec::{AlternativeAuthenticator, AuthenticationValue, MessageBody, SenderCredentials};
pub use govtalk_config::{load_settings, ClientSettings};
pub use govtalk_network::{HttpTransport, MockTransport, Transport, TransportError, TransportResponse};
pub use govtalk_types::{
    Authentication, ErrorSource, GatewayError, GovTalkResponse, MessageQualifier,
    ResponseEndpoint, RouteCandidate, RouteId, StatusRecord, Transformation, ValidationError,
};
