//! # GovTalk Protocol Codec
//!
//! ## Purpose
//!
//! The "Rules" layer of the client: everything needed to turn configured
//! message state into an outgoing GovTalk envelope and to turn the gateway's
//! reply back into typed data. No I/O happens here.
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → [codec] → libs/client → libs/network
//!     ↑           ↓            ↓
//! Pure Data   Validation    Transport
//! Structures  Envelopes     (HTTP / mock)
//! ```
//!
//! ## What This Crate Contains
//! - **ValidationRegistry**: message class table and field validators
//! - **ConfigurationState**: validated per-message settings
//! - **MessageKeyStore / TargetOrganisationList**: ordered envelope tables
//! - **ChannelRoutingTable**: route candidates plus one-shot override
//! - **EnvelopeBuilder**: deterministic envelope serialisation
//! - **Parser**: response decoding, envelope detection, status reports
//!
//! ## What This Crate Does NOT Contain
//! - Network transport logic (belongs in network/)
//! - Raw data structure definitions (belongs in libs/types)
//! - Error history across sends (belongs in client/)

pub mod auth;
pub mod body;
pub mod builder;
pub mod error;
pub mod parser;
pub mod registry;
pub mod routing;
pub mod state;
pub mod tables;

pub use auth::{AlternativeAuthenticator, AuthenticationValue, SenderCredentials};
pub use body::MessageBody;
pub use builder::{next_transaction_id, verify_document, EnvelopeBuilder};
pub use error::{BuildError, BuildResult, ParseError, ParseResult};
pub use parser::{
    is_envelope, parse_response, parse_status_report, root_element, verify_envelope,
};
pub use registry::{ValidationRegistry, KNOWN_MESSAGE_CLASSES, MAX_ORGANISATION_LENGTH};
pub use routing::{ChannelRoutingTable, RouteSelection};
pub use state::ConfigurationState;
pub use tables::{MessageKeyStore, TargetOrganisationList};
