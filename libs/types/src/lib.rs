//! # GovTalk Types
//!
//! Pure data shared by every layer of the GovTalk client:
//!
//! - **Message enumerations**: `Authentication`, `MessageQualifier`, `Transformation`
//! - **Channel routing**: `RouteCandidate` and its `(type, value)` `RouteId`s
//! - **Responses**: `GovTalkResponse`, `GatewayError`, `ResponseEndpoint`, `StatusRecord`
//! - **Validation errors** shared by setters and table admissions
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → libs/codec → libs/client
//!     ↑            ↓            ↓
//! Pure Data   Envelope XML   Orchestration
//!             Validation     + Transport
//! ```
//!
//! This crate never touches XML or the network.

pub mod error;
pub mod message;
pub mod response;
pub mod routing;

pub use error::{ValidationError, ValidationResult};
pub use message::{Authentication, MessageQualifier, Transformation};
pub use response::{ErrorSource, GatewayError, GovTalkResponse, ResponseEndpoint, StatusRecord};
pub use routing::{RouteCandidate, RouteId};
