//! # GovTalk Client Configuration
//!
//! Constants and settings shared by the GovTalk client crates.
//!
//! ## Features
//!
//! - **Protocol Constants**: envelope namespace, version and root element
//! - **Client Defaults**: timeouts and the default user agent
//! - **Client Settings**: layered loading from TOML files and `GOVTALK_*` environment variables
//!
//! ## Usage
//!
//! ```rust
//! use govtalk_config::gateway;
//!
//! let namespace = gateway::ENVELOPE_NAMESPACE;
//! let timeout = gateway::defaults::REQUEST_TIMEOUT_SECS;
//! ```

pub mod client_config;
pub mod gateway;

// Re-export commonly used types
pub use client_config::{load_settings, ClientSettings};
pub use gateway::*;
