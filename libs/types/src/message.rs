//! Closed enumerations carried in `MessageDetails` and `SenderDetails`
//!
//! Each set parses from its exact wire spelling and renders back to it, so
//! there is a single place where the permitted strings live.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Authentication method used in `IDAuthentication`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Authentication {
    /// Password sent as-is
    #[default]
    Clear,
    /// Value derived by an alternative authenticator
    Alternative,
}

impl Authentication {
    pub const ALL: [Authentication; 2] = [Self::Clear, Self::Alternative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Alternative => "alternative",
        }
    }
}

impl FromStr for Authentication {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownAuthentication(s.to_string()))
    }
}

impl fmt::Display for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a message in the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageQualifier {
    Request,
    Response,
    Acknowledgement,
    Submission,
    Error,
    Poll,
    Delete,
}

impl MessageQualifier {
    pub const ALL: [MessageQualifier; 7] = [
        Self::Request,
        Self::Response,
        Self::Acknowledgement,
        Self::Submission,
        Self::Error,
        Self::Poll,
        Self::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Response => "response",
            Self::Acknowledgement => "acknowledgement",
            Self::Submission => "submission",
            Self::Error => "error",
            Self::Poll => "poll",
            Self::Delete => "delete",
        }
    }
}

impl FromStr for MessageQualifier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|qualifier| qualifier.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownQualifier(s.to_string()))
    }
}

impl fmt::Display for MessageQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested format of the gateway's response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transformation {
    #[serde(rename = "XML")]
    Xml,
    #[serde(rename = "HTML")]
    Html,
    #[serde(rename = "text")]
    Text,
}

impl Transformation {
    pub const ALL: [Transformation; 3] = [Self::Xml, Self::Html, Self::Text];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xml => "XML",
            Self::Html => "HTML",
            Self::Text => "text",
        }
    }
}

impl FromStr for Transformation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownTransformation(s.to_string()))
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
