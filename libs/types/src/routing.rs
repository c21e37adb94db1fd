//! Channel routing candidates
//!
//! A `RouteCandidate` describes the third-party product a submission passed
//! through. Only one candidate is ever serialized per message; selection
//! happens in the codec's routing table.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// A `(type, value)` identifier attached to a channel route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteId {
    pub id_type: String,
    pub value: String,
}

impl RouteId {
    pub fn new(id_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id_type: id_type.into(),
            value: value.into(),
        }
    }

    /// Build from a loosely shaped sequence, which must hold exactly two parts
    pub fn from_parts<S: AsRef<str>>(parts: &[S]) -> Result<Self, ValidationError> {
        match parts {
            [id_type, value] => Ok(Self::new(id_type.as_ref(), value.as_ref())),
            _ => Err(ValidationError::MalformedRouteId { got: parts.len() }),
        }
    }
}

impl<T: Into<String>, V: Into<String>> From<(T, V)> for RouteId {
    fn from((id_type, value): (T, V)) -> Self {
        Self::new(id_type, value)
    }
}

/// One channel routing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteCandidate {
    pub uri: String,
    pub product: String,
    pub version: String,
    pub ids: Vec<RouteId>,
    pub timestamp: Option<String>,
    /// Preferred over later non-overwrite candidates during table selection
    pub overwrite: bool,
}

impl RouteCandidate {
    pub fn new(
        uri: impl Into<String>,
        product: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            product: product.into(),
            version: version.into(),
            ids: Vec::new(),
            timestamp: None,
            overwrite: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<RouteId>) -> Self {
        self.ids.push(id.into());
        self
    }

    pub fn with_ids<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<RouteId>,
    {
        self.ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Append ids given as loose `[type, value]` sequences
    ///
    /// One malformed sequence rejects the whole candidate.
    pub fn with_id_parts<P, S>(mut self, parts: &[P]) -> Result<Self, ValidationError>
    where
        P: AsRef<[S]>,
        S: AsRef<str>,
    {
        for part in parts {
            self.ids.push(RouteId::from_parts(part.as_ref())?);
        }
        Ok(self)
    }

    /// An empty timestamp is treated as no timestamp at all
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        let timestamp = timestamp.into();
        self.timestamp = if timestamp.is_empty() {
            None
        } else {
            Some(timestamp)
        };
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}
