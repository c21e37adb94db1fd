//! # Channel Routing Table
//!
//! Candidate routes plus a single active override. Exactly one route (or
//! none) is serialized per message:
//!
//! 1. the active override, consumed by the send that uses it
//! 2. else the most recently added candidate flagged `overwrite`
//! 3. else the most recently added candidate
//!
//! Candidates are validated on admission so a malformed route never reaches
//! envelope construction.

use crate::registry;
use govtalk_types::{RouteCandidate, ValidationResult};
use tracing::debug;

/// Route resolved for one send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSelection {
    /// Explicit per-message override
    Override(RouteCandidate),
    /// Chosen from the candidate table
    Table(RouteCandidate),
    /// No route configured
    Unrouted,
}

impl RouteSelection {
    pub fn route(&self) -> Option<&RouteCandidate> {
        match self {
            RouteSelection::Override(route) | RouteSelection::Table(route) => Some(route),
            RouteSelection::Unrouted => None,
        }
    }

    pub fn is_override(&self) -> bool {
        matches!(self, RouteSelection::Override(_))
    }
}

/// Candidate list plus the active-override slot
#[derive(Debug, Clone, Default)]
pub struct ChannelRoutingTable {
    candidates: Vec<RouteCandidate>,
    active: Option<RouteCandidate>,
}

impl ChannelRoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate after validating its shape
    pub fn add(&mut self, candidate: RouteCandidate) -> ValidationResult<()> {
        validate_candidate(&candidate)?;
        debug!(uri = %candidate.uri, product = %candidate.product, "Channel route added");
        self.candidates.push(candidate);
        Ok(())
    }

    /// Place a route in the override slot, replacing any previous override
    pub fn set_active(&mut self, candidate: RouteCandidate) -> ValidationResult<()> {
        validate_candidate(&candidate)?;
        debug!(uri = %candidate.uri, product = %candidate.product, "Channel route override set");
        self.active = Some(candidate);
        Ok(())
    }

    pub fn active(&self) -> Option<&RouteCandidate> {
        self.active.as_ref()
    }

    pub fn candidates(&self) -> &[RouteCandidate] {
        &self.candidates
    }

    /// What the next send would use, without consuming the override
    pub fn select(&self) -> RouteSelection {
        if let Some(route) = &self.active {
            return RouteSelection::Override(route.clone());
        }
        self.select_from_table()
    }

    /// Resolve the route for a send; an override is cleared once taken
    pub fn take_selection(&mut self) -> RouteSelection {
        match self.active.take() {
            Some(route) => RouteSelection::Override(route),
            None => self.select_from_table(),
        }
    }

    fn select_from_table(&self) -> RouteSelection {
        self.candidates
            .iter()
            .rev()
            .find(|candidate| candidate.overwrite)
            .or_else(|| self.candidates.last())
            .cloned()
            .map(RouteSelection::Table)
            .unwrap_or(RouteSelection::Unrouted)
    }

    /// Drop every candidate and the override
    pub fn reset(&mut self) {
        self.candidates.clear();
        self.active = None;
    }
}

fn validate_candidate(candidate: &RouteCandidate) -> ValidationResult<()> {
    registry::require_non_empty("uri", &candidate.uri)?;
    registry::require_non_empty("product", &candidate.product)?;
    registry::require_non_empty("version", &candidate.version)?;

    for id in &candidate.ids {
        registry::require_non_empty("id_type", &id.id_type)?;
        registry::require_non_empty("id_value", &id.value)?;
    }

    if let Some(timestamp) = &candidate.timestamp {
        registry::validate_timestamp(timestamp)?;
    }
    Ok(())
}
