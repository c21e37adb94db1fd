//! Ordered message keys and target organisations
//!
//! Both tables serialize in insertion order.

use crate::registry;
use govtalk_types::ValidationResult;

/// Ordered `name → value` keys rendered as `<Key Type="name">value</Key>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageKeyStore {
    entries: Vec<(String, String)>,
}

impl MessageKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names are unique: re-adding a name replaces its value in place
    pub fn add(&mut self, name: &str, value: &str) -> ValidationResult<()> {
        registry::require_non_empty("key_name", name)?;

        match self.entries.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, existing_value)) => *existing_value = value.to_string(),
            None => self.entries.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    /// Remove every entry named `name`, returning how many were removed
    pub fn delete(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| existing != name);
        before - self.entries.len()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ordered set of organisation codes rendered under `TargetDetails`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetOrganisationList {
    organisations: Vec<String>,
}

impl TargetOrganisationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adding a code already present is accepted and leaves the order alone
    pub fn add(&mut self, organisation: &str) -> ValidationResult<()> {
        registry::validate_organisation(organisation)?;
        if !self.organisations.iter().any(|o| o == organisation) {
            self.organisations.push(organisation.to_string());
        }
        Ok(())
    }

    pub fn delete(&mut self, organisation: &str) -> usize {
        let before = self.organisations.len();
        self.organisations.retain(|o| o != organisation);
        before - self.organisations.len()
    }

    pub fn reset(&mut self) {
        self.organisations.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.organisations.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.organisations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.organisations.is_empty()
    }
}
