//! # Configuration State
//!
//! Scalar protocol settings for the next envelope. Every setter validates
//! before it writes; a rejected value leaves the field exactly as it was.

use crate::registry::{self, ValidationRegistry};
use govtalk_types::{Authentication, MessageQualifier, Transformation, ValidationResult};

/// Message configuration accumulated between sends
#[derive(Debug, Clone)]
pub struct ConfigurationState {
    registry: ValidationRegistry,
    test_mode: bool,
    authentication: Authentication,
    sender_email: Option<String>,
    message_class: Option<String>,
    qualifier: Option<MessageQualifier>,
    function: Option<String>,
    correlation_id: Option<String>,
    transformation: Option<Transformation>,
    schema_validation: bool,
    gateway_url: String,
    test_gateway_url: Option<String>,
}

impl ConfigurationState {
    /// Fresh state targeting `gateway_url`
    pub fn new(gateway_url: &str) -> ValidationResult<Self> {
        Self::with_registry(gateway_url, ValidationRegistry::default())
    }

    pub fn with_registry(gateway_url: &str, registry: ValidationRegistry) -> ValidationResult<Self> {
        registry::validate_gateway_url(gateway_url)?;
        Ok(Self {
            registry,
            test_mode: false,
            authentication: Authentication::default(),
            sender_email: None,
            message_class: None,
            qualifier: None,
            function: None,
            correlation_id: None,
            transformation: None,
            schema_validation: false,
            gateway_url: gateway_url.to_string(),
            test_gateway_url: None,
        })
    }

    pub fn registry(&self) -> &ValidationRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ValidationRegistry {
        &mut self.registry
    }

    pub fn set_test_mode(&mut self, test_mode: bool) {
        self.test_mode = test_mode;
    }

    pub fn test_mode(&self) -> bool {
        self.test_mode
    }

    pub fn set_authentication(&mut self, mode: &str) -> ValidationResult<()> {
        self.authentication = mode.parse()?;
        Ok(())
    }

    pub fn authentication(&self) -> Authentication {
        self.authentication
    }

    pub fn set_sender_email(&mut self, address: &str) -> ValidationResult<()> {
        registry::validate_email(address)?;
        self.sender_email = Some(address.to_string());
        Ok(())
    }

    pub fn sender_email(&self) -> Option<&str> {
        self.sender_email.as_deref()
    }

    pub fn set_message_class(&mut self, class: &str) -> ValidationResult<()> {
        self.registry.validate_message_class(class)?;
        self.message_class = Some(class.to_string());
        Ok(())
    }

    pub fn message_class(&self) -> Option<&str> {
        self.message_class.as_deref()
    }

    pub fn set_qualifier(&mut self, qualifier: &str) -> ValidationResult<()> {
        self.qualifier = Some(qualifier.parse()?);
        Ok(())
    }

    pub fn qualifier(&self) -> Option<MessageQualifier> {
        self.qualifier
    }

    pub fn set_function(&mut self, function: &str) -> ValidationResult<()> {
        registry::require_non_empty("function", function)?;
        self.function = Some(function.to_string());
        Ok(())
    }

    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    pub fn set_correlation_id(&mut self, correlation_id: &str) -> ValidationResult<()> {
        registry::validate_correlation_id(correlation_id)?;
        self.correlation_id = Some(correlation_id.to_string());
        Ok(())
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn set_transformation(&mut self, transformation: &str) -> ValidationResult<()> {
        self.transformation = Some(transformation.parse()?);
        Ok(())
    }

    pub fn transformation(&self) -> Option<Transformation> {
        self.transformation
    }

    pub fn set_schema_validation(&mut self, enabled: bool) {
        self.schema_validation = enabled;
    }

    pub fn schema_validation(&self) -> bool {
        self.schema_validation
    }

    pub fn set_gateway_url(&mut self, gateway_url: &str) -> ValidationResult<()> {
        registry::validate_gateway_url(gateway_url)?;
        self.gateway_url = gateway_url.to_string();
        Ok(())
    }

    pub fn gateway_url(&self) -> &str {
        &self.gateway_url
    }

    pub fn set_test_gateway_url(&mut self, gateway_url: Option<&str>) -> ValidationResult<()> {
        if let Some(url) = gateway_url {
            registry::validate_gateway_url(url)?;
        }
        self.test_gateway_url = gateway_url.map(str::to_string);
        Ok(())
    }

    /// Endpoint for submissions: the test gateway while test mode is on and one is configured
    pub fn submission_url(&self) -> &str {
        match (&self.test_gateway_url, self.test_mode) {
            (Some(test_url), true) => test_url,
            _ => &self.gateway_url,
        }
    }
}
