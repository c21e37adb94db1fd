//! # Validation Registry
//!
//! Permitted enumerations and syntax validators for every value the client
//! writes into an envelope. Message classes form an extensible registry;
//! all other checks are fixed syntax rules.

use govtalk_types::{ValidationError, ValidationResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Message classes recognised out of the box
pub const KNOWN_MESSAGE_CLASSES: &[&str] = &[
    // HMRC
    "HMRC-VAT-DEC",
    "HMRC-CHAR-CLM",
    "HMRC-CT-CT600",
    "HMRC-SA-SA100",
    "HMRC-SA-SA800",
    "HMRC-SA-SA900",
    "HMRC-PAYE-RTI-FPS",
    "HMRC-PAYE-RTI-EPS",
    "HMRC-PAYE-RTI-EAS",
    "HMRC-PAYE-RTI-NVREP",
    "HMRC-CIS-VERIFY",
    "HMRC-CIS-RETURN",
    // Companies House
    "CompanyData",
    "Accounts",
    "GetSubmissionStatus",
    "ConfirmationStatement",
    "ChangeRegisteredOfficeAddress",
    "OfficerAppointment",
    "OfficerResignation",
    "NameSearch",
    "NumberSearch",
];

/// Longest target organisation code the envelope schema allows
pub const MAX_ORGANISATION_LENGTH: usize = 32;

// local-part@domain, with at least one dot inside the domain
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").expect("email pattern is a valid regex")
});

// Seconds are optional: gateways accept `hh:mm.fff` as well as `hh:mm:ss.fff`
static DATE_TIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(:\d{2})?(\.\d+)?(Z|[+\-]\d{2}:\d{2})?$")
        .expect("date-time pattern is a valid regex")
});

static CORRELATION_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-F]{0,32}$").expect("correlation pattern is a valid regex"));

/// Registry of message classes plus the fixed syntax validators
#[derive(Debug, Clone)]
pub struct ValidationRegistry {
    message_classes: BTreeSet<String>,
}

impl Default for ValidationRegistry {
    fn default() -> Self {
        Self {
            message_classes: KNOWN_MESSAGE_CLASSES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl ValidationRegistry {
    /// Registry with no message classes at all
    pub fn empty() -> Self {
        Self {
            message_classes: BTreeSet::new(),
        }
    }

    /// Add a class to the registry (e.g. a department not covered by the defaults)
    pub fn register_message_class(&mut self, class: impl Into<String>) -> ValidationResult<()> {
        let class = class.into();
        require_non_empty("message_class", &class)?;
        self.message_classes.insert(class);
        Ok(())
    }

    pub fn message_classes(&self) -> impl Iterator<Item = &str> {
        self.message_classes.iter().map(String::as_str)
    }

    pub fn validate_message_class(&self, class: &str) -> ValidationResult<()> {
        if self.message_classes.contains(class) {
            Ok(())
        } else {
            Err(ValidationError::UnknownMessageClass(class.to_string()))
        }
    }
}

/// local-part@domain with at least one dot in the domain
pub fn validate_email(address: &str) -> ValidationResult<()> {
    if EMAIL_PATTERN.is_match(address) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(address.to_string()))
    }
}

pub fn validate_timestamp(timestamp: &str) -> ValidationResult<()> {
    if DATE_TIME_PATTERN.is_match(timestamp) {
        Ok(())
    } else {
        Err(ValidationError::InvalidTimestamp(timestamp.to_string()))
    }
}

/// Up to 32 upper-case hex characters; empty is allowed
pub fn validate_correlation_id(correlation_id: &str) -> ValidationResult<()> {
    if CORRELATION_ID_PATTERN.is_match(correlation_id) {
        Ok(())
    } else {
        Err(ValidationError::InvalidCorrelationId(correlation_id.to_string()))
    }
}

/// Absolute http(s) URL
pub fn validate_gateway_url(gateway_url: &str) -> ValidationResult<()> {
    let parsed = url::Url::parse(gateway_url).map_err(|e| ValidationError::InvalidGatewayUrl {
        url: gateway_url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ValidationError::InvalidGatewayUrl {
            url: gateway_url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

pub fn validate_organisation(organisation: &str) -> ValidationResult<()> {
    require_non_empty("organisation", organisation)?;
    let length = organisation.chars().count();
    if length > MAX_ORGANISATION_LENGTH {
        return Err(ValidationError::FieldTooLong {
            field: "organisation",
            max: MAX_ORGANISATION_LENGTH,
            got: length,
        });
    }
    Ok(())
}

/// Reject empty and whitespace-only values
pub fn require_non_empty(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyField { field })
    } else {
        Ok(())
    }
}
