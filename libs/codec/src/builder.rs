//! # GovTalk Envelope Builder
//!
//! ## Purpose
//!
//! Pure transform from the accumulated client state plus a body into one
//! complete `GovTalkMessage` document.
//!
//! ## Architecture
//!
//! ```text
//! ConfigurationState ─┐
//! MessageKeyStore    ─┤
//! TargetOrganisations─┼→ [EnvelopeBuilder] → GovTalkMessage XML → Transport
//! RouteSelection     ─┤
//! MessageBody        ─┘
//! ```
//!
//! ## Layout
//!
//! `Header` carries `MessageDetails` and `SenderDetails`; `GovTalkDetails`
//! carries `Keys`, `TargetDetails` and the single `ChannelRouting` block;
//! `Body` carries the payload verbatim.

use crate::auth::{AlternativeAuthenticator, AuthenticationValue, SenderCredentials};
use crate::body::MessageBody;
use crate::error::{BuildError, BuildResult};
use crate::parser;
use crate::state::ConfigurationState;
use crate::tables::{MessageKeyStore, TargetOrganisationList};
use govtalk_config::gateway::{ENVELOPE_NAMESPACE, ENVELOPE_VERSION, ROOT_ELEMENT};
use govtalk_types::{Authentication, RouteCandidate};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Last transaction id handed out, for monotonic ids within the process
static LAST_TRANSACTION_ID: AtomicU64 = AtomicU64::new(0);

/// Fresh numeric transaction id derived from the clock in microseconds
///
/// Ids are strictly increasing even when two envelopes are packaged within
/// the same microsecond.
pub fn next_transaction_id() -> String {
    let now_us = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0);

    let mut last = LAST_TRANSACTION_ID.load(Ordering::Relaxed);
    loop {
        let next = now_us.max(last + 1);
        match LAST_TRANSACTION_ID.compare_exchange_weak(
            last,
            next,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return next.to_string(),
            Err(observed) => last = observed,
        }
    }
}

/// Structural check of an outgoing document when schema validation is on
///
/// Applies equally to packaged and pre-built envelopes.
pub fn verify_document(config: &ConfigurationState, document: &str) -> BuildResult<()> {
    if config.schema_validation() {
        parser::verify_envelope(document)?;
    }
    Ok(())
}

/// Builder for one outgoing envelope
pub struct EnvelopeBuilder<'a> {
    config: &'a ConfigurationState,
    credentials: &'a SenderCredentials,
    transaction_id: Option<String>,
    keys: Option<&'a MessageKeyStore>,
    organisations: Option<&'a TargetOrganisationList>,
    route: Option<&'a RouteCandidate>,
    body: Option<&'a MessageBody>,
    authenticator: Option<&'a dyn AlternativeAuthenticator>,
}

impl<'a> EnvelopeBuilder<'a> {
    pub fn new(config: &'a ConfigurationState, credentials: &'a SenderCredentials) -> Self {
        Self {
            config,
            credentials,
            transaction_id: None,
            keys: None,
            organisations: None,
            route: None,
            body: None,
            authenticator: None,
        }
    }

    /// Use a fixed transaction id instead of a generated one
    pub fn with_transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }

    pub fn with_keys(mut self, keys: &'a MessageKeyStore) -> Self {
        self.keys = Some(keys);
        self
    }

    pub fn with_organisations(mut self, organisations: &'a TargetOrganisationList) -> Self {
        self.organisations = Some(organisations);
        self
    }

    pub fn with_route(mut self, route: Option<&'a RouteCandidate>) -> Self {
        self.route = route;
        self
    }

    pub fn with_body(mut self, body: &'a MessageBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_authenticator(
        mut self,
        authenticator: Option<&'a dyn AlternativeAuthenticator>,
    ) -> Self {
        self.authenticator = authenticator;
        self
    }

    /// Produce the complete envelope document
    pub fn build(self) -> BuildResult<String> {
        let config = self.config;
        let class = config
            .message_class()
            .ok_or(BuildError::MissingField {
                field: "message_class",
            })?;
        let qualifier = config
            .qualifier()
            .ok_or(BuildError::MissingField { field: "qualifier" })?;
        let body = match self.body {
            Some(body) => body.as_text()?,
            None => Cow::Borrowed(""),
        };
        let transaction_id = self
            .transaction_id
            .clone()
            .unwrap_or_else(next_transaction_id);
        let authentication = self.authentication_value(&transaction_id)?;

        debug!(
            class,
            qualifier = %qualifier,
            transaction_id = %transaction_id,
            route = ?self.route.map(|r| r.uri.as_str()),
            "Packaging GovTalk envelope"
        );

        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new(ROOT_ELEMENT);
        root.push_attribute(("xmlns", ENVELOPE_NAMESPACE));
        writer.write_event(Event::Start(root))?;
        text_element(&mut writer, "EnvelopeVersion", ENVELOPE_VERSION)?;

        start(&mut writer, "Header")?;
        start(&mut writer, "MessageDetails")?;
        text_element(&mut writer, "Class", class)?;
        text_element(&mut writer, "Qualifier", qualifier.as_str())?;
        if let Some(function) = config.function() {
            text_element(&mut writer, "Function", function)?;
        }
        text_element(&mut writer, "TransactionID", &transaction_id)?;
        if let Some(correlation_id) = config.correlation_id() {
            text_element(&mut writer, "CorrelationID", correlation_id)?;
        }
        if let Some(transformation) = config.transformation() {
            text_element(&mut writer, "Transformation", transformation.as_str())?;
        }
        if config.test_mode() {
            text_element(&mut writer, "GatewayTest", "1")?;
        }
        end(&mut writer, "MessageDetails")?;

        start(&mut writer, "SenderDetails")?;
        start(&mut writer, "IDAuthentication")?;
        text_element(&mut writer, "SenderID", &self.credentials.sender_id)?;
        start(&mut writer, "Authentication")?;
        text_element(&mut writer, "Method", &authentication.method)?;
        text_element(&mut writer, "Value", &authentication.value)?;
        end(&mut writer, "Authentication")?;
        end(&mut writer, "IDAuthentication")?;
        if let Some(email) = config.sender_email() {
            text_element(&mut writer, "EmailAddress", email)?;
        }
        end(&mut writer, "SenderDetails")?;
        end(&mut writer, "Header")?;

        start(&mut writer, "GovTalkDetails")?;
        self.write_keys(&mut writer)?;
        self.write_target_details(&mut writer)?;
        if let Some(route) = self.route {
            write_channel_routing(&mut writer, route)?;
        }
        end(&mut writer, "GovTalkDetails")?;

        start(&mut writer, "Body")?;
        writer.write_event(Event::Text(BytesText::from_escaped(body.as_ref())))?;
        end(&mut writer, "Body")?;

        writer.write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))?;

        String::from_utf8(writer.into_inner()).map_err(|e| BuildError::BodyNotText {
            reason: e.to_string(),
        })
    }

    fn authentication_value(&self, transaction_id: &str) -> BuildResult<AuthenticationValue> {
        match self.config.authentication() {
            Authentication::Clear => Ok(AuthenticationValue {
                method: Authentication::Clear.as_str().to_string(),
                value: self.credentials.password.clone(),
            }),
            Authentication::Alternative => {
                let authenticator = self
                    .authenticator
                    .ok_or(BuildError::AlternativeAuthenticationUnavailable)?;
                authenticator
                    .authenticate(self.credentials, transaction_id)
                    .map_err(|reason| BuildError::AuthenticationFailed { reason })
            }
        }
    }

    fn write_keys<W: Write>(&self, writer: &mut Writer<W>) -> quick_xml::Result<()> {
        let keys = match self.keys {
            Some(keys) if !keys.is_empty() => keys,
            _ => return writer.write_event(Event::Empty(BytesStart::new("Keys"))),
        };

        start(writer, "Keys")?;
        for (name, value) in keys.iter() {
            let mut key = BytesStart::new("Key");
            key.push_attribute(("Type", name));
            writer.write_event(Event::Start(key))?;
            writer.write_event(Event::Text(BytesText::new(value)))?;
            end(writer, "Key")?;
        }
        end(writer, "Keys")
    }

    fn write_target_details<W: Write>(&self, writer: &mut Writer<W>) -> quick_xml::Result<()> {
        let organisations = match self.organisations {
            Some(organisations) if !organisations.is_empty() => organisations,
            _ => return Ok(()),
        };

        start(writer, "TargetDetails")?;
        for organisation in organisations.iter() {
            text_element(writer, "Organisation", organisation)?;
        }
        end(writer, "TargetDetails")
    }
}

fn write_channel_routing<W: Write>(
    writer: &mut Writer<W>,
    route: &RouteCandidate,
) -> quick_xml::Result<()> {
    start(writer, "ChannelRouting")?;
    start(writer, "Channel")?;
    text_element(writer, "URI", &route.uri)?;
    text_element(writer, "Product", &route.product)?;
    text_element(writer, "Version", &route.version)?;
    end(writer, "Channel")?;
    for id in &route.ids {
        let mut element = BytesStart::new("ID");
        element.push_attribute(("type", id.id_type.as_str()));
        writer.write_event(Event::Start(element))?;
        writer.write_event(Event::Text(BytesText::new(&id.value)))?;
        end(writer, "ID")?;
    }
    if let Some(timestamp) = &route.timestamp {
        text_element(writer, "Timestamp", timestamp)?;
    }
    end(writer, "ChannelRouting")
}

fn start<W: Write>(writer: &mut Writer<W>, name: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))
}

fn end<W: Write>(writer: &mut Writer<W>, name: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))
}

fn text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> quick_xml::Result<()> {
    start(writer, name)?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    end(writer, name)
}
