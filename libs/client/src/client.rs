//! # GovTalk Client
//!
//! ## Purpose
//!
//! Orchestrator owning one instance of every protocol component. Callers
//! configure the next message through validated setters, then `send_message`
//! runs packaging, transport, parsing and error collection in sequence.
//!
//! ## Send Lifecycle
//!
//! ```text
//! Configuring ──send──► take route ─► package ─► transport ─► parse ─► Configuring
//!      ▲                                  │           │          │
//!      └──────────── ErrorCollector ◄─────┴───────────┴──────────┘
//! ```
//!
//! - Setter rejections leave state untouched and are recorded (when enabled)
//! - Build failures never contact the transport
//! - Gateway-reported errors are a successful exchange; inspect them with
//!   `response_has_errors()` / `response_errors()`
//! - The latest exchange is replaced, never merged, on every send

use crate::collector::{ErrorCollector, ErrorRecord};
use crate::error::{ClientError, ClientResult};
use crate::exchange::Exchange;
use bytes::Bytes;
use chrono::NaiveDateTime;
use govtalk_codec::{
    parser, verify_document, AlternativeAuthenticator, BuildError, ChannelRoutingTable,
    ConfigurationState, EnvelopeBuilder, MessageBody, MessageKeyStore, RouteSelection, SenderCredentials,
    TargetOrganisationList,
};
use govtalk_config::ClientSettings;
use govtalk_network::{HttpTransport, Transport, TransportError};
use govtalk_types::{
    Authentication, GatewayError, GovTalkResponse, MessageQualifier, ResponseEndpoint,
    RouteCandidate, StatusRecord, Transformation, ValidationResult,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const FUNCTION_SUBMIT: &str = "submit";
const FUNCTION_DELETE: &str = "delete";
const FUNCTION_LIST: &str = "list";

/// Client for one gateway account
pub struct GovTalkClient {
    credentials: SenderCredentials,
    config: ConfigurationState,
    keys: MessageKeyStore,
    organisations: TargetOrganisationList,
    routes: ChannelRoutingTable,
    body: MessageBody,
    authenticator: Option<Arc<dyn AlternativeAuthenticator>>,
    transport: Arc<dyn Transport>,
    errors: ErrorCollector,
    record_validation_errors: bool,
    exchange: Exchange,
}

impl GovTalkClient {
    /// Client for `gateway_url`; an HTTPS transport is created when none is given
    pub fn new(
        gateway_url: &str,
        sender_id: &str,
        password: &str,
        transport: Option<Arc<dyn Transport>>,
    ) -> ClientResult<Self> {
        let config = ConfigurationState::new(gateway_url)?;
        let transport = match transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new()?),
        };

        Ok(Self {
            credentials: SenderCredentials::new(sender_id, password),
            config,
            keys: MessageKeyStore::new(),
            organisations: TargetOrganisationList::new(),
            routes: ChannelRoutingTable::new(),
            body: MessageBody::default(),
            authenticator: None,
            transport,
            errors: ErrorCollector::new(),
            record_validation_errors: true,
            exchange: Exchange::default(),
        })
    }

    /// Client configured from loaded settings
    pub fn from_settings(
        settings: &ClientSettings,
        transport: Option<Arc<dyn Transport>>,
    ) -> ClientResult<Self> {
        let transport = match transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::with_options(
                Duration::from_secs(settings.timeout_secs),
                &settings.user_agent,
            )?),
        };

        let mut client = Self::new(
            &settings.gateway_url,
            &settings.sender_id,
            &settings.password,
            Some(transport),
        )?;
        client
            .config
            .set_test_gateway_url(settings.test_gateway_url.as_deref())?;
        client.config.set_test_mode(settings.test_mode);
        client.config.set_schema_validation(settings.schema_validation);
        client.record_validation_errors = settings.record_validation_errors;

        info!(
            gateway = %settings.gateway_url,
            sender_id = %settings.sender_id,
            test_mode = settings.test_mode,
            "GovTalk client configured"
        );
        Ok(client)
    }

    /// Record a rejected setter call before handing the result back
    fn checked<T>(
        &mut self,
        operation: &'static str,
        result: ValidationResult<T>,
    ) -> ValidationResult<T> {
        if let Err(err) = &result {
            debug!(operation, error = %err, "Rejected value");
            if self.record_validation_errors {
                self.errors.record(ErrorRecord::validation(err, operation));
            }
        }
        result
    }

    // Configuration

    pub fn set_test_flag(&mut self, test_mode: bool) {
        self.config.set_test_mode(test_mode);
    }

    pub fn test_flag(&self) -> bool {
        self.config.test_mode()
    }

    pub fn set_message_authentication(&mut self, mode: &str) -> ValidationResult<()> {
        let result = self.config.set_authentication(mode);
        self.checked("set_message_authentication", result)
    }

    pub fn message_authentication(&self) -> Authentication {
        self.config.authentication()
    }

    /// Authenticator used when authentication is `alternative`
    pub fn set_alternative_authenticator(
        &mut self,
        authenticator: Arc<dyn AlternativeAuthenticator>,
    ) {
        self.authenticator = Some(authenticator);
    }

    pub fn set_sender_email_address(&mut self, address: &str) -> ValidationResult<()> {
        let result = self.config.set_sender_email(address);
        self.checked("set_sender_email_address", result)
    }

    pub fn sender_email_address(&self) -> Option<&str> {
        self.config.sender_email()
    }

    pub fn set_message_class(&mut self, class: &str) -> ValidationResult<()> {
        let result = self.config.set_message_class(class);
        self.checked("set_message_class", result)
    }

    pub fn message_class(&self) -> Option<&str> {
        self.config.message_class()
    }

    /// Extend the registry of accepted message classes
    pub fn register_message_class(&mut self, class: &str) -> ValidationResult<()> {
        let result = self.config.registry_mut().register_message_class(class);
        self.checked("register_message_class", result)
    }

    pub fn set_message_qualifier(&mut self, qualifier: &str) -> ValidationResult<()> {
        let result = self.config.set_qualifier(qualifier);
        self.checked("set_message_qualifier", result)
    }

    pub fn message_qualifier(&self) -> Option<MessageQualifier> {
        self.config.qualifier()
    }

    pub fn set_message_function(&mut self, function: &str) -> ValidationResult<()> {
        let result = self.config.set_function(function);
        self.checked("set_message_function", result)
    }

    pub fn message_function(&self) -> Option<&str> {
        self.config.function()
    }

    pub fn set_message_correlation_id(&mut self, correlation_id: &str) -> ValidationResult<()> {
        let result = self.config.set_correlation_id(correlation_id);
        self.checked("set_message_correlation_id", result)
    }

    pub fn message_correlation_id(&self) -> Option<&str> {
        self.config.correlation_id()
    }

    pub fn set_message_transformation(&mut self, transformation: &str) -> ValidationResult<()> {
        let result = self.config.set_transformation(transformation);
        self.checked("set_message_transformation", result)
    }

    pub fn message_transformation(&self) -> Option<Transformation> {
        self.config.transformation()
    }

    pub fn set_schema_validation(&mut self, enabled: bool) {
        self.config.set_schema_validation(enabled);
    }

    pub fn schema_validation(&self) -> bool {
        self.config.schema_validation()
    }

    pub fn set_gov_talk_server(&mut self, gateway_url: &str) -> ValidationResult<()> {
        let result = self.config.set_gateway_url(gateway_url);
        self.checked("set_gov_talk_server", result)
    }

    pub fn gov_talk_server(&self) -> &str {
        self.config.gateway_url()
    }

    /// Endpoint used instead of the gateway while the test flag is on
    pub fn set_test_gateway_url(&mut self, gateway_url: Option<&str>) -> ValidationResult<()> {
        let result = self.config.set_test_gateway_url(gateway_url);
        self.checked("set_test_gateway_url", result)
    }

    /// Toggle recording of rejected setter values in the error collector
    pub fn set_record_validation_errors(&mut self, enabled: bool) {
        self.record_validation_errors = enabled;
    }

    // Message keys

    pub fn add_message_key(&mut self, name: &str, value: &str) -> ValidationResult<()> {
        let result = self.keys.add(name, value);
        self.checked("add_message_key", result)
    }

    /// Number of keys removed
    pub fn delete_message_key(&mut self, name: &str) -> usize {
        self.keys.delete(name)
    }

    pub fn reset_message_keys(&mut self) {
        self.keys.reset();
    }

    pub fn message_keys(&self) -> &MessageKeyStore {
        &self.keys
    }

    // Target organisations

    pub fn add_target_organisation(&mut self, organisation: &str) -> ValidationResult<()> {
        let result = self.organisations.add(organisation);
        self.checked("add_target_organisation", result)
    }

    pub fn delete_target_organisation(&mut self, organisation: &str) -> usize {
        self.organisations.delete(organisation)
    }

    pub fn reset_target_organisations(&mut self) {
        self.organisations.reset();
    }

    pub fn target_organisations(&self) -> &TargetOrganisationList {
        &self.organisations
    }

    // Channel routing

    /// Append a route candidate to the table
    pub fn add_channel_route(&mut self, route: RouteCandidate) -> ValidationResult<()> {
        let result = self.routes.add(route);
        self.checked("add_channel_route", result)
    }

    /// Route for the next send only, superseding the table
    pub fn set_channel_route(&mut self, route: RouteCandidate) -> ValidationResult<()> {
        let result = self.routes.set_active(route);
        self.checked("set_channel_route", result)
    }

    /// Append a route whose ids arrive as loose `[type, value]` sequences
    ///
    /// A sequence that is not exactly one pair rejects the route before it
    /// reaches the table.
    pub fn add_channel_route_with_ids<P, S>(
        &mut self,
        route: RouteCandidate,
        id_parts: &[P],
    ) -> ValidationResult<()>
    where
        P: AsRef<[S]>,
        S: AsRef<str>,
    {
        let result = route
            .with_id_parts(id_parts)
            .and_then(|route| self.routes.add(route));
        self.checked("add_channel_route", result)
    }

    /// Override route for the next send with ids as loose `[type, value]` sequences
    pub fn set_channel_route_with_ids<P, S>(
        &mut self,
        route: RouteCandidate,
        id_parts: &[P],
    ) -> ValidationResult<()>
    where
        P: AsRef<[S]>,
        S: AsRef<str>,
    {
        let result = route
            .with_id_parts(id_parts)
            .and_then(|route| self.routes.set_active(route));
        self.checked("set_channel_route", result)
    }

    pub fn channel_routes(&self) -> &ChannelRoutingTable {
        &self.routes
    }

    // Body

    pub fn set_message_body(&mut self, body: impl Into<MessageBody>) {
        let body = body.into();
        debug!(body = ?body, "Message body set");
        self.body = body;
    }

    // Sending

    /// Package and send the configured message
    ///
    /// A text `body` that is already a complete `GovTalkMessage` is sent
    /// verbatim; any other body replaces the configured one and is wrapped.
    /// `Ok` means a response envelope was received, even one reporting errors.
    pub async fn send_message(&mut self, body: Option<MessageBody>) -> ClientResult<()> {
        self.exchange = Exchange::default();
        let selection = self.routes.take_selection();

        let document = match body {
            Some(MessageBody::Text(text)) if parser::is_envelope(&text) => {
                debug!(bytes = text.len(), "Sending pre-built envelope");
                text
            }
            Some(body) => {
                self.set_message_body(body);
                self.package_submission(&selection)?
            }
            None => self.package_submission(&selection)?,
        };

        let url = self.config.submission_url().to_string();
        debug!(
            url = %url,
            test_mode = self.config.test_mode(),
            "Resolved submission endpoint"
        );
        self.transmit(&url, document).await
    }

    /// Ask the gateway for the outcome of an acknowledged submission
    ///
    /// Uses the correlation id of the last response when none is given, and
    /// the response endpoint it advertised when there was one.
    pub async fn send_poll_request(&mut self, correlation_id: Option<&str>) -> ClientResult<()> {
        let correlation_id = match correlation_id {
            Some(id) => id.to_string(),
            None => self.response_correlation_id().unwrap_or_default().to_string(),
        };
        let url = self
            .response_endpoint()
            .map(|endpoint| endpoint.url.clone())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| self.config.submission_url().to_string());

        self.exchange = Exchange::default();
        let config = self.control_config(
            MessageQualifier::Poll,
            FUNCTION_SUBMIT,
            None,
            Some(&correlation_id),
        )?;
        let document = self.package_control(&config)?;
        info!(correlation_id = %correlation_id, url = %url, "Polling gateway");
        self.transmit(&url, document).await
    }

    /// Remove a submission's responses from the gateway
    ///
    /// `Ok(true)` when the gateway confirmed deletion of `correlation_id`.
    pub async fn send_delete_request(
        &mut self,
        correlation_id: &str,
        class: Option<&str>,
    ) -> ClientResult<bool> {
        self.exchange = Exchange::default();
        let config = self.control_config(
            MessageQualifier::Request,
            FUNCTION_DELETE,
            class,
            Some(correlation_id),
        )?;
        let document = self.package_control(&config)?;
        let url = self.config.submission_url().to_string();
        self.transmit(&url, document).await?;

        let confirmed = self.exchange.response.as_ref().map_or(false, |response| {
            response.qualifier == Some(MessageQualifier::Response)
                && !response.has_errors()
                && response.correlation_id.as_deref() == Some(correlation_id)
        });
        info!(correlation_id, confirmed, "Delete request complete");
        Ok(confirmed)
    }

    /// List the submissions the gateway holds for this sender
    pub async fn send_list_request(
        &mut self,
        class: Option<&str>,
    ) -> ClientResult<Vec<StatusRecord>> {
        self.exchange = Exchange::default();
        let config = self.control_config(MessageQualifier::Request, FUNCTION_LIST, class, None)?;
        let document = self.package_control(&config)?;
        let url = self.config.submission_url().to_string();
        self.transmit(&url, document).await?;

        let body = self.response_body().unwrap_or_default();
        match parser::parse_status_report(body) {
            Ok(records) => {
                info!(records = records.len(), "List request complete");
                Ok(records)
            }
            Err(err) => {
                self.errors.record(ErrorRecord::parse(&err));
                Err(err.into())
            }
        }
    }

    /// Copy of the configuration for a poll, delete or list message
    fn control_config(
        &mut self,
        qualifier: MessageQualifier,
        function: &str,
        class: Option<&str>,
        correlation_id: Option<&str>,
    ) -> ClientResult<ConfigurationState> {
        let mut config = self.config.clone();
        let result = apply_control(&mut config, qualifier, function, class, correlation_id);
        self.checked("control_message", result)?;
        Ok(config)
    }

    /// Envelope for the configured message along the resolved route
    fn package_submission(&mut self, selection: &RouteSelection) -> ClientResult<String> {
        debug!(
            route = ?selection.route().map(|r| r.uri.as_str()),
            override_route = selection.is_override(),
            "Packaging message"
        );
        let packaged = EnvelopeBuilder::new(&self.config, &self.credentials)
            .with_keys(&self.keys)
            .with_organisations(&self.organisations)
            .with_route(selection.route())
            .with_body(&self.body)
            .with_authenticator(self.authenticator.as_deref())
            .build();
        packaged.map_err(|err| self.build_failed(err))
    }

    /// Envelope with no keys, organisations, route or body
    fn package_control(&mut self, config: &ConfigurationState) -> ClientResult<String> {
        let packaged = EnvelopeBuilder::new(config, &self.credentials)
            .with_authenticator(self.authenticator.as_deref())
            .build();
        packaged.map_err(|err| self.build_failed(err))
    }

    fn build_failed(&mut self, err: BuildError) -> ClientError {
        warn!(error = %err, "Envelope packaging failed");
        self.errors.record(ErrorRecord::build(&err));
        ClientError::Build(err)
    }

    /// Record `document`, check it when schema validation is on, then send it
    /// and decode the answer into the current exchange
    async fn transmit(&mut self, url: &str, document: String) -> ClientResult<()> {
        self.exchange.request = Some(document.clone());
        if let Err(err) = verify_document(&self.config, &document) {
            return Err(self.build_failed(err));
        }

        info!(url, bytes = document.len(), "Sending GovTalk message");
        let reply = match self.transport.send(url, Bytes::from(document)).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(url, error = %err, "Gateway transport failed");
                self.errors.record(ErrorRecord::transport(&err, url));
                return Err(err.into());
            }
        };

        let text = reply.body_text();
        self.exchange.status = Some(reply.status);
        self.exchange.response_document = Some(text.clone());

        let response = match parser::parse_response(&text) {
            Ok(response) => response,
            Err(parse_err) if !reply.is_success() => {
                let err = TransportError::status(reply.status, url);
                warn!(url, status = reply.status, error = %parse_err, "Gateway returned an error status");
                self.errors.record(ErrorRecord::transport(&err, url));
                return Err(err.into());
            }
            Err(parse_err) => {
                warn!(url, error = %parse_err, "Gateway response could not be parsed");
                self.errors.record(ErrorRecord::parse(&parse_err));
                return Err(parse_err.into());
            }
        };

        for gateway_error in &response.errors {
            warn!(
                number = %gateway_error.number,
                source = ?gateway_error.source,
                text = %gateway_error.text,
                "Gateway reported error"
            );
            self.errors.record(ErrorRecord::gateway(gateway_error));
        }

        info!(
            qualifier = ?response.qualifier,
            correlation_id = ?response.correlation_id,
            errors = response.errors.len(),
            status = reply.status,
            "GovTalk response received"
        );
        self.exchange.response = Some(response);
        Ok(())
    }

    // Error introspection

    pub fn error_count(&self) -> usize {
        self.errors.count()
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        self.errors.list()
    }

    pub fn last_error(&self) -> Option<&ErrorRecord> {
        self.errors.last()
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn error_collector(&self) -> &ErrorCollector {
        &self.errors
    }

    // Response introspection

    pub fn exchange(&self) -> &Exchange {
        &self.exchange
    }

    pub fn response(&self) -> Option<&GovTalkResponse> {
        self.exchange.response.as_ref()
    }

    /// `None` until a response envelope has been received
    pub fn response_qualifier(&self) -> Option<MessageQualifier> {
        self.response().and_then(|response| response.qualifier)
    }

    pub fn response_has_errors(&self) -> bool {
        self.response().map_or(false, GovTalkResponse::has_errors)
    }

    pub fn response_errors(&self) -> &[GatewayError] {
        self.response()
            .map(|response| response.errors.as_slice())
            .unwrap_or_default()
    }

    pub fn response_correlation_id(&self) -> Option<&str> {
        self.response()?.correlation_id.as_deref()
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.response()?.transaction_id.as_deref()
    }

    pub fn gateway_timestamp(&self) -> Option<&str> {
        self.response()?.gateway_timestamp.as_deref()
    }

    pub fn gateway_timestamp_parsed(&self) -> Option<NaiveDateTime> {
        self.response()?.gateway_timestamp_parsed()
    }

    pub fn response_endpoint(&self) -> Option<&ResponseEndpoint> {
        self.response()?.response_endpoint.as_ref()
    }

    pub fn response_body(&self) -> Option<&str> {
        self.response().map(|response| response.body.as_str())
    }

    pub fn full_xml_request(&self) -> Option<&str> {
        self.exchange.request.as_deref()
    }

    pub fn full_xml_response(&self) -> Option<&str> {
        self.exchange.response_document.as_deref()
    }
}

fn apply_control(
    config: &mut ConfigurationState,
    qualifier: MessageQualifier,
    function: &str,
    class: Option<&str>,
    correlation_id: Option<&str>,
) -> ValidationResult<()> {
    if let Some(class) = class {
        config.set_message_class(class)?;
    }
    config.set_qualifier(qualifier.as_str())?;
    config.set_function(function)?;
    if let Some(correlation_id) = correlation_id {
        config.set_correlation_id(correlation_id)?;
    }
    Ok(())
}
