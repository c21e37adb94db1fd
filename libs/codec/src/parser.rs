//! # GovTalk Response Parser
//!
//! ## Purpose
//!
//! Decodes every gateway reply shape (acknowledgement, error, response, poll
//! answers) into one `GovTalkResponse`. Errors are collected from both the
//! envelope (`GovTalkDetails/GovTalkErrors`) and the business body
//! (`Body/ErrorResponse`).
//!
//! Element matching is by local name so prefixed and default-namespace
//! documents parse the same way.

use crate::error::{ParseError, ParseResult};
use govtalk_config::gateway::ROOT_ELEMENT;
use govtalk_types::{
    ErrorSource, GatewayError, GovTalkResponse, MessageQualifier, ResponseEndpoint, StatusRecord,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

const MESSAGE_DETAILS: [&str; 3] = [ROOT_ELEMENT, "Header", "MessageDetails"];

/// Error record being accumulated while its element is open
#[derive(Debug)]
struct ErrorDraft {
    depth: usize,
    source: ErrorSource,
    raised_by: Option<String>,
    number: String,
    error_type: Option<String>,
    text: Vec<String>,
    location: Option<String>,
}

impl ErrorDraft {
    fn new(depth: usize, source: ErrorSource) -> Self {
        Self {
            depth,
            source,
            raised_by: None,
            number: String::new(),
            error_type: None,
            text: Vec::new(),
            location: None,
        }
    }

    fn assign(&mut self, field: &str, value: String) {
        match field {
            "RaisedBy" => self.raised_by = Some(value),
            "Number" => self.number = value,
            "Type" => self.error_type = Some(value),
            "Text" => self.text.push(value),
            "Location" => self.location = Some(value),
            _ => {}
        }
    }

    fn finish(self) -> GatewayError {
        GatewayError {
            source: self.source,
            raised_by: self.raised_by,
            number: self.number,
            error_type: self.error_type,
            text: self.text.join(" "),
            location: self.location,
        }
    }
}

/// Decode a gateway response envelope
pub fn parse_response(xml: &str) -> ParseResult<GovTalkResponse> {
    if xml.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut response = GovTalkResponse::default();
    let mut qualifier: Option<String> = None;
    let mut path: Vec<String> = Vec::new();
    let mut draft: Option<ErrorDraft> = None;
    let mut body_start: Option<usize> = None;
    let mut saw_root = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ParseError::xml(reader.buffer_position(), e))?;

        match event {
            Event::Start(element) => {
                let name = local_name(&element);
                if path.is_empty() {
                    check_root(&name)?;
                    saw_root = true;
                }
                if name == "ResponseEndPoint" {
                    response.response_endpoint = Some(ResponseEndpoint {
                        url: String::new(),
                        poll_interval: poll_interval(&element),
                    });
                }
                if name == "Error" && draft.is_none() {
                    if let Some(source) = error_source(&path) {
                        draft = Some(ErrorDraft::new(path.len() + 1, source));
                    }
                }
                path.push(name);
                if is_at(&path, &[ROOT_ELEMENT, "Body"]) {
                    body_start = Some(reader.buffer_position());
                }
            }
            Event::Empty(element) => {
                let name = local_name(&element);
                if path.is_empty() {
                    check_root(&name)?;
                    saw_root = true;
                }
                if name == "ResponseEndPoint" {
                    response.response_endpoint = Some(ResponseEndpoint {
                        url: String::new(),
                        poll_interval: poll_interval(&element),
                    });
                }
            }
            Event::Text(text) => {
                let value = text
                    .unescape()
                    .map_err(|e| ParseError::xml(reader.buffer_position(), e))?
                    .trim()
                    .to_string();
                assign_text(&path, value, &mut response, &mut qualifier, &mut draft);
            }
            Event::CData(data) => {
                let value = String::from_utf8_lossy(&data.into_inner()).trim().to_string();
                assign_text(&path, value, &mut response, &mut qualifier, &mut draft);
            }
            Event::End(_) => {
                if is_at(&path, &[ROOT_ELEMENT, "Body"]) {
                    if let Some(start) = body_start.take() {
                        let end = reader.buffer_position();
                        let close = xml[..end].rfind("</").unwrap_or(end).max(start);
                        response.body = xml[start..close].trim().to_string();
                    }
                }
                if draft.as_ref().map_or(false, |d| d.depth == path.len()) {
                    if let Some(finished) = draft.take() {
                        response.errors.push(finished.finish());
                    }
                }
                path.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(ParseError::Empty);
    }

    let qualifier = qualifier.ok_or(ParseError::MissingElement {
        element: "Qualifier",
    })?;
    response.qualifier = Some(
        qualifier
            .parse::<MessageQualifier>()
            .map_err(|_| ParseError::UnknownQualifier(qualifier.clone()))?,
    );

    debug!(
        qualifier = %qualifier,
        errors = response.errors.len(),
        correlation_id = ?response.correlation_id,
        "Parsed GovTalk response"
    );
    Ok(response)
}

fn assign_text(
    path: &[String],
    value: String,
    response: &mut GovTalkResponse,
    qualifier: &mut Option<String>,
    draft: &mut Option<ErrorDraft>,
) {
    if let Some(draft) = draft.as_mut() {
        if path.len() == draft.depth + 1 {
            if let Some(field) = path.last() {
                draft.assign(field, value);
            }
        }
        return;
    }

    let (parent, field) = match path.split_last() {
        Some((field, parent)) => (parent, field.as_str()),
        None => return,
    };
    if !is_at(parent, &MESSAGE_DETAILS) {
        return;
    }

    match field {
        "Qualifier" => *qualifier = Some(value),
        "Class" => response.class = Some(value),
        "Function" => response.function = Some(value),
        "CorrelationID" => response.correlation_id = Some(value),
        "TransactionID" => response.transaction_id = Some(value),
        "GatewayTimestamp" => response.gateway_timestamp = Some(value),
        "ResponseEndPoint" => {
            let endpoint = response
                .response_endpoint
                .get_or_insert_with(|| ResponseEndpoint {
                    url: String::new(),
                    poll_interval: None,
                });
            endpoint.url = value;
        }
        _ => {}
    }
}

/// Which error list an `Error` element opened under `path` belongs to
fn error_source(path: &[String]) -> Option<ErrorSource> {
    match path.last().map(String::as_str) {
        Some("GovTalkErrors") => Some(ErrorSource::Envelope),
        Some("ErrorResponse") if path.iter().any(|p| p == "Body") => Some(ErrorSource::Business),
        _ => None,
    }
}

fn poll_interval(element: &BytesStart<'_>) -> Option<u64> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == b"PollInterval")
        .and_then(|attr| String::from_utf8_lossy(&attr.value).trim().parse().ok())
}

fn local_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

fn check_root(name: &str) -> ParseResult<()> {
    if name == ROOT_ELEMENT {
        Ok(())
    } else {
        Err(ParseError::NotAnEnvelope {
            root: name.to_string(),
        })
    }
}

fn is_at(path: &[String], expected: &[&str]) -> bool {
    path.len() == expected.len() && path.iter().zip(expected).all(|(a, b)| a == b)
}

/// Local name of the document's root element, if it has one
pub fn root_element(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) | Ok(Event::Empty(element)) => {
                return Some(local_name(&element))
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

/// Whether `xml` is a complete GovTalk envelope rather than a body fragment
pub fn is_envelope(xml: &str) -> bool {
    root_element(xml).as_deref() == Some(ROOT_ELEMENT)
}

/// Well-formedness check for a packaged envelope
pub fn verify_envelope(xml: &str) -> ParseResult<()> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut depth = 0usize;
    let mut roots = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ParseError::xml(reader.buffer_position(), e))?;
        match event {
            Event::Start(element) => {
                if depth == 0 {
                    check_root(&local_name(&element))?;
                    roots += 1;
                }
                depth += 1;
            }
            Event::Empty(element) => {
                if depth == 0 {
                    check_root(&local_name(&element))?;
                    roots += 1;
                }
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }

    match (roots, depth) {
        (1, 0) => Ok(()),
        (0, _) => Err(ParseError::Empty),
        _ => Err(ParseError::xml(
            reader.buffer_position(),
            "unbalanced or repeated root element",
        )),
    }
}

/// Decode the `StatusReport` body returned for a list request
pub fn parse_status_report(body: &str) -> ParseResult<Vec<StatusRecord>> {
    let mut reader = Reader::from_str(body);
    reader.trim_text(true);

    let mut records = Vec::new();
    let mut current: Option<StatusRecord> = None;
    let mut field: Option<String> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ParseError::xml(reader.buffer_position(), e))?;
        match event {
            Event::Start(element) => {
                let name = local_name(&element);
                if name == "StatusRecord" {
                    current = Some(StatusRecord {
                        timestamp: String::new(),
                        correlation_id: String::new(),
                        transaction_id: String::new(),
                        status: String::new(),
                    });
                } else if current.is_some() {
                    field = Some(name);
                }
            }
            Event::Text(text) => {
                let value = text
                    .unescape()
                    .map_err(|e| ParseError::xml(reader.buffer_position(), e))?
                    .trim()
                    .to_string();
                if let (Some(record), Some(name)) = (current.as_mut(), field.as_deref()) {
                    match name {
                        "TimeStamp" => record.timestamp = value,
                        "CorrelationID" => record.correlation_id = value,
                        "TransactionID" => record.transaction_id = value,
                        "Status" => record.status = value,
                        _ => {}
                    }
                }
            }
            Event::End(element) => {
                if element.local_name().as_ref() == b"StatusRecord" {
                    if let Some(record) = current.take() {
                        records.push(record);
                    }
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GovTalkMessage xmlns="http://www.govtalk.gov.uk/CM/envelope">
  <EnvelopeVersion>2.0</EnvelopeVersion>
  <Header>
    <MessageDetails>
      <Class>HMRC-CHAR-CLM</Class>
      <Qualifier>acknowledgement</Qualifier>
      <Function>submit</Function>
      <TransactionID>20211207000000</TransactionID>
      <CorrelationID>B2D5F3C1A4E6071829304A5B6C7D8E9F</CorrelationID>
      <ResponseEndPoint PollInterval="10">https://transaction-engine.tax.service.gov.uk/poll</ResponseEndPoint>
      <GatewayTimestamp>2021-12-07T10:52:13.296</GatewayTimestamp>
    </MessageDetails>
    <SenderDetails/>
  </Header>
  <GovTalkDetails>
    <Keys/>
  </GovTalkDetails>
  <Body/>
</GovTalkMessage>"#;

    const AUTH_FAILURE: &str = r#"<?xml version="1.0"?>
<GovTalkMessage xmlns="http://www.govtalk.gov.uk/CM/envelope">
  <EnvelopeVersion>2.0</EnvelopeVersion>
  <Header>
    <MessageDetails>
      <Class>HMRC-VAT-DEC</Class>
      <Qualifier>error</Qualifier>
      <Function>submit</Function>
      <TransactionID/>
      <CorrelationID>A1B2</CorrelationID>
      <GatewayTimestamp>2009-11-27T10:52:13.296</GatewayTimestamp>
    </MessageDetails>
    <SenderDetails/>
  </Header>
  <GovTalkDetails>
    <Keys/>
    <GovTalkErrors>
      <Error>
        <RaisedBy>Gateway</RaisedBy>
        <Number>1046</Number>
        <Type>fatal</Type>
        <Text>Authentication Failure. The supplied user credentials failed validation for the requested service.</Text>
        <Location/>
      </Error>
    </GovTalkErrors>
  </GovTalkDetails>
  <Body/>
</GovTalkMessage>"#;

    #[test]
    fn test_parses_acknowledgement() {
        let response = parse_response(ACK).unwrap();
        assert_eq!(response.qualifier, Some(MessageQualifier::Acknowledgement));
        assert_eq!(response.class.as_deref(), Some("HMRC-CHAR-CLM"));
        assert_eq!(response.transaction_id.as_deref(), Some("20211207000000"));
        assert_eq!(
            response.correlation_id.as_deref(),
            Some("B2D5F3C1A4E6071829304A5B6C7D8E9F")
        );
        assert_eq!(
            response.response_endpoint,
            Some(ResponseEndpoint {
                url: "https://transaction-engine.tax.service.gov.uk/poll".into(),
                poll_interval: Some(10),
            })
        );
        assert_eq!(
            response.gateway_timestamp.as_deref(),
            Some("2021-12-07T10:52:13.296")
        );
        assert!(response.body.is_empty());
        assert!(!response.has_errors());
    }

    #[test]
    fn test_parses_envelope_errors() {
        let response = parse_response(AUTH_FAILURE).unwrap();
        assert_eq!(response.qualifier, Some(MessageQualifier::Error));
        assert_eq!(response.errors.len(), 1);

        let error = &response.errors[0];
        assert_eq!(error.source, ErrorSource::Envelope);
        assert_eq!(error.raised_by.as_deref(), Some("Gateway"));
        assert_eq!(error.number, "1046");
        assert_eq!(error.error_type.as_deref(), Some("fatal"));
        assert!(error.text.starts_with("Authentication Failure."));
        assert_eq!(error.location, None);
        assert_eq!(response.transaction_id, None);
    }

    #[test]
    fn test_parses_business_errors_and_body() {
        let xml = r#"<GovTalkMessage xmlns="http://www.govtalk.gov.uk/CM/envelope">
  <Header><MessageDetails><Qualifier>error</Qualifier></MessageDetails></Header>
  <GovTalkDetails><Keys/></GovTalkDetails>
  <Body>
    <ErrorResponse xmlns="http://www.govtalk.gov.uk/CM/errorresponse" SchemaVersion="2.0">
      <Application><MessageCount>1</MessageCount></Application>
      <Error>
        <RaisedBy>ChRIS</RaisedBy>
        <Number>7003</Number>
        <Type>business</Type>
        <Text>The Charity ID is not recognised</Text>
        <Text>Check the HMRC reference.</Text>
        <Location>/IRenvelope/R68/Claim</Location>
      </Error>
    </ErrorResponse>
  </Body>
</GovTalkMessage>"#;

        let response = parse_response(xml).unwrap();
        assert_eq!(response.errors.len(), 1);
        let error = &response.errors[0];
        assert_eq!(error.source, ErrorSource::Business);
        assert_eq!(error.number, "7003");
        assert_eq!(
            error.text,
            "The Charity ID is not recognised Check the HMRC reference."
        );
        assert_eq!(error.location.as_deref(), Some("/IRenvelope/R68/Claim"));
        assert!(response.body.starts_with("<ErrorResponse"));
        assert!(response.body.ends_with("</ErrorResponse>"));
    }

    #[test]
    fn test_body_is_captured_verbatim() {
        let xml = r#"<GovTalkMessage><Header><MessageDetails><Qualifier>response</Qualifier></MessageDetails></Header><Body><SuccessResponse><Message code="077001">Thank you</Message></SuccessResponse></Body></GovTalkMessage>"#;
        let response = parse_response(xml).unwrap();
        assert_eq!(response.qualifier, Some(MessageQualifier::Response));
        assert_eq!(
            response.body,
            r#"<SuccessResponse><Message code="077001">Thank you</Message></SuccessResponse>"#
        );
        assert!(!response.has_errors());
    }

    #[test]
    fn test_prefixed_namespace() {
        let xml = r#"<gt:GovTalkMessage xmlns:gt="http://www.govtalk.gov.uk/CM/envelope"><gt:Header><gt:MessageDetails><gt:Qualifier>poll</gt:Qualifier><gt:CorrelationID>ABC</gt:CorrelationID></gt:MessageDetails></gt:Header></gt:GovTalkMessage>"#;
        let response = parse_response(xml).unwrap();
        assert_eq!(response.qualifier, Some(MessageQualifier::Poll));
        assert_eq!(response.correlation_id.as_deref(), Some("ABC"));
    }

    #[test]
    fn test_rejects_malformed_and_foreign_documents() {
        assert_eq!(parse_response(""), Err(ParseError::Empty));
        assert!(matches!(
            parse_response("<GovTalkMessage><Header></GovTalkMessage>"),
            Err(ParseError::Xml { .. })
        ));
        assert_eq!(
            parse_response("<html><body>Bad Gateway</body></html>"),
            Err(ParseError::NotAnEnvelope {
                root: "html".into()
            })
        );
        assert_eq!(
            parse_response("<GovTalkMessage><Header/></GovTalkMessage>"),
            Err(ParseError::MissingElement {
                element: "Qualifier"
            })
        );
        assert_eq!(
            parse_response(
                "<GovTalkMessage><Header><MessageDetails><Qualifier>maybe</Qualifier></MessageDetails></Header></GovTalkMessage>"
            ),
            Err(ParseError::UnknownQualifier("maybe".into()))
        );
    }

    #[test]
    fn test_envelope_detection() {
        assert!(is_envelope(ACK));
        assert!(!is_envelope("<IRenvelope/>"));
        assert!(!is_envelope(""));
        assert_eq!(root_element("<?xml version=\"1.0\"?><R68/>").as_deref(), Some("R68"));
    }

    #[test]
    fn test_verify_envelope() {
        assert!(verify_envelope(ACK).is_ok());
        assert!(verify_envelope("<GovTalkMessage><Body><x></Body></GovTalkMessage>").is_err());
        assert!(verify_envelope("<Other/>").is_err());
        assert_eq!(verify_envelope("   "), Err(ParseError::Empty));
    }

    #[test]
    fn test_status_report() {
        let body = r#"<StatusReport xmlns="http://www.govtalk.gov.uk/CM/StatusReport">
  <SenderID>XMLGatewayTestUserID</SenderID>
  <StartTimeStamp>01/12/2021 00:00:00</StartTimeStamp>
  <EndTimeStamp>07/12/2021 23:59:59</EndTimeStamp>
  <StatusRecord>
    <TimeStamp>07/12/2021 10:52:13</TimeStamp>
    <CorrelationID>B2D5F3C1A4E6071829304A5B6C7D8E9F</CorrelationID>
    <TransactionID>20211207000000</TransactionID>
    <Status>SUBMISSION_RESPONSE</Status>
  </StatusRecord>
  <StatusRecord>
    <TimeStamp>06/12/2021 09:00:00</TimeStamp>
    <CorrelationID>0A1B</CorrelationID>
    <TransactionID>20211206000000</TransactionID>
    <Status>SUBMISSION_ERROR</Status>
  </StatusRecord>
</StatusReport>"#;

        let records = parse_status_report(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, "SUBMISSION_RESPONSE");
        assert_eq!(records[0].correlation_id, "B2D5F3C1A4E6071829304A5B6C7D8E9F");
        assert_eq!(records[1].transaction_id, "20211206000000");
        assert!(parse_status_report("").unwrap().is_empty());
    }
}
