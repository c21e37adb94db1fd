//! End-to-end client scenarios against a scripted transport

mod common;

use common::{fixture, mock_client, GATEWAY_URL};
use govtalk_client::{
    ClientError, ErrorKind, MessageBody, MessageQualifier, RouteCandidate, RouteId,
    TransportError, TransportResponse,
};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

#[tokio::test]
async fn test_construct_and_send_message_with_auth_failure() {
    let (mut client, mock) = mock_client();
    mock.push_ok(fixture("VatReturnAuthFailure.xml"));

    client.set_test_flag(true);
    client.set_message_authentication("clear").unwrap();
    client.set_sender_email_address("joe@bloggs.com").unwrap();
    client.add_message_key("VATRegNo", "999900001").unwrap();
    client.set_message_class("HMRC-VAT-DEC").unwrap();
    client.set_message_qualifier("request").unwrap();
    client.set_message_function("submit").unwrap();
    client
        .add_channel_route(RouteCandidate::new(
            "http://fakeurl.com/fakeGateway",
            "A fake channel route",
            "0.0.1",
        ))
        .unwrap();
    client.set_message_body("<IRenvelope><VATDeclarationRequest/></IRenvelope>");

    client
        .send_message(None)
        .await
        .expect("message should be exchanged");

    assert!(client.response_has_errors());
    assert_eq!(client.response_qualifier(), Some(MessageQualifier::Error));
    assert_eq!(client.response_errors()[0].number, "1046");
    assert_eq!(client.error_count(), 1);
    assert_eq!(client.last_error().unwrap().kind, ErrorKind::Gateway);

    let request = mock.last_request().unwrap();
    assert_eq!(request.url, GATEWAY_URL);
    let sent = request.body_text();
    assert_eq!(client.full_xml_request(), Some(sent.as_str()));
    assert!(sent.contains("<GatewayTest>1</GatewayTest>"));
    assert!(sent.contains("<EmailAddress>joe@bloggs.com</EmailAddress>"));
    assert!(sent.contains(r#"<Key Type="VATRegNo">999900001</Key>"#));
    assert!(sent.contains("<URI>http://fakeurl.com/fakeGateway</URI>"));
    assert!(sent.contains("<Body><IRenvelope><VATDeclarationRequest/></IRenvelope></Body>"));
    assert_eq!(
        client.full_xml_response(),
        Some(fixture("VatReturnAuthFailure.xml").as_str())
    );
}

#[tokio::test]
async fn test_send_prebuilt_message_verbatim() {
    let (mut client, mock) = mock_client();
    mock.push_ok(fixture("GiftAidResponseAck.xml"));
    let prebuilt = fixture("GiftAidRequest.xml");

    client
        .send_message(Some(MessageBody::from(prebuilt.clone())))
        .await
        .unwrap();

    assert_eq!(client.full_xml_request(), Some(prebuilt.as_str()));
    assert_eq!(mock.last_request().unwrap().body_text(), prebuilt);
    assert_eq!(
        client.response_qualifier(),
        Some(MessageQualifier::Acknowledgement)
    );
    assert!(client.full_xml_response().is_some());
    assert!(!client.response_has_errors());

    assert_eq!(client.transaction_id(), Some("20211207105213"));
    assert_eq!(
        client.response_correlation_id(),
        Some("2A8B66E3F2C94B0DB2E5A4F6C7D8E9F0")
    );
    let endpoint = client.response_endpoint().unwrap();
    assert_eq!(endpoint.poll_interval, Some(10));
    assert_eq!(client.gateway_timestamp(), Some("2021-12-07T10:52:13.296"));
    let parsed = client.gateway_timestamp_parsed().unwrap();
    assert_eq!(parsed.format("%Y-%m-%d %H:%M:%S").to_string(), "2021-12-07 10:52:13");
}

#[tokio::test]
async fn test_no_submission_has_no_qualifier() {
    let (client, mock) = mock_client();
    assert_eq!(client.response_qualifier(), None);
    assert!(!client.response_has_errors());
    assert!(client.full_xml_request().is_none());
    assert!(client.response_errors().is_empty());
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_channel_route_override_wins_once() {
    let (mut client, mock) = mock_client();
    mock.push_ok(fixture("GiftAidResponseAck.xml"));
    mock.push_ok(fixture("GiftAidResponseAck.xml"));

    client.set_test_flag(true);
    client.set_message_class("HMRC-CHAR-CLM").unwrap();
    client.set_message_authentication("clear").unwrap();
    client.set_message_qualifier("request").unwrap();
    client.set_message_function("submit").unwrap();
    client.set_message_correlation_id("").unwrap();
    client.set_message_transformation("XML").unwrap();
    client.add_target_organisation("IR").unwrap();
    client.add_message_key("CHARID", "CD67890").unwrap();
    client.set_message_body("");

    // A three-part id is rejected before it can reach the table
    let malformed = RouteId::from_parts(&["1", "2", "3"]);
    assert!(malformed.is_err());

    client
        .add_channel_route(
            RouteCandidate::new("a", "b", "c").with_timestamp("2014-04-04T12:28.123"),
        )
        .unwrap();
    client
        .set_channel_route(
            RouteCandidate::new("9999", "DownstreamApp", "0.0")
                .with_id(RouteId::new("some type", "some value"))
                .with_timestamp("2021-12-07T00:00.000"),
        )
        .unwrap();

    client.send_message(None).await.unwrap();
    let first = client.full_xml_request().unwrap().to_string();
    assert!(first.contains("<URI>9999</URI>"));
    assert!(first.contains("<Product>DownstreamApp</Product>"));
    assert!(first.contains("<Version>0.0</Version>"));
    assert!(first.contains(r#"<ID type="some type">some value</ID>"#));
    assert!(!first.contains("<URI>a</URI>"));
    assert!(!first.contains("2014-04-04T12:28.123"));

    // Override consumed: the table applies again
    client.send_message(None).await.unwrap();
    let second = client.full_xml_request().unwrap();
    assert!(second.contains("<URI>a</URI>"));
    assert!(!second.contains("<URI>9999</URI>"));
    assert_eq!(mock.request_count(), 2);
}

#[tokio::test]
async fn test_writer_body_is_wrapped() {
    let (mut client, mock) = mock_client();
    mock.push_ok(fixture("GiftAidResponseAck.xml"));

    client.set_message_class("HMRC-CHAR-CLM").unwrap();
    client.set_message_qualifier("request").unwrap();

    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Start(BytesStart::new("IRenvelope")))
        .unwrap();
    writer
        .write_event(Event::Text(BytesText::new("Gift & Aid")))
        .unwrap();
    writer
        .write_event(Event::End(BytesEnd::new("IRenvelope")))
        .unwrap();

    client
        .send_message(Some(MessageBody::from(writer)))
        .await
        .unwrap();
    let sent = mock.last_request().unwrap().body_text();
    assert!(sent.contains("<Body><IRenvelope>Gift &amp; Aid</IRenvelope></Body>"));
}

#[tokio::test]
async fn test_build_failure_never_contacts_transport() {
    let (mut client, mock) = mock_client();
    mock.push_ok(fixture("GiftAidResponseAck.xml"));

    client.set_message_qualifier("request").unwrap();
    let err = client.send_message(None).await.unwrap_err();

    assert!(matches!(err, ClientError::Build(_)));
    assert!(!err.reached_gateway());
    assert_eq!(mock.request_count(), 0);
    assert_eq!(mock.pending(), 1);
    assert!(client.full_xml_request().is_none());
    assert_eq!(client.last_error().unwrap().kind, ErrorKind::Build);
    assert_eq!(client.response_qualifier(), None);
}

#[tokio::test]
async fn test_malformed_packaged_request_is_kept() {
    let (mut client, mock) = mock_client();
    mock.push_ok(fixture("GiftAidResponseAck.xml"));

    client.set_schema_validation(true);
    client.set_message_class("HMRC-VAT-DEC").unwrap();
    client.set_message_qualifier("request").unwrap();
    client.set_message_function("submit").unwrap();

    let err = client
        .send_message(Some(MessageBody::from("<Unclosed>")))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Build(_)));
    assert_eq!(mock.request_count(), 0);
    let kept = client.full_xml_request().expect("rejected request should be kept");
    assert!(kept.contains("<Body><Unclosed></Body>"));
    assert_eq!(client.last_error().unwrap().kind, ErrorKind::Build);
    assert_eq!(client.last_error().unwrap().code, "malformed-envelope");
}

#[tokio::test]
async fn test_malformed_prebuilt_request_is_kept() {
    let (mut client, mock) = mock_client();
    mock.push_ok(fixture("GiftAidResponseAck.xml"));
    client.set_schema_validation(true);

    let broken = "<GovTalkMessage><Body><x></Body></GovTalkMessage>";
    let err = client
        .send_message(Some(MessageBody::from(broken)))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Build(_)));
    assert_eq!(mock.request_count(), 0);
    assert_eq!(client.full_xml_request(), Some(broken));
    assert_eq!(client.response_qualifier(), None);
}

#[tokio::test]
async fn test_alternative_authentication_requires_authenticator() {
    let (mut client, mock) = mock_client();
    client.set_message_class("HMRC-VAT-DEC").unwrap();
    client.set_message_qualifier("request").unwrap();
    client.set_message_authentication("alternative").unwrap();

    let err = client.send_message(None).await.unwrap_err();
    assert!(matches!(err, ClientError::Build(_)));
    assert_eq!(client.last_error().unwrap().code, "no-authenticator");
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_transport_failure_is_recorded() {
    let (mut client, mock) = mock_client();
    mock.push_failure(TransportError::timeout("send", 30_000));

    client.set_message_class("HMRC-VAT-DEC").unwrap();
    client.set_message_qualifier("request").unwrap();

    let err = client.send_message(None).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(TransportError::Timeout { .. })));

    let last = client.last_error().unwrap();
    assert_eq!(last.kind, ErrorKind::Transport);
    assert_eq!(last.location.as_deref(), Some(GATEWAY_URL));
    assert!(client.full_xml_request().is_some());
    assert_eq!(client.response_qualifier(), None);
}

#[tokio::test]
async fn test_error_status_with_envelope_is_a_response() {
    let (mut client, mock) = mock_client();
    mock.push_response(TransportResponse::new(
        500,
        fixture("VatReturnAuthFailure.xml"),
    ));
    mock.push_response(TransportResponse::new(503, "<html>Service Unavailable</html>"));

    client.set_message_class("HMRC-VAT-DEC").unwrap();
    client.set_message_qualifier("request").unwrap();

    client.send_message(None).await.unwrap();
    assert!(client.response_has_errors());
    assert_eq!(client.exchange().status, Some(500));

    let err = client.send_message(None).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Transport(TransportError::Status { status: 503, .. })
    ));
    assert!(err.reached_gateway());
    // Previous response is replaced, not merged
    assert_eq!(client.response_qualifier(), None);
    assert_eq!(
        client.full_xml_response(),
        Some("<html>Service Unavailable</html>")
    );
}

#[tokio::test]
async fn test_unparsable_success_response() {
    let (mut client, mock) = mock_client();
    mock.push_ok("not xml at all <");

    client.set_message_class("HMRC-VAT-DEC").unwrap();
    client.set_message_qualifier("request").unwrap();

    let err = client.send_message(None).await.unwrap_err();
    assert!(matches!(err, ClientError::Parse(_)));
    assert_eq!(client.last_error().unwrap().kind, ErrorKind::Parse);
}

#[tokio::test]
async fn test_business_errors_are_surfaced() {
    let (mut client, mock) = mock_client();
    mock.push_ok(fixture("BusinessErrorResponse.xml"));

    client.set_message_class("HMRC-CHAR-CLM").unwrap();
    client.set_message_qualifier("request").unwrap();
    client.send_message(None).await.unwrap();

    assert_eq!(client.response_errors().len(), 2);
    let kinds: Vec<ErrorKind> = client.errors().iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![ErrorKind::Gateway, ErrorKind::Business]);
    assert_eq!(
        client.last_error().unwrap().location.as_deref(),
        Some("/IRenvelope/R68/Claim/HMRCref")
    );
    assert!(client.response_body().unwrap().starts_with("<ErrorResponse"));
}

#[tokio::test]
async fn test_errors_accumulate_until_cleared() {
    let (mut client, mock) = mock_client();
    mock.push_ok(fixture("VatReturnAuthFailure.xml"));
    mock.push_ok(fixture("VatReturnAuthFailure.xml"));

    assert!(client.set_message_class("HVD").is_err());
    client.set_message_class("HMRC-VAT-DEC").unwrap();
    client.set_message_qualifier("request").unwrap();

    client.send_message(None).await.unwrap();
    client.send_message(None).await.unwrap();
    assert_eq!(client.error_count(), 3);

    client.clear_errors();
    assert_eq!(client.error_count(), 0);
    assert!(client.last_error().is_none());
    // Response errors belong to the exchange, not the collector
    assert!(client.response_has_errors());
}
