//! Shared helpers for client integration tests

#![allow(dead_code)]

use govtalk_client::{GovTalkClient, MockTransport, Transport};
use std::path::PathBuf;
use std::sync::Arc;

pub const GATEWAY_URL: &str = "https://secure.dev.gateway.gov.uk/submission";
pub const SENDER_ID: &str = "XMLGatewayTestUserID";
pub const PASSWORD: &str = "XMLGatewayTestPassword";

/// Install a test subscriber once; honours RUST_LOG
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

/// Client wired to a fresh mock transport
pub fn mock_client() -> (GovTalkClient, Arc<MockTransport>) {
    init_tracing();
    let mock = Arc::new(MockTransport::new());
    let transport: Arc<dyn Transport> = mock.clone();
    let client = GovTalkClient::new(GATEWAY_URL, SENDER_ID, PASSWORD, Some(transport))
        .expect("Failed to construct client");
    (client, mock)
}
