//! Shared fixtures for the integration suites

use std::sync::{Arc, Once};

use async_trait::async_trait;
use threadloom_client::{AccessToken, AccessTokenProvider, ClientConfig, ThreadClient};
use threadloom_domain::Result;

pub const TEST_TOKEN: &str = "test-token";

static TRACING: Once = Once::new();

/// Route client traces to the test writer; respects `RUST_LOG`.
fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

/// Fixed-token provider, mirroring production `StaticToken` without
/// touching the environment.
#[derive(Clone)]
pub struct MockTokenProvider {
    token: &'static str,
}

#[async_trait]
impl AccessTokenProvider for MockTokenProvider {
    async fn access_token(&self) -> Result<AccessToken> {
        AccessToken::new(self.token)
    }
}

/// Client pointed at a mock server, with a short backoff so retry tests run
/// fast.
pub fn test_client(base_url: &str) -> ThreadClient {
    init_tracing();
    let config = ClientConfig {
        api_base_url: base_url.to_string(),
        link_base_url: "https://docs.example.test".to_string(),
        retry_backoff: std::time::Duration::from_millis(10),
        ..Default::default()
    };
    ThreadClient::new(config, Arc::new(MockTokenProvider { token: TEST_TOKEN }))
        .expect("failed to create client")
}
