//! HTTP client with the protocol's fixed retry policy.
//!
//! Exactly one automatic retry, after a fixed backoff, and only for
//! rate-limiting (429) and server-error (5xx) responses. Timeouts and
//! connection failures are terminal: a timed-out request may have reached
//! the server, and nothing at this layer is idempotent.

use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use threadloom_domain::{Result, ThreadLoomError};
use tracing::debug;

/// Total attempts per call: the original request plus the single retry.
const MAX_ATTEMPTS: usize = 2;

/// HTTP client with built-in retry and timeout support.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    timeout: Duration,
    retry_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder with retry semantics.
    ///
    /// The final response is returned whatever its status; callers classify
    /// non-success statuses into the error taxonomy. By the time a 429 or
    /// 5xx response comes back from this method, the single retry has
    /// already been spent.
    ///
    /// # Errors
    /// - `ThreadLoomError::Timeout` if the deadline elapsed (never retried)
    /// - `ThreadLoomError::Network` on connection-level failure (never
    ///   retried)
    /// - `ThreadLoomError::Internal` if the request body cannot be cloned
    ///   for a retry
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        for attempt in 0..MAX_ATTEMPTS {
            let cloned_builder = builder.try_clone().ok_or_else(|| {
                ThreadLoomError::Internal(
                    "request body cannot be cloned; buffer the body to enable retries".into(),
                )
            })?;

            let request = cloned_builder
                .build()
                .map_err(|e| ThreadLoomError::Internal(format!("failed to build request: {e}")))?;

            let method = request.method().clone();
            let url = request.url().clone();
            debug!(attempt = attempt + 1, %method, %url, "sending HTTP request");

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt = attempt + 1, %method, %url, %status, "received HTTP response");

                    if retry_eligible(status) && attempt + 1 < MAX_ATTEMPTS {
                        tokio::time::sleep(self.retry_backoff).await;
                        continue;
                    }

                    return Ok(response);
                }
                Err(err) => {
                    debug!(attempt = attempt + 1, %method, %url, error = %err, "HTTP request failed");

                    if err.is_timeout() {
                        return Err(ThreadLoomError::Timeout(self.timeout));
                    }
                    return Err(ThreadLoomError::Network(format!(
                        "{method} {url} failed: {err}"
                    )));
                }
            }
        }

        Err(ThreadLoomError::Internal(
            "http client exhausted retries without producing a result".into(),
        ))
    }
}

/// Only rate limiting and server errors are retry-eligible; every other
/// status is terminal.
fn retry_eligible(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    retry_backoff: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry_backoff: Duration::from_millis(500),
            user_agent: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fixed delay before the single retry.
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    ///
    /// # Errors
    /// Returns `ThreadLoomError::Internal` if the underlying TLS/connection
    /// pool cannot be initialized.
    pub fn build(self) -> Result<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder
            .build()
            .map_err(|e| ThreadLoomError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(HttpClient { client, timeout: self.timeout, retry_backoff: self.retry_backoff })
    }
}
