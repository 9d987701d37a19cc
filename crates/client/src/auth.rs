//! Bearer-token handling
//!
//! The credential is read once at startup and attached to every request. It
//! must never appear in logs, error messages, or `Debug` output; the
//! [`AccessToken`] newtype redacts itself and zeroizes its memory on drop.

use std::fmt;

use async_trait::async_trait;
use threadloom_domain::{Result, ThreadLoomError};
use zeroize::Zeroizing;

/// Environment variable holding the bearer token
pub const TOKEN_ENV_VAR: &str = "THREADLOOM_ACCESS_TOKEN";

/// An opaque bearer credential.
///
/// Cloning is cheap enough and keeps providers stateless; every copy zeroizes
/// on drop.
#[derive(Clone)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Wrap a raw token.
    ///
    /// # Errors
    /// Returns `ThreadLoomError::Config` if the token is empty.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ThreadLoomError::Config("access token is empty".into()));
        }
        Ok(Self(Zeroizing::new(raw)))
    }

    /// Read the token from [`TOKEN_ENV_VAR`].
    ///
    /// # Errors
    /// Returns `ThreadLoomError::Config` if the variable is missing or empty.
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var(TOKEN_ENV_VAR).map_err(|_| {
            ThreadLoomError::Config(format!(
                "missing required environment variable: {TOKEN_ENV_VAR}"
            ))
        })?;
        Self::new(raw)
    }

    /// The raw token, for building the `Authorization` header.
    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(redacted)")
    }
}

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token
    async fn access_token(&self) -> Result<AccessToken>;
}

/// A fixed token supplied out-of-band at startup.
#[derive(Clone)]
pub struct StaticToken {
    token: AccessToken,
}

impl StaticToken {
    pub fn new(token: AccessToken) -> Self {
        Self { token }
    }

    /// Build from [`TOKEN_ENV_VAR`].
    ///
    /// # Errors
    /// Returns `ThreadLoomError::Config` if the variable is missing or empty.
    pub fn from_env() -> Result<Self> {
        Ok(Self { token: AccessToken::from_env()? })
    }
}

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn access_token(&self) -> Result<AccessToken> {
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let token = AccessToken::new("super-secret").expect("token");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn empty_token_is_rejected() {
        assert!(AccessToken::new("").is_err());
        assert!(AccessToken::new("   ").is_err());
    }

    #[tokio::test]
    async fn static_token_round_trips() {
        let provider = StaticToken::new(AccessToken::new("tok-1").expect("token"));
        let token = provider.access_token().await.expect("token");
        assert_eq!(token.expose(), "tok-1");
    }
}
