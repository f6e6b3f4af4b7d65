//! HTTP transport for discovery and API calls.
//!
//! The client never talks to the network directly; it hands a URL,
//! credentials and an optional JSON body to a [`Transport`] and gets raw
//! JSON back. [`HttpTransport`] is the `reqwest` implementation.

use std::fmt;
use std::future::Future;

use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::config::Config;
use crate::error::{Error, Result};

/// Username and secret sent with every request.
///
/// The secret is kept out of `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    secret: String,
}

impl Credentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the secret.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Authenticated JSON-over-HTTP collaborator.
pub trait Transport: Send + Sync {
    /// Performs an authenticated GET and parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns a transport error on network failure or non-2xx status, and a
    /// JSON error if the body does not parse.
    fn get(
        &self,
        url: &str,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<Value>> + Send;

    /// Performs an authenticated POST of `body` and parses the reply as JSON.
    ///
    /// # Errors
    ///
    /// Same as [`Transport::get`].
    fn post(
        &self,
        url: &str,
        credentials: &Credentials,
        body: &Value,
    ) -> impl Future<Output = Result<Value>> + Send;
}

/// [`Transport`] backed by `reqwest` with basic auth.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: Client,
}

impl HttpTransport {
    /// Creates a transport with the configured timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { http_client })
    }

    async fn send(request: RequestBuilder, url: &str, credentials: &Credentials) -> Result<Value> {
        let response = request
            .basic_auth(credentials.username(), Some(credentials.secret()))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), url, "JMAP request failed");
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(Into::into)
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str, credentials: &Credentials) -> Result<Value> {
        Self::send(self.http_client.get(url), url, credentials).await
    }

    async fn post(&self, url: &str, credentials: &Credentials, body: &Value) -> Result<Value> {
        Self::send(self.http_client.post(url).json(body), url, credentials).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let credentials = Credentials::new("me@example.com", "hunter2");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("me@example.com"));
        assert!(!debug.contains("hunter2"));
        assert_eq!(credentials.secret(), "hunter2");
    }

    #[test]
    fn test_http_transport_creation() {
        let transport = HttpTransport::new(&Config::default());
        assert!(transport.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_is_transport_error() {
        let config = Config::builder()
            .timeout(std::time::Duration::from_secs(2))
            .build()
            .unwrap();
        let transport = HttpTransport::new(&config).unwrap();
        let credentials = Credentials::new("me@example.com", "secret");

        // Port 9 (discard) on loopback is not expected to serve HTTP.
        let err = transport
            .get("http://127.0.0.1:9/.well-known/jmap", &credentials)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Transport);
    }
}
