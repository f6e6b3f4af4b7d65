//! Client configuration types.

use std::time::Duration;

use url::Url;

use crate::error::Result;

/// Well-known discovery URL used when none is configured.
pub const DEFAULT_DISCOVERY_URL: &str = "https://jmap.fastmail.com/.well-known/jmap";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of messages fetched by the inbox bootstrap.
pub const DEFAULT_MESSAGE_LIMIT: u32 = 20;

/// JMAP client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Session discovery URL.
    pub discovery_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Messages fetched by the inbox bootstrap.
    pub message_limit: u32,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Config {
    /// Creates a configuration for the given discovery URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(discovery_url: impl AsRef<str>) -> Result<Self> {
        Self::builder().discovery_url(discovery_url)?.build()
    }

    /// Creates a configuration builder.
    #[must_use]
    pub const fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discovery_url: default_discovery_url(),
            timeout: DEFAULT_TIMEOUT,
            message_limit: DEFAULT_MESSAGE_LIMIT,
            user_agent: default_user_agent(),
        }
    }
}

/// Builder for client configuration.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    discovery_url: Option<Url>,
    timeout: Duration,
    message_limit: u32,
    user_agent: Option<String>,
}

impl ConfigBuilder {
    /// Creates a new builder with defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            discovery_url: None,
            timeout: DEFAULT_TIMEOUT,
            message_limit: DEFAULT_MESSAGE_LIMIT,
            user_agent: None,
        }
    }

    /// Sets the discovery URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn discovery_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.discovery_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the inbox bootstrap limit.
    #[must_use]
    pub const fn message_limit(mut self, limit: u32) -> Self {
        self.message_limit = limit;
        self
    }

    /// Sets the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the discovery URL is not HTTP(S).
    pub fn build(self) -> Result<Config> {
        let discovery_url = self.discovery_url.unwrap_or_else(default_discovery_url);
        if !matches!(discovery_url.scheme(), "http" | "https") {
            return Err(crate::Error::InvalidConfig(format!(
                "discovery URL must be http(s): {discovery_url}"
            )));
        }

        Ok(Config {
            discovery_url,
            timeout: self.timeout,
            message_limit: self.message_limit,
            user_agent: self.user_agent.unwrap_or_else(default_user_agent),
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::expect_used)]
fn default_discovery_url() -> Url {
    Url::parse(DEFAULT_DISCOVERY_URL).expect("default discovery URL is valid")
}

fn default_user_agent() -> String {
    format!("jmapfilter/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.discovery_url.as_str(), DEFAULT_DISCOVERY_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.message_limit, 20);
        assert!(config.user_agent.starts_with("jmapfilter/"));
    }

    #[test]
    fn test_config_new() {
        let config = Config::new("https://jmap.example.com/.well-known/jmap").unwrap();
        assert_eq!(config.discovery_url.host_str(), Some("jmap.example.com"));
    }

    #[test]
    fn test_builder() {
        let config = Config::builder()
            .discovery_url("http://localhost:8080/.well-known/jmap")
            .unwrap()
            .timeout(Duration::from_secs(5))
            .message_limit(50)
            .user_agent("test-agent")
            .build()
            .unwrap();

        assert_eq!(config.discovery_url.port(), Some(8080));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.message_limit, 50);
        assert_eq!(config.user_agent, "test-agent");
    }

    #[test]
    fn test_invalid_url() {
        let err = Config::new("not a url").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let err = Config::new("ftp://example.com/jmap").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
