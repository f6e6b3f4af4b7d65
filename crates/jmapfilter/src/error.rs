//! Error types for JMAP operations.

use thiserror::Error;

use crate::catalog::MailboxRole;

/// Result type alias for JMAP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to a JMAP server.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request error (connection refused, timeout, TLS failure...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// Response body was not valid JSON or had the wrong shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response was valid JSON but lacked something the protocol requires.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Session discovery failed.
    #[error("Session discovery failed: {0}")]
    Discovery(#[source] Box<Error>),

    /// Discovery succeeded but no account is named after the user.
    #[error("No JMAP account named {username}")]
    AccountNotFound {
        /// Username that was looked up.
        username: String,
    },

    /// Operation requires a resolved session.
    #[error("Session not established: call discover() first")]
    NotConnected,

    /// No cached mailbox carries the requested role.
    #[error("No mailbox with role {0}")]
    MailboxNotFound(MailboxRole),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network or HTTP layer failure.
    Transport,
    /// Malformed or unexpected response.
    Protocol,
    /// Endpoint discovery or account resolution failed.
    Discovery,
    /// Required session state is missing.
    Precondition,
    /// Role lookup found no match.
    NotFound,
    /// Invalid client configuration.
    Config,
}

impl Error {
    /// Creates a protocol error from a message.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Returns the classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(_) | Self::Status { .. } => ErrorKind::Transport,
            Self::Json(_) | Self::Protocol(_) => ErrorKind::Protocol,
            Self::Discovery(_) | Self::AccountNotFound { .. } => ErrorKind::Discovery,
            Self::NotConnected => ErrorKind::Precondition,
            Self::MailboxNotFound(_) => ErrorKind::NotFound,
            Self::InvalidConfig(_) | Self::Url(_) => ErrorKind::Config,
        }
    }
}
