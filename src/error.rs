//! Crate-wide error type

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A required environment variable is absent or empty. Fatal at startup.
    #[error("missing required environment variable: {0}")]
    ConfigMissing(&'static str),

    #[error("invalid configuration value for {name}: {reason}")]
    ConfigInvalid { name: &'static str, reason: String },

    #[error("preference store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store rejected an insert because an identical row already exists.
    #[error("preference already exists")]
    Conflict,

    /// Matcher or calendar service failure.
    #[error("{service} unavailable: {reason}")]
    UpstreamUnavailable {
        service: &'static str,
        reason: String,
    },

    #[error("malformed callback token: {0:?}")]
    Malformed(String),

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    /// Chat transport failure (send, edit, answer or poll).
    #[error("chat transport error: {0}")]
    Transport(String),

    #[error("cache error: {0}")]
    Cache(String),
}

impl Error {
    pub fn upstream(service: &'static str, reason: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            service,
            reason: reason.into(),
        }
    }

    /// Whether a caller may reasonably try the same operation again later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable(_)
                | Self::UpstreamUnavailable { .. }
                | Self::Transport(_)
                | Self::Cache(_)
        )
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Self::Cache(err.to_string())
    }
}
