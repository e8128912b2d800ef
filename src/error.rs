//! Error type for the search and research core.
//!
//! Malformed model output is not an error here: it is decoded into
//! [`crate::research::Parsed::Malformed`] and recovered by the loop. Threshold
//! exhaustion is not an error either. What remains is configuration problems
//! and remote-call failures, which abort the current session.

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration value violates an invariant (e.g. a non-descending
    /// threshold sequence or a zero iteration cap).
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A remote endpoint answered, but not successfully.
    #[error("{operation} failed: {message}")]
    Remote {
        operation: &'static str,
        message: String,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub fn remote(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Remote {
            operation,
            message: message.into(),
        }
    }
}
