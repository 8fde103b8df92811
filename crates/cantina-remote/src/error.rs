//! # Remote Error Types
//!
//! Errors from talking to the remote source of truth.
//!
//! ## The Transport / Server Distinction
//! The single most load-bearing classification in the system:
//!
//! - [`RemoteError::Transport`]: the request never reached the server
//!   (refused connection, timeout, DNS). The remote state is whatever it
//!   was - proceeding offline is safe, so callers degrade gracefully.
//! - [`RemoteError::Server`]: the server answered with a non-2xx. The
//!   remote state is UNKNOWN (it saw the request), so callers guarding an
//!   invariant must block rather than proceed.

use thiserror::Error;

/// Result type alias for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Error from a remote API call.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request never reached the server. Safe to fall back to offline
    /// behavior.
    #[error("Remote unreachable: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status (other than the mapped
    /// 404/409 cases below). Remote state must be assumed unknown.
    #[error("Remote error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// 409 on workday open: another session holds the open workday.
    #[error("Workday already open{}", .responsible.as_deref().map(|r| format!(" (opened by {r})")).unwrap_or_default())]
    Conflict { responsible: Option<String> },

    /// 404: the targeted resource does not exist remotely. On workday
    /// close this means "already closed" and callers treat it as success.
    #[error("Remote resource not found")]
    NotFound,

    /// The server answered 2xx but the body did not parse.
    #[error("Failed to decode remote response: {0}")]
    Decode(String),

    /// The configured base URL is unusable.
    #[error("Invalid remote URL: {0}")]
    InvalidUrl(String),
}

impl RemoteError {
    /// True when the request never reached the server.
    pub fn is_transport(&self) -> bool {
        matches!(self, RemoteError::Transport(_))
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        // Decode failures happen after a 2xx; everything else at this level
        // means the exchange itself failed.
        if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else if err.is_builder() {
            RemoteError::InvalidUrl(err.to_string())
        } else {
            RemoteError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(RemoteError::Transport("connection refused".into()).is_transport());
        assert!(!RemoteError::Server { status: 500, message: "boom".into() }.is_transport());
        assert!(!RemoteError::NotFound.is_transport());
    }

    #[test]
    fn test_conflict_display_names_responsible() {
        let err = RemoteError::Conflict { responsible: Some("Carlos".into()) };
        assert!(err.to_string().contains("Carlos"));

        let anon = RemoteError::Conflict { responsible: None };
        assert!(!anon.to_string().contains("opened by"));
    }
}
