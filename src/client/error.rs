/**
 * Client Error Types
 *
 * - `ApiError` - outcome of a failed REST exchange
 * - `StoreError` - failures opening or flushing local storage
 * - `BootstrapError` - which step of the login pipeline failed
 * - `SessionError` - everything the session can refuse or report
 *
 * Network-facing code never panics; every failure ends up in one of these
 * and is turned into a user notice by the session.
 */

use thiserror::Error;

use crate::client::session::state::TransitionError;
use crate::shared::SharedError;

/// Failure of a single REST call
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server answered 2xx but sent no body
    #[error("Response body is empty")]
    EmptyResponseBody,

    /// The server answered with a non-2xx status
    #[error("HTTP {status}: {message}")]
    HttpError {
        /// Status code of the response
        status: u16,
        /// Response body, or the canonical reason when the body is empty
        message: String,
    },

    /// No usable response: connect failure, timeout, or an unreadable body
    #[error("Network error: {message}")]
    NetworkError {
        /// Description of the underlying failure
        message: String,
    },
}

impl ApiError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::HttpError {
            status,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Status code when the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network(format!("request timed out: {}", err))
        } else if err.is_connect() {
            Self::network(format!("connection failed: {}", err))
        } else {
            Self::network(err.to_string())
        }
    }
}

/// Local storage failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The background writer has stopped; queued writes may be lost
    #[error("Preference writer is no longer running")]
    WriterClosed,

    /// An edit was applied in memory but could not be written to disk
    #[error("Failed to persist preferences: {0}")]
    WriteFailed(String),
}

/// Step of the login pipeline that failed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BootstrapError {
    #[error("Login failed: {0}")]
    Login(ApiError),

    #[error("Fetching user details failed: {0}")]
    UserDetail(ApiError),

    /// The login task ended without reporting an outcome
    #[error("Login task ended unexpectedly")]
    Interrupted,
}

impl BootstrapError {
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Login(err) | Self::UserDetail(err) => Some(err),
            Self::Interrupted => None,
        }
    }
}

/// Errors surfaced by [`Session`](crate::client::session::Session)
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] SharedError),

    #[error("A login request is already in progress")]
    LoginInFlight,

    #[error("Already logged in")]
    AlreadyLoggedIn,

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("No login request is in progress")]
    NoLoginPending,

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
}
