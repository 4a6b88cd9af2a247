//! Error types for the BloodLink API client.
//!
//! # Design
//! `ApiClient` is the only place transport, parse and status failures are
//! translated into `ApiError`. The reactive primitives store these values in
//! their state instead of propagating them, so every variant carries a
//! human-readable message suitable for rendering as is.

use thiserror::Error;

/// Status reported for failures where no HTTP response was received.
pub const TRANSPORT_STATUS: u16 = 0;

pub const UNKNOWN_ERROR: &str = "unknown error";
pub const INVALID_JSON: &str = "invalid JSON response";
pub const NON_JSON_SUCCESS: &str = "server responded OK but not JSON";
pub const UNAUTHORIZED: &str = "invalid credentials";
pub const NOT_FOUND: &str = "not found";

/// Errors produced while talking to the BloodLink API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// No response was received.
    #[error("{message}")]
    Transport { message: String },

    /// The server declared JSON but the body did not decode.
    #[error("invalid JSON response")]
    MalformedJson { status: u16, raw: String },

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        raw: Option<String>,
    },

    /// The server answered 2xx without a JSON body.
    #[error("server responded OK but not JSON")]
    NonJsonSuccess { status: u16, raw: String },

    /// The JSON body does not fit the domain type the caller asked for.
    #[error("unexpected response shape: {message}")]
    SchemaMismatch { status: u16, message: String },

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("login succeeded but the response carried no token")]
    MissingToken,

    #[error("no active session")]
    MissingSession,

    #[error("session storage failed: {0}")]
    Session(#[from] SessionError),

    /// A producer failed without a typed error (it panicked).
    #[error("unknown error")]
    Unknown,
}

impl ApiError {
    /// Build the error for a non-2xx response.
    ///
    /// The message comes from the body's `message` field, then the raw text,
    /// then a generic fallback. 401 and 404 always get fixed wording.
    pub fn from_status(status: u16, message: Option<String>, raw: Option<String>) -> Self {
        let message = match status {
            401 => UNAUTHORIZED.to_string(),
            404 => NOT_FOUND.to_string(),
            _ => message
                .filter(|m| !m.is_empty())
                .or_else(|| raw.clone().filter(|r| !r.is_empty()))
                .unwrap_or_else(|| format!("HTTP error {status}")),
        };
        ApiError::Http { status, message, raw }
    }

    /// HTTP status of the failure, `TRANSPORT_STATUS` when none applies.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::MalformedJson { status, .. }
            | ApiError::Http { status, .. }
            | ApiError::NonJsonSuccess { status, .. }
            | ApiError::SchemaMismatch { status, .. } => *status,
            _ => TRANSPORT_STATUS,
        }
    }

    /// Original body text, when the failure carried one.
    pub fn raw(&self) -> Option<&str> {
        match self {
            ApiError::MalformedJson { raw, .. } | ApiError::NonJsonSuccess { raw, .. } => Some(raw),
            ApiError::Http { raw, .. } => raw.as_deref(),
            _ => None,
        }
    }
}

/// Failures of a persistent `SessionStore`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("session file I/O failed: {0}")]
    Io(String),

    #[error("session file is corrupt: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for SessionError {
    fn from(e: std::io::Error) -> Self {
        SessionError::Io(e.to_string())
    }
}
