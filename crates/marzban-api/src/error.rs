use thiserror::Error;

use crate::models::ValidationErrorDetail;
use crate::schema::SchemaError;

/// Top-level error type for the `marzban-api` crate.
///
/// The first five variants are the status-driven kinds produced when the
/// panel answers with a structured error. Only those are retried by the
/// dispatcher; everything else surfaces on the first occurrence.
#[derive(Debug, Error)]
pub enum Error {
    // ── Status-mapped ───────────────────────────────────────────────
    /// HTTP 400 -- the panel rejected the request (bad dates, bad state, ...).
    #[error("{message}")]
    BadRequest { message: String },

    /// HTTP 403 -- missing, expired, or insufficient bearer token.
    #[error("Unauthorized access.")]
    Unauthorized,

    /// HTTP 404.
    #[error("Resource not found.")]
    NotFound,

    /// HTTP 409 -- usually the resource already exists.
    #[error("{message}")]
    Conflict { message: String },

    /// HTTP 422 -- field validation failed server-side.
    #[error("{message}")]
    Validation {
        message: String,
        detail: Vec<ValidationErrorDetail>,
    },

    // ── Authentication ──────────────────────────────────────────────
    /// The token endpoint answered 2xx but the body was not a usable token.
    #[error("Token error: {message}")]
    Token { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// Connection failures and every non-2xx status not mapped above.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A non-2xx status the HTTP library does not treat as an error (1xx/3xx).
    #[error("Unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16 },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// A 2xx body that is not JSON, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A payload rejected by the schema layer.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl Error {
    /// Returns `true` for the status-driven kinds the dispatcher retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::BadRequest { .. }
                | Self::Unauthorized
                | Self::NotFound
                | Self::Conflict { .. }
                | Self::Validation { .. }
        )
    }

    /// The HTTP status behind this error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest { .. } => Some(400),
            Self::Unauthorized => Some(403),
            Self::NotFound => Some(404),
            Self::Conflict { .. } => Some(409),
            Self::Validation { .. } => Some(422),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::UnexpectedStatus { status } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
