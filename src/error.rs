use http::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the token provider.
///
/// None of these are retried internally. A failed call leaves both cache
/// slots exactly as they were.
#[derive(Debug, Error)]
pub enum Error {
    /// The credential document is missing required fields or its key
    /// material cannot be loaded. The provider is never constructed.
    #[error("malformed credentials: {0}")]
    MalformedCredentials(String),

    /// The assertion could not be signed.
    #[error("assertion signing failed: {0}")]
    SigningFailed(String),

    /// The token endpoint could not be reached or its answer was unusable.
    #[error("token exchange failed: {0}")]
    ExchangeFailed(#[from] ExchangeError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Cause of an [`Error::ExchangeFailed`].
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Non-2xx answer; the body is kept for diagnostics.
    #[error("token endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("undecodable token response: {0}")]
    Decode(#[source] serde_json::Error),

    /// Well-formed JSON carrying a value no token can hold.
    #[error("invalid token response: {0}")]
    InvalidResponse(String),
}

impl ExchangeError {
    /// Short label used for the failure metric.
    pub fn reason(&self) -> &'static str {
        match self {
            ExchangeError::Transport(_) => "transport",
            ExchangeError::Status { .. } => "status",
            ExchangeError::Decode(_) | ExchangeError::InvalidResponse(_) => "decode",
        }
    }
}

impl Error {
    pub fn reason(&self) -> &'static str {
        match self {
            Error::MalformedCredentials(_) => "credentials",
            Error::SigningFailed(_) => "signing",
            Error::ExchangeFailed(e) => e.reason(),
            Error::Io(_) => "io",
        }
    }
}
