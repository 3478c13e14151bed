use std::time::Duration;
use thiserror::Error;

/// Classification of URL validation failures.
///
/// Provides programmatic matching for different failure modes without
/// relying on unstable error message strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidUriKind {
    /// URL could not be parsed (malformed syntax)
    ParseError,
    /// URL is missing required host/authority component
    MissingAuthority,
    /// Redirect `Location` could not be resolved against the current URL
    BadLocation,
}

/// HTTP client error types
///
/// Every variant is terminal: the client never retries or recovers
/// internally, the error is handed to the caller of the verb method.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpError {
    /// URL scheme is neither `http` nor `https`
    #[error("Unsupported scheme: {scheme}")]
    UnsupportedScheme { scheme: String },

    /// Redirect budget exhausted
    #[error("Too many redirects (budget: {max})")]
    TooManyRedirects { max: usize },

    /// Redirect status received without a `Location` header
    #[error("Redirect ({status}) but no Location header")]
    MissingRedirectTarget { status: http::StatusCode },

    /// `Content-Encoding` absent or not one of `gzip` / `deflate`
    #[error("Could not decode encoding: {}", encoding.as_deref().unwrap_or("<none>"))]
    UnsupportedEncoding { encoding: Option<String> },

    /// Compressed payload is corrupt or truncated
    #[error("Failed to decompress {encoding} payload: {source}")]
    Decompress {
        encoding: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Invalid URL (failed to parse)
    ///
    /// Use the `kind` field for programmatic matching. The `reason` field contains
    /// a diagnostic message intended for logging only.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUri {
        url: String,
        kind: InvalidUriKind,
        reason: String,
    },

    /// Request building failed
    #[error("Failed to build request: {0}")]
    RequestBuild(#[from] http::Error),

    /// Invalid header name
    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    /// Invalid header value
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// JSON request body could not be serialized
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Response body exceeded size limit (raw or decompressed)
    #[error("Response body too large: limit {limit} bytes, got {actual} bytes")]
    BodyTooLarge { limit: usize, actual: usize },

    /// Single hop timed out in the transport
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Transport error (network, connection, etc)
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// TLS error
    #[error("TLS error: {0}")]
    Tls(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<hyper::Error> for HttpError {
    fn from(err: hyper::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}
