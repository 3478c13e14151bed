use http::header::{self, HeaderMap, HeaderValue};
use http::StatusCode;
use std::time::Duration;

/// Default User-Agent string for HTTP requests
pub const DEFAULT_USER_AGENT: &str = concat!("modkit-http-lite/", env!("CARGO_PKG_VERSION"));

/// Default redirect budget (hops after the initial request)
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// Default maximum response body size (10 MiB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Status codes treated as redirects. Fixed, not configurable.
pub const REDIRECT_STATUS_CODES: [StatusCode; 4] = [
    StatusCode::MOVED_PERMANENTLY,
    StatusCode::FOUND,
    StatusCode::TEMPORARY_REDIRECT,
    StatusCode::PERMANENT_REDIRECT,
];

/// Check whether a status is one of [`REDIRECT_STATUS_CODES`].
#[must_use]
pub fn is_redirect_status(status: StatusCode) -> bool {
    REDIRECT_STATUS_CODES.contains(&status)
}

/// How a response without a supported `Content-Encoding` is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodingPolicy {
    /// Only `gzip` and `deflate` are accepted. A missing header, `identity`,
    /// or anything else fails with `HttpError::UnsupportedEncoding`.
    #[default]
    Strict,
    /// Like `Strict`, but a missing header or `identity` passes the raw
    /// bytes through as text.
    AllowIdentity,
}

/// Client-wide configuration.
///
/// Treated as an immutable value: [`HttpClient::configure`](crate::HttpClient::configure)
/// builds a new `ClientConfig` and swaps it in wholesale, so requests already
/// in flight keep the snapshot they started with.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Headers sent on every request unless the caller overrides them
    pub default_headers: HeaderMap,

    /// Default redirect-follow decision (`None` = unset, which means "do not follow")
    ///
    /// A per-call `allow_redirects` takes precedence over this value.
    pub allow_redirects: Option<bool>,

    /// Redirect budget for a single logical call (default: 5)
    pub max_redirects: usize,

    /// Maximum body size in bytes, applied to both raw and decompressed bytes (default: 10 MiB)
    pub max_body_size: usize,

    /// Content-Encoding handling (default: `Strict`)
    pub encoding_policy: EncodingPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_headers: default_headers(DEFAULT_USER_AGENT),
            allow_redirects: None,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            encoding_policy: EncodingPolicy::Strict,
        }
    }
}

impl ClientConfig {
    /// Configuration that follows redirects by default
    #[must_use]
    pub fn following_redirects() -> Self {
        Self {
            allow_redirects: Some(true),
            ..Default::default()
        }
    }

    /// Configuration that accepts uncompressed responses as plain text
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            encoding_policy: EncodingPolicy::AllowIdentity,
            ..Default::default()
        }
    }

    /// Return a copy with `headers` merged over the defaults and the redirect
    /// default replaced when `allow_redirects` is `Some`.
    #[must_use]
    pub fn amended(&self, headers: &HeaderMap, allow_redirects: Option<bool>) -> Self {
        Self {
            default_headers: merge_headers(&self.default_headers, headers),
            allow_redirects: allow_redirects.or(self.allow_redirects),
            ..self.clone()
        }
    }

    /// Decide whether a redirect is followed.
    ///
    /// Precedence: explicit per-call flag, then the configured default, then "do not follow".
    #[must_use]
    pub fn follows_redirects(&self, per_call: Option<bool>) -> bool {
        per_call.or(self.allow_redirects).unwrap_or(false)
    }
}

/// Build the default header set advertised on every request.
///
/// `connection: keep-alive` is advertised even though each hop closes its
/// connection after use.
#[must_use]
pub fn default_headers(user_agent: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(4);
    headers.insert(header::USER_AGENT, HeaderValue::from_static(user_agent));
    headers.insert(
        header::ACCEPT_ENCODING,
        HeaderValue::from_static("gzip, deflate"),
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers
}

/// Overlay `overrides` on `base`. Every name present in `overrides` replaces
/// all values of that name in `base`; multi-valued overrides are kept whole.
#[must_use]
pub fn merge_headers(base: &HeaderMap, overrides: &HeaderMap) -> HeaderMap {
    let mut merged = base.clone();
    for name in overrides.keys() {
        merged.remove(name);
        for value in overrides.get_all(name) {
            merged.append(name.clone(), value.clone());
        }
    }
    merged
}

/// Configuration of the default hyper-based transport
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-hop timeout covering connect, request and body read (default: 30 seconds)
    pub request_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
        }
    }
}
