use crate::config::is_redirect_status;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;

/// Result of a completed request chain.
///
/// Immutable once constructed. `headers` are the headers that were sent for
/// the terminal hop (defaults merged with caller overrides), not the
/// server's response headers. Header names are lowercase (`user-agent`,
/// not `User-Agent`), as [`HeaderMap`] stores them; lookups are
/// case-insensitive. `payload` is the decoded text body.
///
/// # Example
///
/// ```ignore
/// let resp = client.get("https://api.example.com/items").send()?;
/// if let Some(items) = resp.json() {
///     println!("{} -> {items}", resp.status());
/// }
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    payload: String,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, payload: String) -> Self {
        Self {
            status,
            headers,
            payload,
        }
    }

    /// Get the response status code
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Numeric status code (100-599)
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Headers sent with the terminal request
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Decoded text body
    #[must_use]
    pub fn content(&self) -> &str {
        &self.payload
    }

    /// Alias of [`content`](Self::content)
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Consume the response and return the decoded text body
    #[must_use]
    pub fn into_payload(self) -> String {
        self.payload
    }

    /// Whether this is an unfollowed redirect (301, 302, 307, 308)
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        is_redirect_status(self.status)
    }

    /// Parse the payload as JSON.
    ///
    /// Returns `None` if the payload is not valid JSON. Not cached; each call parses again.
    #[must_use]
    pub fn json(&self) -> Option<serde_json::Value> {
        self.json_as()
    }

    /// Parse the payload into `T`, or `None` if it does not deserialize.
    #[must_use]
    pub fn json_as<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_str(&self.payload).ok()
    }
}

impl fmt::Display for HttpResponse {
    #[allow(clippy::use_debug)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Response object. Status: {}, headers: {:?}",
            self.status.as_u16(),
            self.headers
        )
    }
}

// Payload omitted: bodies can be large and end up in logs.
impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("payload_len", &self.payload.len())
            .finish_non_exhaustive()
    }
}
