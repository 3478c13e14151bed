use crate::client::HttpClient;
use crate::error::HttpError;
use crate::pipeline::{self, RequestContext};
use crate::response::HttpResponse;
use crate::transport::Transport;
use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use std::io;
use std::marker::PhantomData;

/// Marker for verbs that carry no body (GET, HEAD, OPTIONS, DELETE)
#[derive(Debug, Clone, Copy)]
pub struct Bodyless;

/// Marker for verbs that accept a body (POST, PUT, PATCH)
#[derive(Debug, Clone, Copy)]
pub struct WithBody;

/// HTTP request builder with fluent API
///
/// Created by [`HttpClient::get`], [`HttpClient::post`], etc. Body setters
/// only exist on builders for POST, PUT and PATCH.
///
/// # Example
///
/// ```ignore
/// use modkit_http_lite::HttpClient;
///
/// let client = HttpClient::new()?;
///
/// // Simple GET, following redirects for this call only
/// let resp = client
///     .get("https://api.example.com/users")
///     .allow_redirects(true)
///     .send()?;
///
/// // POST with JSON body
/// let resp = client
///     .post("https://api.example.com/users")
///     .header("x-request-id", "123")
///     .json(&serde_json::json!({"name": "Alice"}))?
///     .send()?;
/// ```
#[must_use = "RequestBuilder does nothing until .send() is called"]
pub struct RequestBuilder<'a, T: Transport, K = Bodyless> {
    client: &'a HttpClient<T>,
    ctx: RequestContext,
    /// Error captured during building (deferred to `send()`)
    error: Option<HttpError>,
    kind: PhantomData<K>,
}

impl<'a, T: Transport, K> RequestBuilder<'a, T, K> {
    pub(crate) fn new(client: &'a HttpClient<T>, method: http::Method, url: &str) -> Self {
        Self {
            client,
            ctx: RequestContext::new(method, url),
            error: None,
            kind: PhantomData,
        }
    }

    /// Add a single header to the request
    ///
    /// Repeating a name adds another value; either way, caller headers
    /// replace the client's default headers of the same name.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if self.error.is_some() {
            return self;
        }

        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.ctx.headers.append(name, value);
            }
            (Err(e), _) => {
                self.error = Some(HttpError::InvalidHeaderName(e));
            }
            (_, Err(e)) => {
                self.error = Some(HttpError::InvalidHeaderValue(e));
            }
        }
        self
    }

    /// Add multiple headers to the request
    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        for (name, value) in headers {
            self = self.header(&name, &value);
            if self.error.is_some() {
                break;
            }
        }
        self
    }

    /// Add already-validated headers
    pub fn header_map(mut self, headers: HeaderMap) -> Self {
        for (name, value) in &headers {
            self.ctx.headers.append(name.clone(), value.clone());
        }
        self
    }

    /// Override the client's redirect default for this call
    pub fn allow_redirects(mut self, allow: bool) -> Self {
        self.ctx.allow_redirects = Some(allow);
        self
    }

    /// Override the client's redirect budget for this call
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.ctx.max_redirects = Some(max);
        self
    }

    /// Send the request, following redirects if allowed, and decode the payload.
    ///
    /// Blocks the calling thread until the whole redirect chain completes.
    ///
    /// # Errors
    ///
    /// Returns `HttpError` if:
    /// - a header given to the builder was invalid
    /// - the URL scheme is not http/https (`UnsupportedScheme`)
    /// - the redirect budget runs out (`TooManyRedirects`)
    /// - a followed redirect has no `Location` (`MissingRedirectTarget`)
    /// - the payload encoding is unsupported (`UnsupportedEncoding`)
    /// - network, timeout or size-limit failures
    pub fn send(mut self) -> Result<HttpResponse, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        let config = self.client.config();
        pipeline::execute(self.client.transport(), &config, self.ctx)
    }
}

impl<T: Transport> RequestBuilder<'_, T, WithBody> {
    /// Set request body as JSON
    ///
    /// Serializes the value using `serde_json` (`{"a": 1, "b": [1, 2]}`
    /// spacing, compact otherwise) and forces
    /// `Content-Type: application/json`. A JSON body always wins over a raw
    /// body, whichever was set first.
    ///
    /// # Errors
    ///
    /// Returns a header error captured earlier, or `HttpError::Json` if
    /// serialization fails.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        self.ctx.json = Some(Bytes::from(to_json_bytes(body)?));
        Ok(self)
    }

    /// Set request body as raw bytes (sent unchanged)
    pub fn body_bytes(mut self, body: impl Into<Bytes>) -> Self {
        self.ctx.body = Some(body.into());
        self
    }

    /// Set request body as text (sent UTF-8 encoded)
    pub fn body_string(mut self, body: impl Into<String>) -> Self {
        self.ctx.body = Some(Bytes::from(body.into()));
        self
    }
}

/// Separators `", "` and `": "`, no newlines or indentation.
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

fn to_json_bytes<B: Serialize + ?Sized>(body: &B) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, SpacedFormatter);
    body.serialize(&mut serializer)?;
    Ok(out)
}
