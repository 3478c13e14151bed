use crate::builder::HttpClientBuilder;
use crate::config::ClientConfig;
use crate::error::HttpError;
use crate::request::{Bodyless, RequestBuilder, WithBody};
use crate::transport::{HyperTransport, Transport};
use arc_swap::ArcSwap;
use http::{HeaderMap, Method};
use std::sync::Arc;

/// Blocking HTTP client
///
/// Every call resolves the URL, opens a fresh connection per hop, follows
/// redirects within the configured budget and decodes the compressed
/// payload into text. See [`RequestBuilder::send`] for the full flow.
///
/// Use [`HttpClientBuilder`] to construct instances with custom configuration.
///
/// # Thread Safety
///
/// `HttpClient` is `Clone + Send + Sync`. Clones share the transport and
/// the configuration: [`configure`](Self::configure) on one clone is seen by
/// calls issued afterwards from any clone. A call already in progress keeps
/// the configuration it started with.
///
/// # Blocking
///
/// The default [`HyperTransport`] drives its own tokio runtime, so calls
/// must not be issued from inside another tokio runtime.
///
/// # Example
///
/// ```ignore
/// let client = HttpClient::new()?;
/// let resp = client.get("example.com/api").send()?;
/// println!("{resp}");
/// ```
pub struct HttpClient<T: Transport = HyperTransport> {
    pub(crate) transport: Arc<T>,
    pub(crate) config: Arc<ArcSwap<ClientConfig>>,
}

impl<T: Transport> Clone for HttpClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: Arc::clone(&self.config),
        }
    }
}

impl HttpClient<HyperTransport> {
    /// Create a new HTTP client with default configuration
    ///
    /// # Errors
    /// Returns an error if the runtime or TLS initialization fails
    pub fn new() -> Result<Self, HttpError> {
        HttpClientBuilder::new().build()
    }

    /// Create a builder for configuring the HTTP client
    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }
}

impl<T: Transport> HttpClient<T> {
    /// Create a GET request builder
    pub fn get(&self, url: &str) -> RequestBuilder<'_, T, Bodyless> {
        RequestBuilder::new(self, Method::GET, url)
    }

    /// Create a HEAD request builder
    pub fn head(&self, url: &str) -> RequestBuilder<'_, T, Bodyless> {
        RequestBuilder::new(self, Method::HEAD, url)
    }

    /// Create an OPTIONS request builder
    pub fn options(&self, url: &str) -> RequestBuilder<'_, T, Bodyless> {
        RequestBuilder::new(self, Method::OPTIONS, url)
    }

    /// Create a DELETE request builder
    pub fn delete(&self, url: &str) -> RequestBuilder<'_, T, Bodyless> {
        RequestBuilder::new(self, Method::DELETE, url)
    }

    /// Create a POST request builder
    ///
    /// Attach a body with `.json()`, `.body_bytes()` or `.body_string()`.
    pub fn post(&self, url: &str) -> RequestBuilder<'_, T, WithBody> {
        RequestBuilder::new(self, Method::POST, url)
    }

    /// Create a PUT request builder
    pub fn put(&self, url: &str) -> RequestBuilder<'_, T, WithBody> {
        RequestBuilder::new(self, Method::PUT, url)
    }

    /// Create a PATCH request builder
    pub fn patch(&self, url: &str) -> RequestBuilder<'_, T, WithBody> {
        RequestBuilder::new(self, Method::PATCH, url)
    }

    /// Amend the shared configuration
    ///
    /// `headers` are merged into the default headers (same-name entries
    /// replaced). `allow_redirects` replaces the redirect default only when
    /// `Some`. Affects calls started after this returns.
    pub fn configure(&self, headers: &HeaderMap, allow_redirects: Option<bool>) {
        self.config
            .rcu(|current| current.amended(headers, allow_redirects));
        tracing::debug!(
            headers = headers.len(),
            allow_redirects = ?allow_redirects,
            "http client reconfigured"
        );
    }

    /// Replace the shared configuration wholesale
    pub fn replace_config(&self, config: ClientConfig) {
        self.config.store(Arc::new(config));
    }

    /// Snapshot of the current configuration
    #[must_use]
    pub fn config(&self) -> Arc<ClientConfig> {
        self.config.load_full()
    }

    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }
}
