use crate::client::HttpClient;
use crate::config::{ClientConfig, EncodingPolicy, TransportConfig};
use crate::error::HttpError;
use crate::transport::{HyperTransport, Transport};
use arc_swap::ArcSwap;
use http::header::{self, HeaderName, HeaderValue};
use std::sync::Arc;
use std::time::Duration;

/// Builder for constructing an [`HttpClient`].
///
/// Header values given here are validated in [`build`](Self::build).
pub struct HttpClientBuilder {
    config: ClientConfig,
    transport: TransportConfig,
    user_agent: Option<String>,
    default_headers: Vec<(String, String)>,
}

impl HttpClientBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a builder with a specific configuration
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config,
            transport: TransportConfig::default(),
            user_agent: None,
            default_headers: Vec::new(),
        }
    }

    /// Set the per-hop timeout of the hyper transport
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.transport.request_timeout = timeout;
        self
    }

    /// Set the user agent string
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Add or replace a default header sent on every request
    #[must_use]
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Set the default redirect-follow decision
    #[must_use]
    pub fn allow_redirects(mut self, allow: bool) -> Self {
        self.config.allow_redirects = Some(allow);
        self
    }

    /// Set the default redirect budget
    ///
    /// `0` means a redirect that should be followed fails with
    /// `HttpError::TooManyRedirects`.
    #[must_use]
    pub fn max_redirects(mut self, max_redirects: usize) -> Self {
        self.config.max_redirects = max_redirects;
        self
    }

    /// Set the maximum response body size (raw and decompressed)
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Set how responses without a supported `Content-Encoding` are treated
    #[must_use]
    pub fn encoding_policy(mut self, policy: EncodingPolicy) -> Self {
        self.config.encoding_policy = policy;
        self
    }

    /// Build the client on the default hyper transport
    ///
    /// # Errors
    /// Returns an error if a header is invalid, or if the runtime or TLS
    /// initialization fails
    pub fn build(self) -> Result<HttpClient, HttpError> {
        let transport = HyperTransport::new(self.transport.clone())?;
        self.build_with_transport(transport)
    }

    /// Build the client on a caller-provided transport
    ///
    /// # Errors
    /// Returns an error if a header given to the builder is invalid
    pub fn build_with_transport<T: Transport>(self, transport: T) -> Result<HttpClient<T>, HttpError> {
        let mut config = self.config;

        if let Some(user_agent) = self.user_agent {
            config
                .default_headers
                .insert(header::USER_AGENT, HeaderValue::try_from(user_agent)?);
        }

        for (name, value) in self.default_headers {
            config
                .default_headers
                .insert(HeaderName::try_from(name)?, HeaderValue::try_from(value)?);
        }

        tracing::debug!(
            allow_redirects = ?config.allow_redirects,
            max_redirects = config.max_redirects,
            encoding_policy = ?config.encoding_policy,
            "http client built"
        );

        Ok(HttpClient {
            transport: Arc::new(transport),
            config: Arc::new(ArcSwap::from_pointee(config)),
        })
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
