//! Transport seam: opening a connection per hop and exchanging one
//! request/response pair over it.
//!
//! The request pipeline only talks to the [`Transport`] and [`Connection`]
//! traits. [`HyperTransport`] is the default implementation: hyper HTTP/1.1
//! over plain TCP or rustls, driven by a small owned tokio runtime so that
//! callers stay fully blocking.

use crate::config::TransportConfig;
use crate::error::HttpError;
use crate::target::Target;
use crate::tls;
use bytes::Bytes;
use http::header::{self, HeaderMap, HeaderValue};
use http::{Request, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1::SendRequest;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tower::ServiceExt;

/// Status, headers and fully buffered (still encoded) body of one exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    /// Value of `Content-Encoding`, if present and valid UTF-8
    #[must_use]
    pub fn content_encoding(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
    }

    /// Value of `Location`, if present and valid UTF-8
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// Opens one connection per hop.
pub trait Transport: Send + Sync {
    type Connection: Connection;

    /// Open a fresh connection to `target`.
    ///
    /// # Errors
    /// Returns `HttpError` if the connection cannot be established.
    fn connect(&self, target: &Target) -> Result<Self::Connection, HttpError>;
}

/// A single open connection. Consumed by [`Connection::close`].
pub trait Connection {
    /// Send `request` (origin-form URI) and read the whole response body,
    /// failing with `HttpError::BodyTooLarge` past `max_body_size` bytes.
    ///
    /// # Errors
    /// Returns `HttpError` on network, timeout or size-limit failures.
    fn exchange(
        &mut self,
        request: Request<Bytes>,
        max_body_size: usize,
    ) -> Result<RawResponse, HttpError>;

    /// Release the connection.
    fn close(self);
}

/// Default transport: hyper HTTP/1.1 with rustls, one connection per hop.
///
/// Owns a single-worker tokio runtime. Calls block the current thread, so
/// they must not be made from inside another tokio runtime.
pub struct HyperTransport {
    runtime: Arc<Runtime>,
    connector: HttpsConnector<HttpConnector>,
    config: TransportConfig,
}

impl HyperTransport {
    /// Create a transport with its own runtime.
    ///
    /// # Errors
    /// Returns `HttpError::Transport` if the runtime cannot be started, or
    /// `HttpError::Tls` if TLS initialization fails.
    pub fn new(config: TransportConfig) -> Result<Self, HttpError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("modkit-http-lite")
            .enable_all()
            .build()
            .map_err(|e| HttpError::Transport(Box::new(e)))?;

        Ok(Self {
            runtime: Arc::new(runtime),
            connector: tls::build_https_connector()?,
            config,
        })
    }

    /// The transport configuration in use
    #[must_use]
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

impl Transport for HyperTransport {
    type Connection = HyperConnection;

    fn connect(&self, target: &Target) -> Result<HyperConnection, HttpError> {
        let origin = target.origin()?;
        let host = HeaderValue::from_str(&target.host)?;
        let timeout = self.config.request_timeout;
        let connector = self.connector.clone();

        let (sender, conn) = self.runtime.block_on(with_timeout(timeout, async move {
            let io = connector
                .oneshot(origin)
                .await
                .map_err(HttpError::Transport)?;
            let handshake = hyper::client::conn::http1::handshake::<_, Full<Bytes>>(io).await?;
            Ok(handshake)
        }))?;

        let driver = self.runtime.spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(error = %e, "connection ended with error");
            }
        });

        tracing::trace!(host = %target.host, scheme = %target.scheme, "connection opened");

        Ok(HyperConnection {
            runtime: Arc::clone(&self.runtime),
            sender,
            driver,
            host,
            timeout,
        })
    }
}

/// Connection opened by [`HyperTransport`]. Dropping it aborts the
/// connection task.
pub struct HyperConnection {
    runtime: Arc<Runtime>,
    sender: SendRequest<Full<Bytes>>,
    driver: JoinHandle<()>,
    host: HeaderValue,
    timeout: Duration,
}

impl Connection for HyperConnection {
    fn exchange(
        &mut self,
        request: Request<Bytes>,
        max_body_size: usize,
    ) -> Result<RawResponse, HttpError> {
        let mut request = request.map(Full::new);
        if !request.headers().contains_key(header::HOST) {
            request
                .headers_mut()
                .insert(header::HOST, self.host.clone());
        }

        let sender = &mut self.sender;
        self.runtime.block_on(with_timeout(self.timeout, async move {
            sender.ready().await?;
            let response = sender.send_request(request).await?;
            let (parts, body) = response.into_parts();
            let body = read_body_limited(body, max_body_size).await?;
            Ok(RawResponse {
                status: parts.status,
                headers: parts.headers,
                body,
            })
        }))
    }

    fn close(self) {
        drop(self);
    }
}

impl Drop for HyperConnection {
    fn drop(&mut self) {
        self.driver.abort();
        tracing::trace!("connection closed");
    }
}

async fn with_timeout<T>(
    timeout: Duration,
    fut: impl Future<Output = Result<T, HttpError>>,
) -> Result<T, HttpError> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| HttpError::Timeout(timeout))?
}

/// Read a body to the end, failing once more than `limit` bytes arrive.
async fn read_body_limited<B>(body: B, limit: usize) -> Result<Bytes, HttpError>
where
    B: http_body::Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut collected = Vec::new();
    let mut body = std::pin::pin!(body);

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|e| HttpError::Transport(e.into()))?;
        if let Some(chunk) = frame.data_ref() {
            if collected.len() + chunk.len() > limit {
                return Err(HttpError::BodyTooLarge {
                    limit,
                    actual: collected.len() + chunk.len(),
                });
            }
            collected.extend_from_slice(chunk);
        }
    }

    Ok(Bytes::from(collected))
}
