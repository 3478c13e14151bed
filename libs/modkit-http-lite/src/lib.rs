#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Minimal blocking HTTP client
//!
//! This crate provides a small hyper-based client with:
//! - URL resolution (`http://` assumed when no scheme is given)
//! - Default headers shared process-wide and amended at runtime
//! - JSON request bodies
//! - Redirect following (301, 302, 307, 308) within a redirect budget
//! - Mandatory `gzip` / `deflate` response decoding into text
//! - Lazy, failure-tolerant JSON access on the response
//!
//! # Content Encoding
//!
//! Every request advertises `Accept-Encoding: gzip, deflate`. A response
//! whose `Content-Encoding` is missing or anything other than `gzip` or
//! `deflate` fails with [`HttpError::UnsupportedEncoding`], unless the
//! client is built with [`EncodingPolicy::AllowIdentity`].
//!
//! # Redirects
//!
//! Redirects are followed only when enabled per call or in the client
//! configuration. The per-call setting wins, then the configured one;
//! when neither is set redirects are not followed and the redirect response
//! itself is returned.
//!
//! # Example
//!
//! ```ignore
//! use modkit_http_lite::HttpClient;
//!
//! let client = HttpClient::builder()
//!     .user_agent("my-app/1.0")
//!     .allow_redirects(true)
//!     .build()?;
//!
//! let resp = client.get("example.com/api").send()?;
//! if let Some(data) = resp.json() {
//!     println!("{data}");
//! }
//! ```

mod builder;
mod client;
mod config;
mod decode;
mod error;
mod pipeline;
mod request;
mod response;
mod target;
#[cfg(test)]
mod testing;
mod tls;
mod transport;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{
    ClientConfig, DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_REDIRECTS, DEFAULT_USER_AGENT,
    EncodingPolicy, REDIRECT_STATUS_CODES, TransportConfig, default_headers, is_redirect_status,
    merge_headers,
};
pub use decode::decode_payload;
pub use error::{HttpError, InvalidUriKind};
pub use pipeline::{RequestContext, execute};
pub use request::{Bodyless, RequestBuilder, WithBody};
pub use response::HttpResponse;
pub use target::{Scheme, Target, resolve, resolve_location};
pub use transport::{Connection, HyperConnection, HyperTransport, RawResponse, Transport};

// Re-export for convenience
pub use http::{HeaderMap, Method, StatusCode};
