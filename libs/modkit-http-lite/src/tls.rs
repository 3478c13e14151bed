//! TLS setup for the hyper transport.
//!
//! Roots are the bundled webpki roots; certificate configuration is not
//! exposed.

use crate::error::HttpError;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use std::sync::Arc;

/// Get the crypto provider for TLS connections.
///
/// 1. If a default provider is already installed globally, use it
/// 2. Otherwise create an aws-lc-rs provider without installing it globally
pub fn get_crypto_provider() -> Arc<rustls::crypto::CryptoProvider> {
    rustls::crypto::CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}

/// Build a connector that dials plain TCP for `http` and rustls for `https`.
///
/// Only HTTP/1.1 is advertised via ALPN.
///
/// # Errors
/// Returns `HttpError::Tls` if the crypto provider rejects the default protocol versions.
pub fn build_https_connector() -> Result<HttpsConnector<HttpConnector>, HttpError> {
    let provider = get_crypto_provider();
    let connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(provider)
        .map_err(|e| HttpError::Tls(Box::new(e)))?
        .https_or_http()
        .enable_http1()
        .build();
    Ok(connector)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_crypto_provider_is_stable() {
        let a = get_crypto_provider();
        let b = get_crypto_provider();
        assert_eq!(a.cipher_suites.len(), b.cipher_suites.len());
        assert!(!a.cipher_suites.is_empty());
    }

    #[test]
    fn test_connector_builds() {
        assert!(build_https_connector().is_ok());
    }
}
