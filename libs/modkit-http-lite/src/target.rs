//! URL resolution: raw URL string to connection target.
//!
//! A URL without an explicit `scheme://` prefix is treated as `http`.
//! The request path always starts with `/` and carries the query string
//! (fragments are dropped).

use crate::error::{HttpError, InvalidUriKind};
use http::Uri;
use std::fmt;

/// Supported URL schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    /// Port used when the authority carries none
    #[must_use]
    pub fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a single hop goes: scheme, host (`host[:port]`) and request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub scheme: Scheme,
    /// Authority as written in the URL (`host` or `host:port`)
    pub host: String,
    /// Path plus `?query` when a query is present
    pub path: String,
}

impl Target {
    /// Absolute URL of this target, used as the base for relative redirects.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.path)
    }

    /// `scheme://host/` URI for the connector.
    ///
    /// # Errors
    /// Returns `HttpError::RequestBuild` if the host is not a valid authority.
    pub fn origin(&self) -> Result<Uri, HttpError> {
        Ok(Uri::builder()
            .scheme(self.scheme.as_str())
            .authority(self.host.as_str())
            .path_and_query("/")
            .build()?)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.host, self.path)
    }
}

/// Parse a raw URL into a [`Target`].
///
/// # Errors
/// - `HttpError::UnsupportedScheme` if the scheme is neither `http` nor `https`
/// - `HttpError::InvalidUri` if the URL is malformed or has no host
pub fn resolve(raw_url: &str) -> Result<Target, HttpError> {
    let normalized = if has_scheme(raw_url) {
        raw_url.to_owned()
    } else if let Some(rest) = raw_url.strip_prefix("//") {
        format!("http://{rest}")
    } else {
        format!("http://{raw_url}")
    };

    let uri: Uri = normalized
        .parse()
        .map_err(|e: http::uri::InvalidUri| HttpError::InvalidUri {
            url: raw_url.to_owned(),
            kind: InvalidUriKind::ParseError,
            reason: e.to_string(),
        })?;

    let scheme = match uri.scheme_str() {
        Some("http") => Scheme::Http,
        Some("https") => Scheme::Https,
        other => {
            return Err(HttpError::UnsupportedScheme {
                scheme: other.unwrap_or_default().to_owned(),
            });
        }
    };

    let host = match uri.authority() {
        Some(authority) if !authority.host().is_empty() => authority.as_str().to_owned(),
        _ => {
            return Err(HttpError::InvalidUri {
                url: raw_url.to_owned(),
                kind: InvalidUriKind::MissingAuthority,
                reason: "missing host/authority".to_owned(),
            });
        }
    };

    let mut path = match uri.path() {
        "" => "/".to_owned(),
        p => p.to_owned(),
    };
    if let Some(query) = uri.query().filter(|q| !q.is_empty()) {
        path.push('?');
        path.push_str(query);
    }

    Ok(Target { scheme, host, path })
}

/// `scheme://` counts only when it precedes the first `/`, `?` or `#`, so a
/// URL carried in a query string does not make the input absolute.
fn has_scheme(raw_url: &str) -> bool {
    let head_end = raw_url.find(['/', '?', '#']).unwrap_or(raw_url.len());
    raw_url[..head_end].ends_with(':') && raw_url[head_end..].starts_with("//")
}

/// Resolve a `Location` header value against the URL of the hop that returned it.
///
/// Absolute locations replace `base`; relative ones (`/login`,
/// `next?page=2`, `//cdn.example.com/x`) are joined onto it.
///
/// # Errors
/// Returns `HttpError::InvalidUri` with `InvalidUriKind::BadLocation` if the
/// location cannot be joined onto `base`.
pub fn resolve_location(base: &Target, location: &str) -> Result<String, HttpError> {
    let bad_location = |reason: String| HttpError::InvalidUri {
        url: location.to_owned(),
        kind: InvalidUriKind::BadLocation,
        reason,
    };

    let base = url::Url::parse(&base.url()).map_err(|e| bad_location(e.to_string()))?;
    let joined = base
        .join(location)
        .map_err(|e| bad_location(e.to_string()))?;
    Ok(joined.into())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn target(scheme: Scheme, host: &str, path: &str) -> Target {
        Target {
            scheme,
            host: host.to_owned(),
            path: path.to_owned(),
        }
    }

    #[test]
    fn test_resolve_full_url() {
        let t = resolve("https://api.example.com/v1/users").unwrap();
        assert_eq!(t, target(Scheme::Https, "api.example.com", "/v1/users"));
    }

    #[test]
    fn test_resolve_missing_scheme_defaults_to_http() {
        for raw in ["example.com/a/b", "//example.com/a/b"] {
            let t = resolve(raw).unwrap();
            assert_eq!(t.scheme, Scheme::Http, "{raw}");
            assert_eq!(t.host, "example.com");
            assert_eq!(t.path, "/a/b");
        }
    }

    #[test]
    fn test_resolve_url_in_query_without_scheme() {
        let t = resolve("example.com/login?next=http://other.com/x").unwrap();
        assert_eq!(
            t,
            target(Scheme::Http, "example.com", "/login?next=http://other.com/x")
        );

        let t = resolve("example.com?next=https://other.com/").unwrap();
        assert_eq!(t.path, "/?next=https://other.com/");

        let t = resolve("localhost:8080/cb?to=http://x").unwrap();
        assert_eq!(t.host, "localhost:8080");
    }

    #[test]
    fn test_resolve_missing_path_defaults_to_slash() {
        assert_eq!(resolve("http://example.com").unwrap().path, "/");
        assert_eq!(resolve("example.com").unwrap().path, "/");
    }

    #[test]
    fn test_resolve_appends_query() {
        let t = resolve("http://example.com/search?q=rust&page=2").unwrap();
        assert_eq!(t.path, "/search?q=rust&page=2");

        let t = resolve("http://example.com?q=1").unwrap();
        assert_eq!(t.path, "/?q=1");
    }

    #[test]
    fn test_resolve_empty_query_not_appended() {
        assert_eq!(resolve("http://example.com/p?").unwrap().path, "/p");
    }

    #[test]
    fn test_resolve_drops_fragment() {
        assert_eq!(resolve("http://example.com/p?x=1#top").unwrap().path, "/p?x=1");
    }

    #[test]
    fn test_resolve_keeps_port_in_host() {
        let t = resolve("http://127.0.0.1:8080/health").unwrap();
        assert_eq!(t.host, "127.0.0.1:8080");
        assert_eq!(t.origin().unwrap().to_string(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let err = resolve("ftp://files.example.com/pub").unwrap_err();
        match err {
            HttpError::UnsupportedScheme { scheme } => assert_eq!(scheme, "ftp"),
            other => panic!("Expected UnsupportedScheme, got: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_missing_host() {
        let err = resolve("http:///only/path").unwrap_err();
        assert!(matches!(
            err,
            HttpError::InvalidUri {
                kind: InvalidUriKind::MissingAuthority | InvalidUriKind::ParseError,
                ..
            }
        ));
    }

    #[test]
    fn test_resolve_malformed() {
        let err = resolve("http://exa mple.com/").unwrap_err();
        assert!(matches!(
            err,
            HttpError::InvalidUri {
                kind: InvalidUriKind::ParseError,
                ..
            }
        ));
    }

    #[test]
    fn test_target_url_round_trip() {
        let t = resolve("https://example.com:8443/a?b=c").unwrap();
        assert_eq!(t.url(), "https://example.com:8443/a?b=c");
        assert_eq!(resolve(&t.url()).unwrap(), t);
    }

    #[test]
    fn test_resolve_location_absolute() {
        let base = target(Scheme::Https, "a.example.com", "/x");
        assert_eq!(
            resolve_location(&base, "http://b.example.com/y").unwrap(),
            "http://b.example.com/y"
        );
    }

    #[test]
    fn test_resolve_location_relative() {
        let base = target(Scheme::Http, "example.com:8080", "/docs/intro?x=1");

        assert_eq!(
            resolve_location(&base, "/login").unwrap(),
            "http://example.com:8080/login"
        );
        assert_eq!(
            resolve_location(&base, "next?page=2").unwrap(),
            "http://example.com:8080/docs/next?page=2"
        );
        assert_eq!(
            resolve_location(&base, "//cdn.example.com/asset").unwrap(),
            "http://cdn.example.com/asset"
        );
    }

    #[test]
    fn test_resolve_location_relative_with_url_in_query() {
        let base = target(Scheme::Http, "example.com", "/start");
        let next = resolve_location(&base, "/login?next=https://example.com/back").unwrap();

        assert_eq!(next, "http://example.com/login?next=https://example.com/back");
        assert_eq!(
            resolve(&next).unwrap(),
            target(Scheme::Http, "example.com", "/login?next=https://example.com/back")
        );
    }

    #[test]
    fn test_resolve_location_absolute_other_scheme() {
        let base = target(Scheme::Https, "example.com", "/x");
        let next = resolve_location(&base, "ftp://files.example.com/pub").unwrap();
        assert!(matches!(
            resolve(&next),
            Err(HttpError::UnsupportedScheme { ref scheme }) if scheme == "ftp"
        ));
    }
}
