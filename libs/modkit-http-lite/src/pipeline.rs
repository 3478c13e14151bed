//! The request pipeline: one logical call, possibly spanning several hops.
//!
//! Per call: merge headers, prepare the body, then loop over hops. Each hop
//! resolves the URL, opens a fresh connection, exchanges the request and
//! either follows a redirect (budget permitting) or decodes the payload.
//! The connection of every hop is closed exactly once, on every path.

use crate::config::{ClientConfig, is_redirect_status, merge_headers};
use crate::decode::decode_payload;
use crate::error::HttpError;
use crate::response::HttpResponse;
use crate::target::{Target, resolve, resolve_location};
use crate::transport::{Connection, Transport};
use bytes::Bytes;
use http::header::{self, HeaderMap, HeaderValue};
use http::{Method, Request};

/// Everything one logical call carries across its hops.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub url: String,
    /// Caller-supplied headers, merged over the configured defaults
    pub headers: HeaderMap,
    /// Raw body (text already encoded as UTF-8)
    pub body: Option<Bytes>,
    /// Serialized JSON body; takes precedence over `body`
    pub json: Option<Bytes>,
    /// Per-call redirect override
    pub allow_redirects: Option<bool>,
    /// Per-call redirect budget; falls back to the configured one
    pub max_redirects: Option<usize>,
}

impl RequestContext {
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            json: None,
            allow_redirects: None,
            max_redirects: None,
        }
    }
}

/// Headers and body shared by every hop of a call.
fn prepare(config: &ClientConfig, ctx: &mut RequestContext) -> (HeaderMap, Bytes) {
    let mut headers = merge_headers(&config.default_headers, &ctx.headers);
    let body = match ctx.json.take() {
        Some(json) => {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            json
        }
        None => ctx.body.take().unwrap_or_default(),
    };
    (headers, body)
}

fn build_request(
    method: &Method,
    target: &Target,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Request<Bytes>, HttpError> {
    let mut request = Request::builder()
        .method(method.clone())
        .uri(target.path.as_str())
        .body(body)?;
    *request.headers_mut() = headers.clone();
    Ok(request)
}

/// Run one logical call to completion.
///
/// # Errors
/// Any [`HttpError`]: URL resolution, transport, redirect policy
/// (`TooManyRedirects`, `MissingRedirectTarget`) or payload decoding.
pub fn execute<T: Transport>(
    transport: &T,
    config: &ClientConfig,
    mut ctx: RequestContext,
) -> Result<HttpResponse, HttpError> {
    let max_redirects = ctx.max_redirects.unwrap_or(config.max_redirects);
    let follow = config.follows_redirects(ctx.allow_redirects);
    let (headers, body) = prepare(config, &mut ctx);

    let span = tracing::debug_span!("http_request", method = %ctx.method, url = %ctx.url);
    let _guard = span.enter();

    let mut url = ctx.url;
    let mut remaining = max_redirects;

    loop {
        let target = resolve(&url)?;
        let request = build_request(&ctx.method, &target, &headers, body.clone())?;

        let mut conn = transport.connect(&target)?;
        let raw = match conn.exchange(request, config.max_body_size) {
            Ok(raw) => raw,
            Err(e) => {
                conn.close();
                return Err(e);
            }
        };

        tracing::debug!(
            status = raw.status.as_u16(),
            target = %target,
            "received response"
        );

        if is_redirect_status(raw.status) && follow {
            let location = raw.location().map(str::to_owned);
            conn.close();

            let Some(location) = location else {
                tracing::warn!(
                    status = raw.status.as_u16(),
                    target = %target,
                    "redirect response without Location header"
                );
                return Err(HttpError::MissingRedirectTarget { status: raw.status });
            };

            remaining = remaining
                .checked_sub(1)
                .ok_or(HttpError::TooManyRedirects { max: max_redirects })?;

            let next = resolve_location(&target, &location)?;
            tracing::debug!(from = %target, to = %next, remaining, "following redirect");
            url = next;
            continue;
        }

        let payload = decode_payload(
            &raw.body,
            raw.content_encoding(),
            config.encoding_policy,
            config.max_body_size,
        );
        conn.close();

        return Ok(HttpResponse::new(raw.status, headers, payload?));
    }
}
