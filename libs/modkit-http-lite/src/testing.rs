//! Scripted in-memory transport for unit tests.

use crate::error::HttpError;
use crate::target::Target;
use crate::transport::{Connection, RawResponse, Transport};
use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;
use http::header::{self, HeaderMap, HeaderValue};
use http::{Method, Request, StatusCode};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// What the next opened connection does when asked to exchange.
pub enum Step {
    Respond(RawResponse),
    Fail,
}

/// A request as the scripted connection received it.
#[derive(Debug, Clone)]
pub struct Sent {
    pub target: Target,
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Default)]
pub struct Log {
    pub connects: usize,
    pub closes: usize,
    pub sent: Vec<Sent>,
}

/// Transport that replays a fixed script, one step per connection.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<Step>>>,
    pub log: Arc<Mutex<Log>>,
}

impl ScriptedTransport {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            script: Arc::new(Mutex::new(steps.into())),
            log: Arc::default(),
        }
    }

    pub fn connects(&self) -> usize {
        self.log.lock().unwrap().connects
    }

    pub fn closes(&self) -> usize {
        self.log.lock().unwrap().closes
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.log.lock().unwrap().sent.clone()
    }
}

impl Transport for ScriptedTransport {
    type Connection = ScriptedConnection;

    fn connect(&self, target: &Target) -> Result<ScriptedConnection, HttpError> {
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("script exhausted: unexpected extra connection");
        self.log.lock().unwrap().connects += 1;
        Ok(ScriptedConnection {
            target: target.clone(),
            step: Some(step),
            log: Arc::clone(&self.log),
        })
    }
}

pub struct ScriptedConnection {
    target: Target,
    step: Option<Step>,
    log: Arc<Mutex<Log>>,
}

impl Connection for ScriptedConnection {
    fn exchange(
        &mut self,
        request: Request<Bytes>,
        _max_body_size: usize,
    ) -> Result<RawResponse, HttpError> {
        let (parts, body) = request.into_parts();
        self.log.lock().unwrap().sent.push(Sent {
            target: self.target.clone(),
            method: parts.method,
            uri: parts.uri.to_string(),
            headers: parts.headers,
            body,
        });

        match self.step.take().expect("exchange called twice on one connection") {
            Step::Respond(raw) => Ok(raw),
            Step::Fail => Err(HttpError::Transport("connection reset by peer".into())),
        }
    }

    fn close(self) {
        self.log.lock().unwrap().closes += 1;
    }
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// 200-style response with a gzip body
pub fn gzipped(status: u16, text: &str) -> Step {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
    Step::Respond(RawResponse {
        status: StatusCode::from_u16(status).unwrap(),
        headers,
        body: Bytes::from(gzip(text.as_bytes())),
    })
}

/// Response with no `Content-Encoding`
pub fn plain(status: u16, text: &'static str) -> Step {
    Step::Respond(RawResponse {
        status: StatusCode::from_u16(status).unwrap(),
        headers: HeaderMap::new(),
        body: Bytes::from_static(text.as_bytes()),
    })
}

/// Redirect with a `Location` header and an empty gzip body
pub fn redirect(status: u16, location: &'static str) -> Step {
    let mut headers = HeaderMap::new();
    headers.insert(header::LOCATION, HeaderValue::from_static(location));
    headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
    Step::Respond(RawResponse {
        status: StatusCode::from_u16(status).unwrap(),
        headers,
        body: Bytes::from(gzip(b"")),
    })
}
