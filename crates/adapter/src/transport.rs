//! Transport collaborator interfaces.
//!
//! The host owns the raw request and response objects. This module only
//! describes what the adapter needs from them: the method, headers, an
//! optional pre-parsed body or raw byte stream on the way in, and a single
//! write primitive on the way out.

use std::collections::BTreeMap;

use extensibility::{Headers, JSON_CONTENT_TYPE};
use serde_json::Value;
use thiserror::Error;
use tokio::io::AsyncRead;
use tokio::sync::oneshot;

/// A raw request body stream.
pub type RawBody = Box<dyn AsyncRead + Send + Unpin>;

/// Errors reported by a [`ResponseWriter`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// The receiving side went away before the response was delivered.
    #[error("Transport closed before the response was written")]
    Closed,

    /// I/O error while writing the response.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// One inbound request as handed over by the host.
pub struct TransportRequest {
    pub method: String,
    pub headers: Headers,
    /// Body already decoded by the host, if any.
    pub body: Option<Value>,
    /// Raw body stream, read only when no decoded body is present.
    pub raw_body: Option<RawBody>,
}

impl TransportRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            headers: Headers::new(),
            body: None,
            raw_body: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Supplies a body the host has already decoded.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Supplies an undecoded body stream.
    pub fn with_raw_body(mut self, raw: impl AsyncRead + Send + Unpin + 'static) -> Self {
        self.raw_body = Some(Box::new(raw));
        self
    }
}

impl std::fmt::Debug for TransportRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportRequest")
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("raw_body", &self.raw_body.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// The single response written for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    /// JSON-encoded envelope.
    pub body: String,
}

impl WireResponse {
    /// A JSON response with the given status and encoded body.
    pub fn json(status_code: u16, body: String) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string());
        Self {
            status_code,
            headers,
            body,
        }
    }
}

/// The host's write-response primitive.
///
/// Writing consumes the writer, so every request is answered at most once.
pub trait ResponseWriter: Send {
    fn write_response(self: Box<Self>, response: WireResponse) -> Result<(), TransportError>;
}

/// A [`ResponseWriter`] that hands the response to a oneshot receiver.
#[derive(Debug)]
pub struct ChannelResponseWriter {
    sender: oneshot::Sender<WireResponse>,
}

/// Creates a writer together with the receiver that observes its single write.
pub fn response_channel() -> (ChannelResponseWriter, oneshot::Receiver<WireResponse>) {
    let (sender, receiver) = oneshot::channel();
    (ChannelResponseWriter { sender }, receiver)
}

impl ResponseWriter for ChannelResponseWriter {
    fn write_response(self: Box<Self>, response: WireResponse) -> Result<(), TransportError> {
        self.sender
            .send(response)
            .map_err(|_| TransportError::Closed)
    }
}
