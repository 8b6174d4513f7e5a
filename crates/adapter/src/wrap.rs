//! The request handler ("wrap") around a compiled extension.
//!
//! States: **awaiting body** → **dispatched**. Every path ends in exactly one
//! call to the transport's [`ResponseWriter`].

use std::sync::Arc;

use async_trait::async_trait;
use extensibility::{CompilerConfig, ExtensibilityError, ExtensibilityPointType, Headers};
use serde_json::Value;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::{
    completion, error_response, success_response, BodyError, BodyReader, Completion, Outcome,
    RawBody, ResponseWriter, ResultAdapter, TransportRequest, WireResponse,
};

/// A request whose body has been acquired.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub method: String,
    pub headers: Headers,
    pub body: Value,
}

/// A compiled extension, ready to be invoked.
#[async_trait]
pub trait ExtensionHandler: Send + Sync {
    /// The extensibility point this handler serves.
    fn point(&self) -> ExtensibilityPointType;

    /// Positional parameter names of the user function.
    fn parameters(&self) -> &'static [&'static str] {
        self.point().parameters()
    }

    /// Declared arity of the user function, completion included.
    fn arity(&self) -> usize {
        self.parameters().len() + 1
    }

    /// Runs the extension for `invocation`.
    ///
    /// The outcome is reported through `completion`; returning without
    /// settling it, and dropping every clone, reports
    /// [`ExtensibilityError::Incomplete`].
    async fn invoke(&self, invocation: Invocation, completion: Completion);
}

/// Adapts transport requests to an [`ExtensionHandler`].
#[derive(Clone)]
pub struct RequestHandler {
    handler: Arc<dyn ExtensionHandler>,
    body_reader: Arc<dyn BodyReader>,
    adapter: ResultAdapter,
    config: Arc<CompilerConfig>,
}

impl RequestHandler {
    pub fn new(
        handler: Arc<dyn ExtensionHandler>,
        body_reader: Arc<dyn BodyReader>,
        adapter: ResultAdapter,
        config: Arc<CompilerConfig>,
    ) -> Self {
        Self {
            handler,
            body_reader,
            adapter,
            config,
        }
    }

    pub fn point(&self) -> ExtensibilityPointType {
        self.handler.point()
    }

    pub fn parameters(&self) -> &'static [&'static str] {
        self.handler.parameters()
    }

    pub fn arity(&self) -> usize {
        self.handler.arity()
    }

    pub fn result_adapter(&self) -> &ResultAdapter {
        &self.adapter
    }

    /// Handles one request and writes its single response.
    ///
    /// Write failures are logged; the request is considered answered.
    pub async fn handle(&self, request: TransportRequest, writer: Box<dyn ResponseWriter>) {
        let span = info_span!(
            "invocation",
            point = %self.point(),
            method = %request.method,
        );

        async {
            let response = self.respond(request).await;
            let status_code = response.status_code;
            match writer.write_response(response) {
                Ok(()) => info!(status_code, "Response written"),
                Err(e) => error!(error = %e, "Failed to write extension response"),
            }
        }
        .instrument(span)
        .await
    }

    /// Runs one request to completion and returns the response without
    /// writing it.
    pub async fn respond(&self, request: TransportRequest) -> WireResponse {
        let TransportRequest {
            method,
            headers,
            body,
            raw_body,
        } = request;

        let body = match self.acquire_body(&method, body, raw_body).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Request body could not be acquired");
                return error_response(&ExtensibilityError::body(e.to_string()));
            }
        };

        let (completion, pending) = completion();
        let handler = Arc::clone(&self.handler);
        let invocation = Invocation {
            method,
            headers,
            body,
        };

        // The extension keeps running after it completes; its task is detached.
        tokio::spawn(
            async move { handler.invoke(invocation, completion).await }
                .instrument(tracing::Span::current()),
        );

        match pending.wait().await {
            Outcome::Success(results) => success_response(results, &self.adapter),
            Outcome::Failure(e) => {
                debug!(error = %e, "Extension completed with an error");
                error_response(&e)
            }
        }
    }

    async fn acquire_body(
        &self,
        method: &str,
        body: Option<Value>,
        raw_body: Option<RawBody>,
    ) -> Result<Value, BodyError> {
        if let Some(body) = body {
            debug!("Using body parsed by the host");
            return Ok(body);
        }
        if self.config.is_bodyless(method) {
            debug!("Skipping body for bodyless method");
            return Ok(Value::Null);
        }
        match raw_body {
            Some(raw) => self.body_reader.read_json(raw).await,
            None => Ok(Value::Null),
        }
    }
}

impl std::fmt::Debug for RequestHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHandler")
            .field("point", &self.point())
            .field("adapter", &self.adapter)
            .field("config", &self.config)
            .finish()
    }
}
