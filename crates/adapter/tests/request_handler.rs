//! Request handler behaviour across body acquisition and completion paths.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use adapter::{
    response_channel, BodyError, BodyReader, Completion, ExtensionHandler, Invocation,
    JsonBodyReader, RawBody, RequestHandler, ResponseWriter, ResultAdapter, TransportError,
    TransportRequest, WireResponse,
};
use async_trait::async_trait;
use extensibility::{CompilerConfig, ExtensibilityPointType, UserError};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

/// Delegates to [`JsonBodyReader`] and counts how often it was asked to read.
#[derive(Default)]
struct CountingReader {
    reads: AtomicUsize,
}

#[async_trait]
impl BodyReader for CountingReader {
    async fn read_json(&self, raw: RawBody) -> Result<Value, BodyError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        JsonBodyReader::new(1024).read_json(raw).await
    }
}

/// Completes twice from a spawned task; only the first call may be observed.
struct CompletesTwice;

#[async_trait]
impl ExtensionHandler for CompletesTwice {
    fn point(&self) -> ExtensibilityPointType {
        ExtensibilityPointType::PreUserRegistration
    }

    async fn invoke(&self, _: Invocation, completion: Completion) {
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            completion.succeed_with(vec![json!("first"), json!(1)]);
            completion.error(UserError::server("second"));
        });
    }
}

/// Echoes the request body.
struct Echo;

#[async_trait]
impl ExtensionHandler for Echo {
    fn point(&self) -> ExtensibilityPointType {
        ExtensibilityPointType::PostUserRegistration
    }

    async fn invoke(&self, invocation: Invocation, completion: Completion) {
        completion.succeed(&invocation.body);
    }
}

/// Always fails to write.
struct BrokenWriter;

impl ResponseWriter for BrokenWriter {
    fn write_response(self: Box<Self>, _: WireResponse) -> Result<(), TransportError> {
        Err(TransportError::Closed)
    }
}

fn handler_with(
    extension: impl ExtensionHandler + 'static,
    reader: Arc<dyn BodyReader>,
    adapter: ResultAdapter,
) -> RequestHandler {
    RequestHandler::new(
        Arc::new(extension),
        reader,
        adapter,
        Arc::new(CompilerConfig::default()),
    )
}

#[tokio::test]
async fn test_raw_body_is_read_exactly_once() {
    let reader = Arc::new(CountingReader::default());
    let handler = handler_with(Echo, reader.clone(), ResultAdapter::default());

    let request =
        TransportRequest::new("POST").with_raw_body(Cursor::new(br#"{"user":{}}"#.to_vec()));
    handler.respond(request).await;
    assert_eq!(reader.reads.load(Ordering::SeqCst), 1);

    handler
        .respond(TransportRequest::new("POST").with_body(json!({})))
        .await;
    handler.respond(TransportRequest::new("HEAD")).await;
    assert_eq!(reader.reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_custom_bodyless_methods() {
    let reader = Arc::new(CountingReader::default());
    let config = CompilerConfig {
        bodyless_methods: vec!["DELETE".to_string()],
        ..CompilerConfig::default()
    };
    let handler = RequestHandler::new(
        Arc::new(Echo),
        reader.clone(),
        ResultAdapter::default(),
        Arc::new(config),
    );

    let request = TransportRequest::new("DELETE").with_raw_body(Cursor::new(b"{}".to_vec()));
    let response = handler.respond(request).await;

    assert_eq!(reader.reads.load(Ordering::SeqCst), 0);
    let envelope: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(envelope["data"], Value::Null);
}

#[tokio::test]
async fn test_second_completion_is_ignored() {
    let handler = handler_with(
        CompletesTwice,
        Arc::new(JsonBodyReader::new(1024)),
        ResultAdapter::named(["token", "ttl"]),
    );

    let (writer, receiver) = response_channel();
    handler
        .handle(TransportRequest::new("POST"), Box::new(writer))
        .await;

    let response = receiver.await.unwrap();
    let envelope: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(
        envelope,
        json!({
            "statusCode": 200,
            "headers": { "Content-Type": "application/json" },
            "status": "success",
            "data": { "token": "first", "ttl": 1 }
        })
    );
}

#[tokio::test]
async fn test_write_failure_does_not_panic() {
    let handler = handler_with(Echo, Arc::new(JsonBodyReader::new(1024)), ResultAdapter::default());
    handler
        .handle(TransportRequest::new("POST"), Box::new(BrokenWriter))
        .await;
}

#[tokio::test]
async fn test_oversized_raw_body_is_rejected() {
    let handler = handler_with(Echo, Arc::new(JsonBodyReader::new(8)), ResultAdapter::default());
    let request =
        TransportRequest::new("POST").with_raw_body(Cursor::new(br#"{"user":{"name":"x"}}"#.to_vec()));

    let response = handler.respond(request).await;
    let envelope: Value = serde_json::from_str(&response.body).unwrap();

    assert_eq!(envelope["status"], "error");
    assert_eq!(
        envelope["data"]["message"],
        "Request body exceeds the limit of 8 bytes"
    );
}
