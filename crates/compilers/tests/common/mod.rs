//! Drives a compiled handler the way a host transport would.

#![allow(dead_code)]

use std::io::Cursor;

use adapter::{response_channel, RequestHandler, TransportRequest};
use compilers::{CompilerRegistry, ExtensionFunction};
use extensibility::{CompilerConfig, ExtensibilityPointType, Secrets, DEFAULT_SECRET_KEY};
use serde_json::Value;

/// One simulated request.
pub struct Simulation {
    pub method: &'static str,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: Value,
    /// When `false` the body is sent as raw bytes for the handler to decode.
    pub parse_body: bool,
}

impl Simulation {
    pub fn post(body: Value) -> Self {
        Self {
            method: "POST",
            headers: Vec::new(),
            body,
            parse_body: true,
        }
    }

    pub fn bearer(mut self, token: &'static str) -> Self {
        self.headers.push(("Authorization", token));
        self
    }

    pub fn raw(mut self) -> Self {
        self.parse_body = false;
        self
    }
}

/// Secrets with the extension secret set to `foo`.
pub fn guarded() -> Secrets {
    [(DEFAULT_SECRET_KEY, "foo")].into_iter().collect()
}

pub fn compile(
    point: ExtensibilityPointType,
    secrets: Secrets,
    function: ExtensionFunction,
) -> RequestHandler {
    CompilerRegistry::new(CompilerConfig::default(), secrets)
        .unwrap()
        .compile(point, function)
        .unwrap()
}

/// Runs `simulation` through `handler` and decodes the written envelope.
pub async fn simulate(handler: &RequestHandler, simulation: Simulation) -> Value {
    let mut request = TransportRequest::new(simulation.method);
    for (name, value) in simulation.headers {
        request = request.with_header(name, value);
    }
    request = if simulation.parse_body {
        request.with_body(simulation.body)
    } else {
        request.with_raw_body(Cursor::new(simulation.body.to_string().into_bytes()))
    };

    let (writer, receiver) = response_channel();
    handler.handle(request, Box::new(writer)).await;

    let response = receiver.await.unwrap();
    assert_eq!(response.status_code, 200);
    assert_eq!(
        response.headers.get("Content-Type").map(String::as_str),
        Some("application/json")
    );
    serde_json::from_str(&response.body).unwrap()
}
