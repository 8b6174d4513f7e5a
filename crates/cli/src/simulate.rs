//! Local simulation of a compiled extensibility point.
//!
//! The built-in extension echoes its arguments as one object keyed by
//! parameter name. Optional arguments the caller left out are omitted.

use std::io::Cursor;
use std::path::Path;

use adapter::{TransportRequest, WireResponse};
use anyhow::{Context, Result};
use compilers::{CompilerRegistry, ExtensionFunction};
use extensibility::{
    CompilerConfig, ContextObject, ExtensibilityPointType, Headers, JsonObject, Secrets,
};
use serde::Deserialize;
use serde_json::Value;

/// A request as written in a simulation file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFile {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: Headers,
    /// Body handed over already decoded.
    #[serde(default)]
    pub body: Option<Value>,
    /// Body handed over as raw text; used only when `body` is absent.
    #[serde(default)]
    pub raw_body: Option<String>,
}

fn default_method() -> String {
    "POST".to_string()
}

impl RequestFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid request file {}", path.display()))
    }

    fn into_transport(self) -> TransportRequest {
        let mut request = TransportRequest::new(self.method).with_headers(self.headers);
        if let Some(body) = self.body {
            request = request.with_body(body);
        }
        if let Some(raw) = self.raw_body {
            request = request.with_raw_body(Cursor::new(raw.into_bytes()));
        }
        request
    }
}

/// One-line description of a point: `name(param, ..., callback) arity=N`.
pub fn describe(point: ExtensibilityPointType) -> String {
    let mut parameters = point.parameters().to_vec();
    parameters.push("callback");
    format!("{point}({}) arity={}", parameters.join(", "), point.arity())
}

/// Keys `values` by the parameter names of `point`; absent values are omitted.
fn echo_object(point: ExtensibilityPointType, values: Vec<Option<Value>>) -> Value {
    Value::Object(
        point
            .parameters()
            .iter()
            .zip(values)
            .filter_map(|(name, value)| value.map(|value| (name.to_string(), value)))
            .collect(),
    )
}

/// An extension for `point` that completes with its arguments keyed by name.
pub fn echo_extension(point: ExtensibilityPointType) -> ExtensionFunction {
    match point {
        ExtensibilityPointType::ClientCredentialsExchange => {
            ExtensionFunction::client_credentials_exchange(
                move |(client, scope, audience, context), done| {
                    done.succeed(&echo_object(
                        point,
                        vec![
                            Some(Value::Object(client)),
                            scope.map(Value::Array),
                            Some(Value::String(audience)),
                            Some(context.into()),
                        ],
                    ));
                    async {}
                },
            )
        }
        ExtensibilityPointType::SendPhoneMessage => {
            ExtensionFunction::send_phone_message(move |(recipient, text, context), done| {
                done.succeed(&echo_object(
                    point,
                    vec![
                        Some(Value::String(recipient)),
                        Some(Value::String(text)),
                        Some(context.into()),
                    ],
                ));
                async {}
            })
        }
        ExtensibilityPointType::PreUserRegistration => {
            ExtensionFunction::pre_user_registration(move |(user, context), done| {
                done.succeed(&echo_object(point, user_values(user, context)));
                async {}
            })
        }
        ExtensibilityPointType::PostUserRegistration => {
            ExtensionFunction::post_user_registration(move |(user, context), done| {
                done.succeed(&echo_object(point, user_values(user, context)));
                async {}
            })
        }
        ExtensibilityPointType::PostChangePassword => {
            ExtensionFunction::post_change_password(move |(user, context), done| {
                done.succeed(&echo_object(point, user_values(user, context)));
                async {}
            })
        }
    }
}

fn user_values(user: JsonObject, context: ContextObject) -> Vec<Option<Value>> {
    vec![Some(Value::Object(user)), Some(context.into())]
}

/// Compiles the echo extension for `point` and runs `request` through it.
pub async fn run(
    point: ExtensibilityPointType,
    config: CompilerConfig,
    secrets: Secrets,
    request: RequestFile,
) -> Result<WireResponse> {
    let handler = CompilerRegistry::new(config, secrets)?.compile(point, echo_extension(point))?;
    Ok(handler.respond(request.into_transport()).await)
}
