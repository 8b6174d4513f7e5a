//! Envelope builders.
//!
//! Both builders always produce a response; encoding failures are folded into
//! a generic error envelope instead of escaping to the transport.

use std::sync::Arc;

use extensibility::{
    ErrorEnvelope, ExtensibilityError, JsonObject, SuccessEnvelope, SUCCESS_STATUS_CODE,
};
use serde_json::Value;
use tracing::warn;

use crate::WireResponse;

/// Prefix of the message reported when an error's properties cannot be encoded.
pub const SERIALIZATION_ERROR_PREFIX: &str = "Error serializing error: ";

/// Message reported when a success result cannot be encoded.
pub const RESULT_SERIALIZATION_MESSAGE: &str =
    "Error when JSON serializing the result of the extension point";

/// Shapes the positional results of a successful completion into `data`.
#[derive(Clone, Default)]
pub enum ResultAdapter {
    /// `data` is the first result; omitted when there is none.
    #[default]
    FirstResult,
    /// Zips results with the given names into an object. Results without a
    /// name are dropped, names without a result are omitted.
    Named(Vec<String>),
    Custom(Arc<dyn Fn(Vec<Value>) -> Option<Value> + Send + Sync>),
}

impl ResultAdapter {
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Named(names.into_iter().map(Into::into).collect())
    }

    pub fn custom(adapter: impl Fn(Vec<Value>) -> Option<Value> + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(adapter))
    }

    pub fn apply(&self, results: Vec<Value>) -> Option<Value> {
        match self {
            Self::FirstResult => results.into_iter().next(),
            Self::Named(names) => Some(Value::Object(
                names.iter().cloned().zip(results).collect::<JsonObject>(),
            )),
            Self::Custom(adapter) => adapter(results),
        }
    }
}

impl std::fmt::Debug for ResultAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstResult => f.write_str("FirstResult"),
            Self::Named(names) => f.debug_tuple("Named").field(names).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Builds the error envelope for `error`.
///
/// If an author-attached property cannot be encoded the envelope reports a
/// generic error prefixed with [`SERIALIZATION_ERROR_PREFIX`] instead.
pub fn error_response(error: &ExtensibilityError) -> WireResponse {
    match error.properties() {
        Ok(data) => encode_error(data),
        Err(failure) => {
            warn!(
                property = %failure.property,
                error = %failure.message,
                "Error property could not be serialised; reporting fallback"
            );
            let fallback = ExtensibilityError::serialization(format!(
                "{SERIALIZATION_ERROR_PREFIX}{}",
                failure.message
            ));
            error_response(&fallback)
        }
    }
}

/// Builds the success envelope for `results`, shaped by `adapter`.
///
/// `Err` carries the encoder message of a result that could not be encoded.
pub fn success_response(
    results: Result<Vec<Value>, String>,
    adapter: &ResultAdapter,
) -> WireResponse {
    let encoded = results.and_then(|values| {
        serde_json::to_string(&SuccessEnvelope::new(adapter.apply(values)))
            .map_err(|e| e.to_string())
    });

    match encoded {
        Ok(body) => WireResponse::json(SUCCESS_STATUS_CODE, body),
        Err(message) => {
            warn!(error = %message, "Extension result could not be serialised");
            error_response(&ExtensibilityError::serialization(
                RESULT_SERIALIZATION_MESSAGE,
            ))
        }
    }
}

fn encode_error(data: JsonObject) -> WireResponse {
    let body = serde_json::to_string(&ErrorEnvelope::new(data)).unwrap_or_else(|e| {
        let message = Value::String(format!("{SERIALIZATION_ERROR_PREFIX}{e}"));
        format!(r#"{{"status":"error","data":{{"message":{message}}}}}"#)
    });
    WireResponse::json(SUCCESS_STATUS_CODE, body)
}
