//! The uniform wire envelope returned for every request.
//!
//! ```text
//! success: {"statusCode":200,"headers":{"Content-Type":"application/json"},"status":"success","data":...}
//! error:   {"status":"error","data":{...}}
//! ```
//!
//! Field order is part of the contract and follows declaration order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::JsonObject;

/// Status code carried by every success envelope.
pub const SUCCESS_STATUS_CODE: u16 = 200;

/// Content type of every envelope.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Whether the envelope reports a success or an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// Envelope for a completed invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessEnvelope {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub status: EnvelopeStatus,
    /// Output of the result adapter; omitted when the extension produced no result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl SuccessEnvelope {
    pub fn new(data: Option<Value>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string());
        Self {
            status_code: SUCCESS_STATUS_CODE,
            headers,
            status: EnvelopeStatus::Success,
            data,
        }
    }
}

/// Envelope for a failed invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub status: EnvelopeStatus,
    pub data: JsonObject,
}

impl ErrorEnvelope {
    pub fn new(data: JsonObject) -> Self {
        Self {
            status: EnvelopeStatus::Error,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_field_order() {
        let json = serde_json::to_string(&SuccessEnvelope::new(Some(json!({ "a": 1 })))).unwrap();
        assert_eq!(
            json,
            r#"{"statusCode":200,"headers":{"Content-Type":"application/json"},"status":"success","data":{"a":1}}"#
        );
    }

    #[test]
    fn test_success_without_data_omits_the_field() {
        let json = serde_json::to_string(&SuccessEnvelope::new(None)).unwrap();
        assert!(!json.contains("data"));
    }

    #[test]
    fn test_error_envelope_shape() {
        let mut data = JsonObject::new();
        data.insert("message".into(), json!("boom"));
        let json = serde_json::to_string(&ErrorEnvelope::new(data)).unwrap();
        assert_eq!(json, r#"{"status":"error","data":{"message":"boom"}}"#);
    }
}
