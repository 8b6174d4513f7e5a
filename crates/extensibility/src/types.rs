//! Shared value types for the extensibility-point domain.
//!
//! Unlike the identifiers in [`crate::identifiers`], these types carry request
//! data: headers and secrets supplied by the host, and the context object that
//! every user function receives as its last positional argument.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ExtensibilityPointType, InvocationId, SecretName};

/// A decoded JSON object.
pub type JsonObject = serde_json::Map<String, Value>;

// ---------------------------------------------------------------------------
// Headers
// ---------------------------------------------------------------------------

/// Request headers, keyed by lower-cased header name.
///
/// Lookups are case-insensitive; the host may supply `Authorization` or
/// `authorization` interchangeably.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>")]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    /// Name of the header carrying the bearer credential.
    pub const AUTHORIZATION: &'static str = "authorization";

    /// Creates an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a header, replacing any previous value with the same name.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Returns the value of the named header, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns the token of an `Authorization: Bearer <token>` header.
    pub fn bearer_token(&self) -> Option<&str> {
        self.get(Self::AUTHORIZATION)?.strip_prefix("Bearer ")
    }

    /// Returns a copy of these headers without the named header.
    pub fn without(&self, name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        Self(
            self.0
                .iter()
                .filter(|(key, _)| **key != name)
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    /// Iterates over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, String>> for Headers {
    fn from(map: BTreeMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

// ---------------------------------------------------------------------------
// Secrets
// ---------------------------------------------------------------------------

/// Configuration secrets made available to a compiled extension.
///
/// Values are never printed by `Debug`; only the secret names are shown.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secrets(BTreeMap<String, String>);

impl Secrets {
    /// Creates an empty secret set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a secret, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Returns the secret stored under `name`.
    pub fn get(&self, name: &SecretName) -> Option<&str> {
        self.0.get(name.as_str()).map(String::as_str)
    }

    /// Returns a copy without the named secret.
    pub fn without(&self, name: &SecretName) -> Self {
        let mut copy = self.clone();
        copy.0.remove(name.as_str());
        copy
    }

    /// Merges `other` into `self`; entries in `other` win.
    pub fn merge(&mut self, other: Secrets) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Secrets {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Moment a request was received, serialized as RFC 3339 UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// ---------------------------------------------------------------------------
// Webtask metadata
// ---------------------------------------------------------------------------

/// Description of the current invocation, injected into every context object
/// under [`ContextObject::WEBTASK_KEY`].
///
/// `headers` never contains the `authorization` header and `secrets` never
/// contains the secret that guards the point; both are stripped before the
/// metadata is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebtaskMetadata {
    pub invocation_id: InvocationId,
    pub received_at: Timestamp,
    pub extensibility_point: ExtensibilityPointType,
    pub method: String,
    pub headers: Headers,
    pub secrets: Secrets,
}

impl WebtaskMetadata {
    /// Builds the metadata for one invocation.
    pub fn new(
        extensibility_point: ExtensibilityPointType,
        method: impl Into<String>,
        headers: &Headers,
        secrets: &Secrets,
        guard_secret: &SecretName,
    ) -> Self {
        Self {
            invocation_id: InvocationId::new_random(),
            received_at: Timestamp::now(),
            extensibility_point,
            method: method.into(),
            headers: headers.without(Headers::AUTHORIZATION),
            secrets: secrets.without(guard_secret),
        }
    }

    /// Encodes the metadata as the JSON value stored on the context object.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

// ---------------------------------------------------------------------------
// Context object
// ---------------------------------------------------------------------------

/// The mutable record handed to every user function as its last positional
/// argument.
///
/// Built from `body.context` (or an empty object when absent) and always
/// annotated with the invocation's webtask metadata. The user function may
/// read, mutate or delete any field, including `webtask`; those changes are
/// visible if the function returns the context as part of its result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextObject(JsonObject);

impl ContextObject {
    /// Key under which the webtask metadata is stored.
    pub const WEBTASK_KEY: &'static str = "webtask";

    /// Wraps `fields` and injects `webtask` under [`Self::WEBTASK_KEY`].
    ///
    /// A caller-supplied `webtask` field is overwritten.
    pub fn new(mut fields: JsonObject, webtask: Value) -> Self {
        fields.insert(Self::WEBTASK_KEY.to_string(), webtask);
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the injected webtask metadata, unless the user function removed it.
    pub fn webtask(&self) -> Option<&Value> {
        self.0.get(Self::WEBTASK_KEY)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_object(&self) -> &JsonObject {
        &self.0
    }

    pub fn into_object(self) -> JsonObject {
        self.0
    }
}

impl From<ContextObject> for Value {
    fn from(context: ContextObject) -> Self {
        Value::Object(context.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn guard() -> SecretName {
        SecretName::new("auth0-extension-secret").unwrap()
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let headers: Headers = [("Authorization", "Bearer foo"), ("X-Trace", "1")]
            .into_iter()
            .collect();

        assert_eq!(headers.get("authorization"), Some("Bearer foo"));
        assert_eq!(headers.get("x-trace"), Some("1"));
        assert_eq!(headers.bearer_token(), Some("foo"));
    }

    #[test]
    fn test_headers_deserialize_lowercases_names() {
        let headers: Headers = serde_json::from_value(json!({ "Content-Type": "a" })).unwrap();
        assert_eq!(headers.get("content-type"), Some("a"));
        assert_eq!(headers.iter().next(), Some(("content-type", "a")));
    }

    #[test]
    fn test_bearer_token_requires_scheme() {
        let headers: Headers = [("authorization", "Basic foo")].into_iter().collect();
        assert_eq!(headers.bearer_token(), None);
        assert_eq!(Headers::new().bearer_token(), None);
    }

    #[test]
    fn test_secrets_debug_hides_values() {
        let secrets: Secrets = [("api-key", "hunter2")].into_iter().collect();
        let printed = format!("{secrets:?}");
        assert!(printed.contains("api-key"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_webtask_metadata_strips_credentials() {
        let headers: Headers = [("authorization", "Bearer foo"), ("host", "example")]
            .into_iter()
            .collect();
        let secrets: Secrets = [("auth0-extension-secret", "foo"), ("API_KEY", "bar")]
            .into_iter()
            .collect();

        let metadata = WebtaskMetadata::new(
            ExtensibilityPointType::PostChangePassword,
            "POST",
            &headers,
            &secrets,
            &guard(),
        );

        assert_eq!(metadata.headers.get("authorization"), None);
        assert_eq!(metadata.headers.get("host"), Some("example"));
        assert_eq!(metadata.secrets.get(&guard()), None);
        assert_eq!(metadata.secrets.len(), 1);

        let value = metadata.to_value().unwrap();
        assert_eq!(value["extensibilityPoint"], "post-change-password");
        assert_eq!(value["secrets"]["API_KEY"], "bar");
    }

    #[test]
    fn test_context_object_injects_webtask() {
        let mut fields = JsonObject::new();
        fields.insert("hello".into(), json!("world"));
        fields.insert("webtask".into(), json!("spoofed"));

        let mut context = ContextObject::new(fields, json!({ "method": "POST" }));
        assert_eq!(context.len(), 2);
        assert_eq!(context.webtask(), Some(&json!({ "method": "POST" })));

        context.remove(ContextObject::WEBTASK_KEY);
        assert_eq!(Value::from(context), json!({ "hello": "world" }));
    }
}
