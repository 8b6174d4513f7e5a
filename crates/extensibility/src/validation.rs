//! Shared payload validation engine.
//!
//! Per-point schemas in [`crate::points`] are written against [`Fields`], a
//! view over one JSON object that remembers its dotted path from the body
//! root. Every accessor checks one field and either returns the typed value or
//! a [`ValidationError`] naming the field and the expected [`Shape`].
//!
//! Type checks are strict: a string field must be a JSON string, an object
//! field must be a non-array, non-null object. Optional accessors treat an
//! absent field and an explicit `null` the same way.

use serde_json::Value;
use thiserror::Error;

use crate::JsonObject;

/// Dotted-path name of the body root.
pub const BODY_PATH: &str = "Body";

/// The shape a field was expected to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    String,
    Object,
    Array,
    /// A string restricted to the listed literals.
    OneOf(&'static [&'static str]),
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::String => f.write_str("a string"),
            Shape::Object => f.write_str("an object"),
            Shape::Array => f.write_str("an array"),
            Shape::OneOf(allowed) => {
                let quoted: Vec<String> = allowed.iter().map(|v| format!("`{v}`")).collect();
                f.write_str(&quoted.join(" or "))
            }
        }
    }
}

/// A body field that is missing or has the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path} received by extensibility point is not {expected}")]
pub struct ValidationError {
    /// Dotted path of the field, e.g. `Body.context.client.client_id`.
    pub path: String,
    pub expected: Shape,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, expected: Shape) -> Self {
        Self {
            path: path.into(),
            expected,
        }
    }
}

/// A validated JSON object together with its dotted path.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    path: &'a str,
    object: &'a JsonObject,
}

/// Owned variant returned for nested objects; borrows the parent's data.
#[derive(Debug, Clone)]
pub struct NestedFields<'a> {
    path: String,
    object: &'a JsonObject,
}

impl<'a> Fields<'a> {
    /// Checks that the body itself is an object.
    pub fn body(body: &'a Value) -> Result<Self, ValidationError> {
        match body {
            Value::Object(object) => Ok(Self {
                path: BODY_PATH,
                object,
            }),
            _ => Err(ValidationError::new(BODY_PATH, Shape::Object)),
        }
    }
}

/// Field accessors shared by [`Fields`] and [`NestedFields`].
pub trait FieldAccess<'a> {
    fn path(&self) -> &str;
    fn object(&self) -> &'a JsonObject;

    fn child_path(&self, key: &str) -> String {
        format!("{}.{}", self.path(), key)
    }

    /// Returns the field if it is present and not `null`.
    fn present(&self, key: &str) -> Option<&'a Value> {
        self.object().get(key).filter(|v| !v.is_null())
    }

    /// A required string field.
    fn string(&self, key: &str) -> Result<String, ValidationError> {
        match self.object().get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(ValidationError::new(self.child_path(key), Shape::String)),
        }
    }

    /// An optional string field.
    fn optional_string(&self, key: &str) -> Result<Option<String>, ValidationError> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(ValidationError::new(self.child_path(key), Shape::String)),
        }
    }

    /// A required object field.
    fn object_field(&self, key: &str) -> Result<NestedFields<'a>, ValidationError> {
        match self.object().get(key) {
            Some(Value::Object(object)) => Ok(NestedFields {
                path: self.child_path(key),
                object,
            }),
            _ => Err(ValidationError::new(self.child_path(key), Shape::Object)),
        }
    }

    /// An optional object field.
    fn optional_object(&self, key: &str) -> Result<Option<NestedFields<'a>>, ValidationError> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::Object(object)) => Ok(Some(NestedFields {
                path: self.child_path(key),
                object,
            })),
            Some(_) => Err(ValidationError::new(self.child_path(key), Shape::Object)),
        }
    }

    /// An optional array field.
    fn optional_array(&self, key: &str) -> Result<Option<Vec<Value>>, ValidationError> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items.clone())),
            Some(_) => Err(ValidationError::new(self.child_path(key), Shape::Array)),
        }
    }

    /// A required string restricted to `allowed`.
    fn one_of(
        &self,
        key: &str,
        allowed: &'static [&'static str],
    ) -> Result<&'static str, ValidationError> {
        let value = self.object().get(key).and_then(Value::as_str);
        value
            .and_then(|v| allowed.iter().copied().find(|a| *a == v))
            .ok_or_else(|| ValidationError::new(self.child_path(key), Shape::OneOf(allowed)))
    }
}

impl<'a> FieldAccess<'a> for Fields<'a> {
    fn path(&self) -> &str {
        self.path
    }

    fn object(&self) -> &'a JsonObject {
        self.object
    }
}

impl<'a> FieldAccess<'a> for NestedFields<'a> {
    fn path(&self) -> &str {
        &self.path
    }

    fn object(&self) -> &'a JsonObject {
        self.object
    }
}

impl NestedFields<'_> {
    /// Returns an owned copy of the underlying object.
    pub fn to_object(&self) -> JsonObject {
        self.object.clone()
    }
}
