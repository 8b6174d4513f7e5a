//! Error taxonomy for extensibility-point invocations.
//!
//! [`ExtensibilityError`] covers every way an invocation can fail: payload
//! validation, authentication, errors handed to the completion callback by the
//! extension author, serialisation failures, body acquisition failures, and an
//! extension that never completes. All of them end up in the same single
//! error-envelope write.
//!
//! Every error kind declares the properties it contributes to the envelope's
//! `data` object. [`ExtensibilityError::properties`] copies them in a fixed
//! order: `name` (omitted for the generic error), `message`, the kind's
//! declared fields, then properties attached by the extension author.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::{JsonObject, ValidationError};

/// Fallback message for errors whose message is empty.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Message of the authentication failure produced by the bearer gate.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized extensibility point";

// ---------------------------------------------------------------------------
// Lookup errors
// ---------------------------------------------------------------------------

/// An extensibility point name that is not in [`crate::ExtensibilityPointType::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown extensibility point: {name}")]
pub struct UnknownPointType {
    /// The name that failed to resolve.
    pub name: String,
}

/// An error property whose value could not be encoded as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct UnencodableProperty {
    /// Key of the offending property.
    pub property: String,
    /// The JSON encoder's failure message.
    pub message: String,
}

// ---------------------------------------------------------------------------
// Author-raised errors
// ---------------------------------------------------------------------------

/// The kinds of error an extension author can pass to the completion callback.
///
/// Each kind fixes the `name` reported on the wire and any extra fields it
/// carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserErrorKind {
    /// A plain error: only `message` is reported.
    Generic,
    /// The request is malformed from the point's perspective.
    InvalidRequest,
    /// The requested scope cannot be granted.
    InvalidScope,
    /// The extension failed for reasons outside the caller's control.
    Server,
    /// The phone message could not be sent; `friendly_message` is safe to
    /// show to the end user.
    SendPhoneMessage { friendly_message: String },
    /// An author-defined error subtype reported under its own name.
    Named(String),
}

impl UserErrorKind {
    /// Wire name of this kind, or `None` for [`UserErrorKind::Generic`].
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Generic => None,
            Self::InvalidRequest => Some("InvalidRequestError"),
            Self::InvalidScope => Some("InvalidScopeError"),
            Self::Server => Some("ServerError"),
            Self::SendPhoneMessage { .. } => Some("SendPhoneMessageError"),
            Self::Named(name) => Some(name.as_str()),
        }
    }
}

/// An error passed to the completion callback by the extension author.
///
/// Additional properties attached with [`UserError::with_property`] are
/// encoded immediately; an encoding failure is remembered and reported when
/// the envelope is built.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct UserError {
    kind: UserErrorKind,
    message: String,
    properties: Vec<(String, Result<Value, String>)>,
}

impl UserError {
    fn with_kind(kind: UserErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind,
            message: if message.is_empty() {
                UNKNOWN_ERROR_MESSAGE.to_string()
            } else {
                message
            },
            properties: Vec::new(),
        }
    }

    /// A generic error carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_kind(UserErrorKind::Generic, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::with_kind(UserErrorKind::InvalidRequest, message)
    }

    pub fn invalid_scope(message: impl Into<String>) -> Self {
        Self::with_kind(UserErrorKind::InvalidScope, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::with_kind(UserErrorKind::Server, message)
    }

    /// A send-phone-message failure with a user-facing message.
    pub fn send_phone_message(
        message: impl Into<String>,
        friendly_message: impl Into<String>,
    ) -> Self {
        Self::with_kind(
            UserErrorKind::SendPhoneMessage {
                friendly_message: friendly_message.into(),
            },
            message,
        )
    }

    /// An author-defined error subtype reported as `name`.
    pub fn named(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_kind(UserErrorKind::Named(name.into()), message)
    }

    /// Coerces an arbitrary JSON value into a generic error.
    ///
    /// Objects with a non-empty string `message` use it; strings are used
    /// verbatim; everything else uses its JSON text. Empty results fall back
    /// to [`UNKNOWN_ERROR_MESSAGE`].
    pub fn from_value(value: &Value) -> Self {
        let message = match value {
            Value::Object(map) => match map.get("message") {
                Some(Value::String(m)) if !m.is_empty() => m.clone(),
                _ => value.to_string(),
            },
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        Self::new(message)
    }

    /// Attaches an extra property reported in the envelope's `data`.
    ///
    /// Properties named `name` or `message` are ignored; those are owned by
    /// the error kind.
    pub fn with_property<T: Serialize + ?Sized>(mut self, key: impl Into<String>, value: &T) -> Self {
        let key = key.into();
        if key == "name" || key == "message" {
            return self;
        }
        let encoded = serde_json::to_value(value).map_err(|e| e.to_string());
        self.properties.retain(|(existing, _)| *existing != key);
        self.properties.push((key, encoded));
        self
    }

    pub fn kind(&self) -> &UserErrorKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn properties(&self) -> Result<JsonObject, UnencodableProperty> {
        let mut data = named_message(self.kind.name(), &self.message);

        if let UserErrorKind::SendPhoneMessage { friendly_message } = &self.kind {
            data.insert(
                "friendlyMessage".to_string(),
                Value::String(friendly_message.clone()),
            );
        }

        for (key, value) in &self.properties {
            match value {
                Ok(v) => {
                    data.insert(key.clone(), v.clone());
                }
                Err(message) => {
                    return Err(UnencodableProperty {
                        property: key.clone(),
                        message: message.clone(),
                    })
                }
            }
        }

        Ok(data)
    }
}

impl From<&str> for UserError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for UserError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<Value> for UserError {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

// ---------------------------------------------------------------------------
// Invocation errors
// ---------------------------------------------------------------------------

/// Every failure an invocation can produce.
///
/// None of these escape the request handler; each is converted into an error
/// envelope by the adapter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtensibilityError {
    /// The request body does not match the point's schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The bearer credential is missing or does not match the configured secret.
    #[error("{message}")]
    Authentication { message: String },

    /// The extension author passed an error to the completion callback.
    #[error(transparent)]
    User(#[from] UserError),

    /// An error or result could not be encoded as JSON.
    #[error("{message}")]
    Serialization { message: String },

    /// The raw request body could not be read or decoded.
    #[error("{message}")]
    Body { message: String },

    /// Every completion handle was dropped without being invoked.
    #[error("Extension point completed without invoking its callback")]
    Incomplete,
}

impl ExtensibilityError {
    /// The authentication failure produced by the bearer gate.
    pub fn unauthorized() -> Self {
        Self::Authentication {
            message: UNAUTHORIZED_MESSAGE.to_string(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    pub fn body(message: impl Into<String>) -> Self {
        Self::Body {
            message: message.into(),
        }
    }

    /// Wire name reported in `data.name`, if this kind declares one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Authentication { .. } => Some("AuthenticationError"),
            Self::User(err) => err.kind.name(),
            Self::Validation(_)
            | Self::Serialization { .. }
            | Self::Body { .. }
            | Self::Incomplete => None,
        }
    }

    /// Builds the `data` object of this error's envelope.
    ///
    /// Fails only when an author-attached property could not be encoded.
    pub fn properties(&self) -> Result<JsonObject, UnencodableProperty> {
        match self {
            Self::User(err) => err.properties(),
            other => Ok(named_message(other.name(), &other.to_string())),
        }
    }
}

fn named_message(name: Option<&str>, message: &str) -> JsonObject {
    let mut data = JsonObject::new();
    if let Some(name) = name {
        data.insert("name".to_string(), Value::String(name.to_string()));
    }
    data.insert("message".to_string(), Value::String(message.to_string()));
    data
}
