//! Compiler configuration.
//!
//! Produced at load time by the composition root; a registry never starts with
//! an invalid configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::SecretName;

/// Secret key that guards every authenticated extensibility point by default.
pub const DEFAULT_SECRET_KEY: &str = "auth0-extension-secret";

/// Default upper bound for a raw request body read from the transport (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Errors produced while validating a [`CompilerConfig`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Configuration error: maxBodyBytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("Configuration error: bodyless method names must not be empty")]
    EmptyMethod,
}

/// Settings shared by every compiled handler of a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerConfig {
    /// Name of the secret whose presence turns on bearer authentication.
    pub secret_key: SecretName,

    /// Request methods that never carry a body; body acquisition is skipped.
    ///
    /// Compared case-sensitively against the transport method.
    pub bodyless_methods: Vec<String>,

    /// Largest raw body, in bytes, the default body reader accepts.
    pub max_body_bytes: usize,
}

impl CompilerConfig {
    /// Returns `true` if requests with `method` skip body acquisition.
    pub fn is_bodyless(&self, method: &str) -> bool {
        self.bodyless_methods.iter().any(|m| m == method)
    }

    /// Checks the invariants a registry relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::ZeroBodyLimit);
        }
        if self.bodyless_methods.iter().any(String::is_empty) {
            return Err(ConfigError::EmptyMethod);
        }
        Ok(())
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            secret_key: SecretName(DEFAULT_SECRET_KEY.to_string()),
            bodyless_methods: ["GET", "HEAD", "OPTIONS"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}
