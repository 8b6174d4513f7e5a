//! Construction-time failures.

use extensibility::{ConfigError, ExtensibilityPointType, UnknownPointType};
use thiserror::Error;

/// Reasons a user function cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The function was written for a different point than the one requested.
    #[error("Cannot compile a {actual} function as {expected}")]
    PointMismatch {
        expected: ExtensibilityPointType,
        actual: ExtensibilityPointType,
    },

    #[error(transparent)]
    UnknownPoint(#[from] UnknownPointType),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
