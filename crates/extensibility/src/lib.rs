//! Extensibility-point domain.
//!
//! An *extensibility point* is a named customisation hook exposed by a host
//! platform and backed by a short, user-authored callback-style function. This
//! crate describes everything that is true of those hooks independent of how
//! requests arrive or how responses leave: which points exist, what payload
//! each one accepts, how a payload becomes the positional argument tuple the
//! user function receives, and what the uniform wire envelope looks like.
//!
//! ## Architectural Layer
//!
//! **Business logic.** This crate has no I/O dependencies. The `adapter`
//! crate supplies transports, body reading and envelope serialisation; the
//! `compilers` crate binds user functions to the schemas defined here.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | [`ExtensibilityPointType`], [`InvocationId`], [`SecretName`] |
//! | [`types`] | Headers, secrets, the context object and webtask metadata |
//! | [`config`] | [`CompilerConfig`] |
//! | [`errors`] | [`ExtensibilityError`] taxonomy and [`UserError`] kinds |
//! | [`validation`] | Shared payload validation engine |
//! | [`points`] | One payload schema per extensibility point |
//! | [`envelope`] | Success and error wire envelopes |

pub mod config;
pub mod envelope;
pub mod errors;
pub mod identifiers;
pub mod points;
pub mod types;
pub mod validation;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use config::{CompilerConfig, ConfigError, DEFAULT_SECRET_KEY};
pub use envelope::{
    EnvelopeStatus, ErrorEnvelope, SuccessEnvelope, JSON_CONTENT_TYPE, SUCCESS_STATUS_CODE,
};
pub use errors::{
    ExtensibilityError, UnencodableProperty, UnknownPointType, UserError, UserErrorKind,
    UNAUTHORIZED_MESSAGE, UNKNOWN_ERROR_MESSAGE,
};
pub use identifiers::{ExtensibilityPointType, InvocationId, SecretName};
pub use points::{
    ClientCredentialsArgs, ClientCredentialsExchange, PointSchema, PostChangePassword,
    PostUserRegistration, PreUserRegistration, SendPhoneMessage, SendPhoneMessageArgs,
    UserLifecycleArgs,
};
pub use types::{ContextObject, Headers, JsonObject, Secrets, Timestamp, WebtaskMetadata};
pub use validation::{FieldAccess, Fields, NestedFields, Shape, ValidationError};
