//! Request adaptation for compiled extensions.
//!
//! Sits between a host transport and a compiled extension handler:
//!
//! 1. **Acquire the body**: skip it for bodyless methods, reuse a body the
//!    host already parsed, or read and decode the raw stream exactly once via
//!    an injected [`BodyReader`].
//! 2. **Dispatch**: invoke the [`ExtensionHandler`] with a one-shot
//!    [`Completion`].
//! 3. **Respond**: turn the first completion outcome into a success or error
//!    envelope and hand it to the [`ResponseWriter`], which is consumed by the
//!    write so a second write cannot be expressed.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport abstractions, body decoding and envelope
//! serialisation live here. Payload schemas and error kinds come from the
//! [`extensibility`] crate; binding user functions to schemas is the job of
//! the `compilers` crate.

pub mod auth;
pub mod body;
pub mod completion;
pub mod envelope;
pub mod transport;
pub mod wrap;

pub use auth::AuthGate;
pub use body::{BodyError, BodyReader, JsonBodyReader};
pub use completion::{completion, Completion, Outcome, PendingOutcome};
pub use envelope::{
    error_response, success_response, ResultAdapter, RESULT_SERIALIZATION_MESSAGE,
    SERIALIZATION_ERROR_PREFIX,
};
pub use transport::{
    response_channel, ChannelResponseWriter, RawBody, ResponseWriter, TransportError,
    TransportRequest, WireResponse,
};
pub use wrap::{ExtensionHandler, Invocation, RequestHandler};
