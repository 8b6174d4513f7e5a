//! Extensibility-point compilers.
//!
//! A *compiler* binds an author's user function to one point's payload
//! schema and the bearer gate, and hands back a [`adapter::RequestHandler`]
//! that a host transport can call directly.
//!
//! ```ignore
//! use compilers::{CompilerRegistry, ExtensionFunction};
//! use extensibility::{CompilerConfig, ExtensibilityPointType, Secrets};
//!
//! let registry = CompilerRegistry::new(CompilerConfig::default(), Secrets::new())?;
//! let handler = registry.compile(
//!     ExtensibilityPointType::PostChangePassword,
//!     ExtensionFunction::post_change_password(|(user, _context), done| {
//!         done.succeed(&user);
//!         async {}
//!     }),
//! )?;
//! ```
//!
//! ## Architectural Layer
//!
//! **Orchestration.** Sequences the gate, the schemas of the
//! [`extensibility`] crate and the user function. Transport concerns stay in
//! [`adapter`].

pub mod errors;
pub mod function;
pub mod handler;
pub mod registry;

pub use errors::CompileError;
pub use function::{BoxFuture, ExtensionFunction, UserFunction};
pub use handler::CompiledHandler;
pub use registry::CompilerRegistry;
