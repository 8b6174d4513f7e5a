//! Payload schemas, one per extensibility point.
//!
//! A schema turns a decoded request body into the positional argument tuple
//! its user function expects. The tuple always ends with the
//! [`ContextObject`], built from `body.context` and annotated with the
//! invocation's webtask metadata.
//!
//! | Point | Positional parameters |
//! |-------|-----------------------|
//! | `client-credentials-exchange` | `client, scope, audience, context` |
//! | `send-phone-message` | `recipient, text, context` |
//! | `pre-user-registration` | `user, context` |
//! | `post-user-registration` | `user, context` |
//! | `post-change-password` | `user, context` |

use serde_json::Value;

use crate::validation::FieldAccess;
use crate::{ContextObject, ExtensibilityPointType, JsonObject, ValidationError};

mod client_credentials_exchange;
mod send_phone_message;
mod user_lifecycle;

pub use client_credentials_exchange::{ClientCredentialsArgs, ClientCredentialsExchange};
pub use send_phone_message::{SendPhoneMessage, SendPhoneMessageArgs, ACTIONS, MESSAGE_TYPES};
pub use user_lifecycle::{
    PostChangePassword, PostUserRegistration, PreUserRegistration, UserLifecycleArgs,
};

/// The validation contract of one extensibility point.
pub trait PointSchema: Send + Sync + 'static {
    /// The positional argument tuple handed to the user function.
    type Args: Send + 'static;

    /// Which point this schema describes.
    const POINT: ExtensibilityPointType;

    /// Names of the positional parameters, in order, excluding the completion callback.
    const PARAMETERS: &'static [&'static str];

    /// Whether the bearer gate applies when the guarding secret is configured.
    const AUTHENTICATED: bool = true;

    /// Validates `body` and builds the argument tuple.
    ///
    /// `webtask` is injected into the context object.
    fn validate(body: &Value, webtask: Value) -> Result<Self::Args, ValidationError>;

    /// Declared arity of the user function: the parameters plus the completion callback.
    fn arity() -> usize {
        Self::PARAMETERS.len() + 1
    }
}

impl ExtensibilityPointType {
    /// Positional parameter names of this point's user function.
    pub fn parameters(self) -> &'static [&'static str] {
        match self {
            Self::ClientCredentialsExchange => ClientCredentialsExchange::PARAMETERS,
            Self::SendPhoneMessage => SendPhoneMessage::PARAMETERS,
            Self::PreUserRegistration => PreUserRegistration::PARAMETERS,
            Self::PostUserRegistration => PostUserRegistration::PARAMETERS,
            Self::PostChangePassword => PostChangePassword::PARAMETERS,
        }
    }

    /// Declared arity of this point's user function, completion included.
    pub fn arity(self) -> usize {
        self.parameters().len() + 1
    }

    /// Whether this point is guarded by the bearer gate.
    pub fn requires_authentication(self) -> bool {
        match self {
            Self::ClientCredentialsExchange => ClientCredentialsExchange::AUTHENTICATED,
            Self::SendPhoneMessage => SendPhoneMessage::AUTHENTICATED,
            Self::PreUserRegistration => PreUserRegistration::AUTHENTICATED,
            Self::PostUserRegistration => PostUserRegistration::AUTHENTICATED,
            Self::PostChangePassword => PostChangePassword::AUTHENTICATED,
        }
    }
}

/// Builds the context object from `body.context`, defaulting to `{}`.
pub(crate) fn context_object<'a>(
    fields: &impl FieldAccess<'a>,
    webtask: Value,
) -> Result<ContextObject, ValidationError> {
    let context = fields
        .optional_object("context")?
        .map(|c| c.to_object())
        .unwrap_or_else(JsonObject::new);
    Ok(ContextObject::new(context, webtask))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_counts_the_completion() {
        assert_eq!(ExtensibilityPointType::ClientCredentialsExchange.arity(), 5);
        assert_eq!(ExtensibilityPointType::SendPhoneMessage.arity(), 4);
        assert_eq!(ExtensibilityPointType::PostChangePassword.arity(), 3);
        assert_eq!(SendPhoneMessage::arity(), 4);
    }

    #[test]
    fn test_context_is_always_the_last_parameter() {
        for point in ExtensibilityPointType::ALL {
            assert_eq!(point.parameters().last(), Some(&"context"));
            assert!(point.requires_authentication());
        }
    }
}
