//! Domain identifiers.
//!
//! Every concept with an identity is a distinct type: the closed set of
//! extensibility points is an enum, per-invocation identities are UUID
//! newtypes, and secret keys are non-empty string newtypes. This prevents
//! accidentally passing, for example, a header name where a secret key is
//! expected.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::UnknownPointType;

// ---------------------------------------------------------------------------
// Extensibility point types
// ---------------------------------------------------------------------------

/// The closed set of extensibility points this workspace knows how to compile.
///
/// The wire name (`as_str`, `Display`, serde) is the kebab-case identifier the
/// host platform uses to select a compiler, e.g. `"send-phone-message"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtensibilityPointType {
    /// Customises access tokens issued by the client-credentials grant.
    ClientCredentialsExchange,
    /// Delivers an out-of-band verification message by SMS or voice.
    SendPhoneMessage,
    /// Runs before a user is created; may attach metadata to the new user.
    PreUserRegistration,
    /// Runs after a user has been created.
    PostUserRegistration,
    /// Runs after a user has changed their password.
    PostChangePassword,
}

impl ExtensibilityPointType {
    /// Every known point, in a stable order.
    pub const ALL: [ExtensibilityPointType; 5] = [
        ExtensibilityPointType::ClientCredentialsExchange,
        ExtensibilityPointType::SendPhoneMessage,
        ExtensibilityPointType::PreUserRegistration,
        ExtensibilityPointType::PostUserRegistration,
        ExtensibilityPointType::PostChangePassword,
    ];

    /// Returns the wire name of this point.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClientCredentialsExchange => "client-credentials-exchange",
            Self::SendPhoneMessage => "send-phone-message",
            Self::PreUserRegistration => "pre-user-registration",
            Self::PostUserRegistration => "post-user-registration",
            Self::PostChangePassword => "post-change-password",
        }
    }
}

impl std::fmt::Display for ExtensibilityPointType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtensibilityPointType {
    type Err = UnknownPointType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|point| point.as_str() == s)
            .ok_or_else(|| UnknownPointType {
                name: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Invocation identity
// ---------------------------------------------------------------------------

/// Identifies a single invocation of a compiled extension.
///
/// Generated fresh for every request; carried in the webtask metadata handed
/// to the user function and recorded on the `invocation` tracing span so all
/// activity from one request can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// A fresh v4 identity for one request.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Secret keys
// ---------------------------------------------------------------------------

/// Key under which a configuration secret is stored (e.g. `"auth0-extension-secret"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecretName(pub(crate) String);

impl SecretName {
    /// Creates a new secret name, returning `None` if the value is empty.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.is_empty() {
            None
        } else {
            Some(Self(v))
        }
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SecretName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "secret name must not be empty".to_string())
    }
}

impl From<SecretName> for String {
    fn from(value: SecretName) -> Self {
        value.0
    }
}

impl std::fmt::Display for SecretName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
