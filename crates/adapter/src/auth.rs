//! Bearer-secret gate in front of authenticated extensibility points.

use extensibility::{ExtensibilityError, Headers, SecretName, Secrets};
use tracing::debug;

/// Checks the `Authorization: Bearer <token>` header against a configured
/// secret.
///
/// The gate is disabled when no secret was configured; every request passes.
#[derive(Clone, Default)]
pub struct AuthGate {
    expected: Option<String>,
}

impl AuthGate {
    /// Builds a gate from the secret stored under `key`, if any.
    pub fn from_secrets(secrets: &Secrets, key: &SecretName) -> Self {
        Self {
            expected: secrets.get(key).map(str::to_string),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.expected.is_some()
    }

    /// Fails with [`ExtensibilityError::unauthorized`] unless the bearer token
    /// equals the configured secret.
    pub fn check(&self, headers: &Headers) -> Result<(), ExtensibilityError> {
        let Some(expected) = &self.expected else {
            return Ok(());
        };

        match headers.bearer_token() {
            Some(token) if token == expected.as_str() => Ok(()),
            Some(_) => {
                debug!("Bearer token does not match the extension secret");
                Err(ExtensibilityError::unauthorized())
            }
            None => {
                debug!("Request carries no bearer token");
                Err(ExtensibilityError::unauthorized())
            }
        }
    }
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extensibility::{DEFAULT_SECRET_KEY, UNAUTHORIZED_MESSAGE};

    fn gate() -> AuthGate {
        let secrets: Secrets = [(DEFAULT_SECRET_KEY, "foo")].into_iter().collect();
        AuthGate::from_secrets(&secrets, &SecretName::new(DEFAULT_SECRET_KEY).unwrap())
    }

    fn headers(authorization: &str) -> Headers {
        [("Authorization", authorization)].into_iter().collect()
    }

    #[test]
    fn test_matching_token_passes() {
        assert!(gate().check(&headers("Bearer foo")).is_ok());
    }

    #[test]
    fn test_wrong_or_missing_token_is_rejected() {
        for headers in [headers("Bearer bar"), headers("foo"), Headers::new()] {
            let err = gate().check(&headers).unwrap_err();
            assert_eq!(err.to_string(), UNAUTHORIZED_MESSAGE);
            assert_eq!(err.name(), Some("AuthenticationError"));
        }
    }

    #[test]
    fn test_gate_without_secret_is_a_no_op() {
        let gate = AuthGate::from_secrets(
            &Secrets::new(),
            &SecretName::new(DEFAULT_SECRET_KEY).unwrap(),
        );
        assert!(!gate.is_enabled());
        assert!(gate.check(&Headers::new()).is_ok());
        assert!(AuthGate::disabled().check(&headers("Bearer anything")).is_ok());
    }

    #[test]
    fn test_debug_hides_the_secret() {
        let printed = format!("{:?}", gate());
        assert!(!printed.contains("foo"));
        assert!(printed.contains("enabled: true"));
    }
}
