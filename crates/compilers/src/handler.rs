//! A user function bound to its point's schema.

use std::marker::PhantomData;
use std::sync::Arc;

use adapter::{AuthGate, Completion, ExtensionHandler, Invocation};
use async_trait::async_trait;
use extensibility::{
    ExtensibilityError, ExtensibilityPointType, PointSchema, SecretName, Secrets, WebtaskMetadata,
};
use tracing::debug;

use crate::UserFunction;

/// Runs gate → validation → user function for one point.
///
/// Gate and validation failures are delivered through the completion; the
/// user function is not called.
pub struct CompiledHandler<P: PointSchema> {
    function: Arc<dyn UserFunction<P::Args>>,
    gate: AuthGate,
    secrets: Arc<Secrets>,
    secret_key: SecretName,
    _schema: PhantomData<fn() -> P>,
}

impl<P: PointSchema> CompiledHandler<P> {
    pub fn new(
        function: Arc<dyn UserFunction<P::Args>>,
        secrets: Arc<Secrets>,
        secret_key: SecretName,
    ) -> Self {
        let gate = if P::AUTHENTICATED {
            AuthGate::from_secrets(&secrets, &secret_key)
        } else {
            AuthGate::disabled()
        };

        Self {
            function,
            gate,
            secrets,
            secret_key,
            _schema: PhantomData,
        }
    }
}

#[async_trait]
impl<P: PointSchema> ExtensionHandler for CompiledHandler<P> {
    fn point(&self) -> ExtensibilityPointType {
        P::POINT
    }

    fn parameters(&self) -> &'static [&'static str] {
        P::PARAMETERS
    }

    fn arity(&self) -> usize {
        P::arity()
    }

    async fn invoke(&self, invocation: Invocation, completion: Completion) {
        if let Err(e) = self.gate.check(&invocation.headers) {
            completion.fail(e);
            return;
        }

        let metadata = WebtaskMetadata::new(
            P::POINT,
            invocation.method.as_str(),
            &invocation.headers,
            &self.secrets,
            &self.secret_key,
        );
        debug!(invocation_id = %metadata.invocation_id, "Validating payload");

        let webtask = match metadata.to_value() {
            Ok(webtask) => webtask,
            Err(e) => {
                completion.fail(ExtensibilityError::serialization(e.to_string()));
                return;
            }
        };

        match P::validate(&invocation.body, webtask) {
            Ok(args) => self.function.call(args, completion).await,
            Err(e) => {
                debug!(error = %e, "Payload rejected");
                completion.fail(e);
            }
        }
    }
}

impl<P: PointSchema> std::fmt::Debug for CompiledHandler<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledHandler")
            .field("point", &P::POINT)
            .field("gate", &self.gate)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adapter::{completion, Outcome};
    use extensibility::{PostChangePassword, UserLifecycleArgs, DEFAULT_SECRET_KEY};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn key() -> SecretName {
        SecretName::new(DEFAULT_SECRET_KEY).unwrap()
    }

    fn invocation(authorization: Option<&str>, body: Value) -> Invocation {
        let mut headers = extensibility::Headers::new();
        if let Some(value) = authorization {
            headers.insert("Authorization", value);
        }
        Invocation {
            method: "POST".to_string(),
            headers,
            body,
        }
    }

    fn echo_user(called: Arc<AtomicBool>) -> Arc<dyn UserFunction<UserLifecycleArgs>> {
        Arc::new(move |(user, _context): UserLifecycleArgs, done: Completion| {
            called.store(true, Ordering::SeqCst);
            done.succeed(&user);
            async {}
        })
    }

    #[tokio::test]
    async fn test_gate_runs_before_validation() {
        let called = Arc::new(AtomicBool::new(false));
        let secrets: Secrets = [(DEFAULT_SECRET_KEY, "foo")].into_iter().collect();
        let handler = CompiledHandler::<PostChangePassword>::new(
            echo_user(called.clone()),
            Arc::new(secrets),
            key(),
        );
        let printed = format!("{handler:?}");
        assert!(printed.contains("AuthGate { enabled: true }"));
        assert!(!printed.contains("foo"));

        let (done, pending) = completion();
        handler.invoke(invocation(None, json!("not an object")), done).await;

        match pending.wait().await {
            Outcome::Failure(e) => assert_eq!(e.name(), Some("AuthenticationError")),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_invalid_payload_never_reaches_the_function() {
        let called = Arc::new(AtomicBool::new(false));
        let handler = CompiledHandler::<PostChangePassword>::new(
            echo_user(called.clone()),
            Arc::new(Secrets::new()),
            key(),
        );

        let (done, pending) = completion();
        handler.invoke(invocation(None, json!({ "user": 1 })), done).await;

        match pending.wait().await {
            Outcome::Failure(e) => {
                assert_eq!(e.to_string(), "Body.user received by extensibility point is not an object")
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_valid_payload_calls_the_function() {
        let called = Arc::new(AtomicBool::new(false));
        let secrets: Secrets = [(DEFAULT_SECRET_KEY, "foo")].into_iter().collect();
        let handler = CompiledHandler::<PostChangePassword>::new(
            echo_user(called.clone()),
            Arc::new(secrets),
            key(),
        );

        let (done, pending) = completion();
        handler
            .invoke(invocation(Some("Bearer foo"), json!({ "user": { "id": 7 } })), done)
            .await;

        assert_eq!(pending.wait().await, Outcome::Success(Ok(vec![json!({ "id": 7 })])));
        assert!(called.load(Ordering::SeqCst));
        assert_eq!(handler.arity(), 3);
        assert_eq!(handler.parameters(), ["user", "context"]);
    }
}
