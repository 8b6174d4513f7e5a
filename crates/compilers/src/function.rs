//! User functions and their per-point wrapper.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use adapter::Completion;
use extensibility::{
    ClientCredentialsArgs, ExtensibilityPointType, SendPhoneMessageArgs, UserLifecycleArgs,
};

/// Boxed future returned by a user function.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An author-supplied function taking the positional argument tuple `A` and a
/// completion.
///
/// Implemented for every `Fn(A, Completion) -> impl Future<Output = ()>`.
/// Synchronous functions settle the completion and return `async {}`.
pub trait UserFunction<A>: Send + Sync + 'static {
    fn call(&self, args: A, completion: Completion) -> BoxFuture<'static, ()>;
}

impl<A, F, Fut> UserFunction<A> for F
where
    F: Fn(A, Completion) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn call(&self, args: A, completion: Completion) -> BoxFuture<'static, ()> {
        Box::pin(self(args, completion))
    }
}

/// A user function tagged with the point it was written for.
#[derive(Clone)]
pub enum ExtensionFunction {
    ClientCredentialsExchange(Arc<dyn UserFunction<ClientCredentialsArgs>>),
    SendPhoneMessage(Arc<dyn UserFunction<SendPhoneMessageArgs>>),
    PreUserRegistration(Arc<dyn UserFunction<UserLifecycleArgs>>),
    PostUserRegistration(Arc<dyn UserFunction<UserLifecycleArgs>>),
    PostChangePassword(Arc<dyn UserFunction<UserLifecycleArgs>>),
}

impl ExtensionFunction {
    /// `(client, scope, audience, context, completion)`.
    pub fn client_credentials_exchange<F, Fut>(function: F) -> Self
    where
        F: Fn(ClientCredentialsArgs, Completion) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::ClientCredentialsExchange(Arc::new(function))
    }

    /// `(recipient, text, context, completion)`.
    pub fn send_phone_message<F, Fut>(function: F) -> Self
    where
        F: Fn(SendPhoneMessageArgs, Completion) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::SendPhoneMessage(Arc::new(function))
    }

    /// `(user, context, completion)`.
    pub fn pre_user_registration<F, Fut>(function: F) -> Self
    where
        F: Fn(UserLifecycleArgs, Completion) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::PreUserRegistration(Arc::new(function))
    }

    /// `(user, context, completion)`.
    pub fn post_user_registration<F, Fut>(function: F) -> Self
    where
        F: Fn(UserLifecycleArgs, Completion) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::PostUserRegistration(Arc::new(function))
    }

    /// `(user, context, completion)`.
    pub fn post_change_password<F, Fut>(function: F) -> Self
    where
        F: Fn(UserLifecycleArgs, Completion) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::PostChangePassword(Arc::new(function))
    }

    /// The point this function was written for.
    pub fn point(&self) -> ExtensibilityPointType {
        match self {
            Self::ClientCredentialsExchange(_) => ExtensibilityPointType::ClientCredentialsExchange,
            Self::SendPhoneMessage(_) => ExtensibilityPointType::SendPhoneMessage,
            Self::PreUserRegistration(_) => ExtensibilityPointType::PreUserRegistration,
            Self::PostUserRegistration(_) => ExtensibilityPointType::PostUserRegistration,
            Self::PostChangePassword(_) => ExtensibilityPointType::PostChangePassword,
        }
    }
}

impl std::fmt::Debug for ExtensionFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ExtensionFunction").field(&self.point()).finish()
    }
}
