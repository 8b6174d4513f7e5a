//! The compiler registry: one entry point per known extensibility point.

use std::collections::BTreeMap;
use std::sync::Arc;

use adapter::{BodyReader, ExtensionHandler, JsonBodyReader, RequestHandler, ResultAdapter};
use extensibility::{
    ClientCredentialsExchange, CompilerConfig, ExtensibilityPointType, PointSchema,
    PostChangePassword, PostUserRegistration, PreUserRegistration, Secrets, SendPhoneMessage,
};
use tracing::info;

use crate::{CompileError, CompiledHandler, ExtensionFunction, UserFunction};

/// Compiles user functions into request handlers.
///
/// Holds what every compiled handler shares: configuration, the secret set,
/// the body reader and per-point result adapters.
#[derive(Clone)]
pub struct CompilerRegistry {
    config: Arc<CompilerConfig>,
    secrets: Arc<Secrets>,
    body_reader: Arc<dyn BodyReader>,
    adapters: BTreeMap<ExtensibilityPointType, ResultAdapter>,
}

impl CompilerRegistry {
    /// Creates a registry with the default [`JsonBodyReader`].
    pub fn new(config: CompilerConfig, secrets: Secrets) -> Result<Self, CompileError> {
        config.validate()?;
        let body_reader = Arc::new(JsonBodyReader::new(config.max_body_bytes));
        Ok(Self {
            config: Arc::new(config),
            secrets: Arc::new(secrets),
            body_reader,
            adapters: BTreeMap::new(),
        })
    }

    /// Replaces the body reader used by every handler compiled afterwards.
    pub fn with_body_reader(mut self, body_reader: Arc<dyn BodyReader>) -> Self {
        self.body_reader = body_reader;
        self
    }

    /// Overrides the result adapter of `point`.
    pub fn with_result_adapter(
        mut self,
        point: ExtensibilityPointType,
        adapter: ResultAdapter,
    ) -> Self {
        self.adapters.insert(point, adapter);
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Every point this registry can compile.
    pub fn points(&self) -> &'static [ExtensibilityPointType] {
        &ExtensibilityPointType::ALL
    }

    /// Compiles `function` for `point` with the point's registered result adapter.
    pub fn compile(
        &self,
        point: ExtensibilityPointType,
        function: ExtensionFunction,
    ) -> Result<RequestHandler, CompileError> {
        let adapter = self.adapters.get(&point).cloned().unwrap_or_default();
        self.compile_with_adapter(point, function, adapter)
    }

    /// Compiles `function` for the point named `name`, e.g. `"send-phone-message"`.
    pub fn compile_named(
        &self,
        name: &str,
        function: ExtensionFunction,
    ) -> Result<RequestHandler, CompileError> {
        self.compile(name.parse()?, function)
    }

    /// Compiles `function` for `point` with an explicit result adapter.
    pub fn compile_with_adapter(
        &self,
        point: ExtensibilityPointType,
        function: ExtensionFunction,
        adapter: ResultAdapter,
    ) -> Result<RequestHandler, CompileError> {
        if function.point() != point {
            return Err(CompileError::PointMismatch {
                expected: point,
                actual: function.point(),
            });
        }

        let handler: Arc<dyn ExtensionHandler> = match function {
            ExtensionFunction::ClientCredentialsExchange(f) => {
                self.bind::<ClientCredentialsExchange>(f)
            }
            ExtensionFunction::SendPhoneMessage(f) => self.bind::<SendPhoneMessage>(f),
            ExtensionFunction::PreUserRegistration(f) => self.bind::<PreUserRegistration>(f),
            ExtensionFunction::PostUserRegistration(f) => self.bind::<PostUserRegistration>(f),
            ExtensionFunction::PostChangePassword(f) => self.bind::<PostChangePassword>(f),
        };

        info!(
            point = %point,
            arity = handler.arity(),
            "Compiled extensibility point"
        );

        Ok(RequestHandler::new(
            handler,
            Arc::clone(&self.body_reader),
            adapter,
            Arc::clone(&self.config),
        ))
    }

    fn bind<P: PointSchema>(
        &self,
        function: Arc<dyn UserFunction<P::Args>>,
    ) -> Arc<dyn ExtensionHandler> {
        Arc::new(CompiledHandler::<P>::new(
            function,
            Arc::clone(&self.secrets),
            self.config.secret_key.clone(),
        ))
    }
}

impl std::fmt::Debug for CompilerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilerRegistry")
            .field("config", &self.config)
            .field("secrets", &self.secrets)
            .field("adapters", &self.adapters)
            .finish()
    }
}
