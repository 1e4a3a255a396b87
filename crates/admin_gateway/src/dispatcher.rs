//! Command dispatch.
//!
//! The dispatch table is built once at startup and rejects duplicate command
//! names eagerly. For every request the dispatcher resolves the handler,
//! runs the [`AuthorizationGuard`], executes the handler on its own task and
//! turns any failure into response fields. Nothing a handler does, including
//! panicking, escapes to the transport.

use crate::auth::AuthorizationGuard;
use crate::commands::{standard_commands, CommandContext, CommandHandler};
use crate::error::{CommandFailure, FailureKind, GatewayError};
use crate::request::CommandRequest;
use crate::response::{fields, CommandResponse, ResponseBuilder};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Collects handlers and validates the dispatch table.
pub struct DispatcherBuilder {
    guard: AuthorizationGuard,
    context: CommandContext,
    handlers: HashMap<&'static str, Arc<dyn CommandHandler>>,
}

impl DispatcherBuilder {
    pub fn register(mut self, handler: Arc<dyn CommandHandler>) -> Result<Self, GatewayError> {
        let name = handler.name();
        if self.handlers.contains_key(name) {
            return Err(GatewayError::DuplicateCommand(name.to_string()));
        }
        debug!("🔧 Registered admin command '{}'", name);
        self.handlers.insert(name, handler);
        Ok(self)
    }

    pub fn register_all(self, handlers: Vec<Arc<dyn CommandHandler>>) -> Result<Self, GatewayError> {
        handlers.into_iter().try_fold(self, |builder, handler| builder.register(handler))
    }

    pub fn build(self) -> CommandDispatcher {
        CommandDispatcher {
            guard: self.guard,
            context: Arc::new(self.context),
            handlers: self.handlers,
        }
    }
}

pub struct CommandDispatcher {
    guard: AuthorizationGuard,
    context: Arc<CommandContext>,
    handlers: HashMap<&'static str, Arc<dyn CommandHandler>>,
}

impl CommandDispatcher {
    pub fn builder(guard: AuthorizationGuard, context: CommandContext) -> DispatcherBuilder {
        DispatcherBuilder {
            guard,
            context,
            handlers: HashMap::new(),
        }
    }

    /// A dispatcher exposing the gateway's fixed command set.
    pub fn with_standard_commands(guard: AuthorizationGuard, context: CommandContext) -> Result<Self, GatewayError> {
        Ok(Self::builder(guard, context)
            .register_all(standard_commands())?
            .build())
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered command names, sorted.
    pub fn commands(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn context(&self) -> &CommandContext {
        &self.context
    }

    /// Runs a request through authorization and its handler.
    ///
    /// Only an unknown command name is an `Err`; every other outcome is a
    /// response.
    pub async fn dispatch(&self, request: &CommandRequest) -> Result<CommandResponse, GatewayError> {
        let handler = self
            .handlers
            .get(request.command())
            .cloned()
            .ok_or_else(|| GatewayError::UnknownCommand(request.command().to_string()))?;

        info!("📥 Received {} administrator request", handler.name());

        let outcome = self.execute(handler.clone(), request).await;
        Ok(match outcome {
            Ok(builder) => builder.build(),
            Err(failure) => Self::render_failure(handler.as_ref(), failure),
        })
    }

    async fn execute(
        &self,
        handler: Arc<dyn CommandHandler>,
        request: &CommandRequest,
    ) -> Result<ResponseBuilder, CommandFailure> {
        if !self.guard.authorize(request) {
            return Err(CommandFailure::authorization());
        }

        let context = self.context.clone();
        let request = request.clone();
        let name = handler.name();
        let task = tokio::spawn(async move { handler.handle(&context, &request).await });

        match task.await {
            Ok(outcome) => outcome,
            Err(join_error) => {
                error!("💥 Handler for '{}' aborted: {}", name, join_error);
                Err(CommandFailure::collaborator(format!("internal error while handling {name}")))
            }
        }
    }

    fn render_failure(handler: &dyn CommandHandler, failure: CommandFailure) -> CommandResponse {
        match failure.kind {
            FailureKind::Authorization => {
                warn!("🔒 Rejected {} request: missing or wrong password", handler.name());
                ResponseBuilder::rejected().build()
            }
            FailureKind::Validation | FailureKind::Collaborator => {
                if failure.kind == FailureKind::Validation {
                    warn!("⚠️ {} request invalid: {}", handler.name(), failure.message);
                } else {
                    error!("❌ {} failed: {}", handler.name(), failure.message);
                }
                ResponseBuilder::accepted()
                    .merge(failure.partial)
                    .defaults(handler.failure_fields())
                    .field(fields::ERROR, failure.message)
                    .build()
            }
        }
    }
}
