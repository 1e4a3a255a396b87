//! Core gateway server implementation.
//!
//! `GatewayServer` owns the command dispatcher and the WebSocket accept loop.
//! It holds no host state of its own; every command goes through the
//! collaborators passed in at construction.

use crate::{
    auth::AuthorizationGuard,
    commands::CommandContext,
    config::GatewayConfig,
    dispatcher::CommandDispatcher,
    error::GatewayError,
    host::HostServices,
    messaging::MessageRouter,
    scheduler::DeferredActionScheduler,
    server::handlers::handle_connection,
    shutdown::ShutdownState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// The remote administration server.
///
/// Built once at startup: the dispatch table is validated in [`GatewayServer::new`]
/// and stays fixed for the lifetime of the process.
pub struct GatewayServer {
    config: GatewayConfig,
    router: Arc<MessageRouter>,
}

impl GatewayServer {
    /// Creates a gateway with the standard command set wired to `services`.
    ///
    /// Fails only if the dispatch table cannot be built.
    pub fn new(config: GatewayConfig, services: HostServices) -> Result<Self, GatewayError> {
        let guard = AuthorizationGuard::new(config.access_password.clone());
        if guard.is_open() {
            warn!("🔓 No admin access password configured - every request will be authorized");
        }

        let context = CommandContext {
            scheduler: DeferredActionScheduler::new(&services, config.shutdown_policy),
            services,
            settings: config.command_settings(),
        };
        let dispatcher = CommandDispatcher::with_standard_commands(guard, context)?;
        debug!("🔧 Admin commands available: {:?}", dispatcher.commands());

        let router = Arc::new(MessageRouter::new(Arc::new(dispatcher), config.method_prefix.clone()));
        Ok(Self { config, router })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Arc<CommandDispatcher> {
        self.router.dispatcher()
    }

    /// Binds the configured address.
    pub async fn listen(&self) -> Result<TcpListener, GatewayError> {
        TcpListener::bind(self.config.bind_address)
            .await
            .map_err(|e| GatewayError::Network(format!("Failed to bind {}: {e}", self.config.bind_address)))
    }

    /// Binds and serves until `shutdown_state` is initiated.
    pub async fn start_with_shutdown_state(&self, shutdown_state: ShutdownState) -> Result<(), GatewayError> {
        let listener = self.listen().await?;
        self.serve(listener, shutdown_state).await
    }

    /// Runs the accept loop on an already bound listener.
    pub async fn serve(&self, listener: TcpListener, shutdown_state: ShutdownState) -> Result<(), GatewayError> {
        let local_addr: Option<SocketAddr> = listener.local_addr().ok();
        match local_addr {
            Some(addr) => info!("🚀 Remote admin gateway listening on {}", addr),
            None => info!("🚀 Remote admin gateway listening on {}", self.config.bind_address),
        }

        loop {
            if shutdown_state.is_shutdown_initiated() {
                break;
            }

            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let router = self.router.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, addr, router).await {
                                error!("Admin connection error: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept admin connection: {}", e);
                        return Err(GatewayError::Network(e.to_string()));
                    }
                },
                _ = shutdown_state.wait() => {}
            }
        }

        info!("🛑 Admin accept loop stopping - shutdown initiated");
        Ok(())
    }
}
