//! Admin command handlers.
//!
//! Each handler validates its own parameters and talks to the host
//! collaborators. Authorization has already been checked by the dispatcher
//! when `handle` runs.

use crate::error::CommandFailure;
use crate::host::HostServices;
use crate::request::CommandRequest;
use crate::response::ResponseBuilder;
use crate::scheduler::DeferredActionScheduler;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub mod operator;
pub mod region;
pub mod scene;
pub mod user;

pub use operator::{Broadcast, Shutdown};
pub use region::{CreateRegion, RestartRegion};
pub use scene::{LoadHeightmap, LoadXml};
pub use user::CreateUser;

/// Tunables used by the handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSettings {
    /// Warning period given to a region before it restarts
    pub restart_grace: Duration,
    /// Delay before shutdown when the caller does not ask for a delayed one
    pub immediate_shutdown_grace: Duration,
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            restart_grace: Duration::from_secs(30),
            immediate_shutdown_grace: Duration::from_millis(2000),
        }
    }
}

/// State shared by every handler invocation.
#[derive(Clone)]
pub struct CommandContext {
    pub services: HostServices,
    pub scheduler: DeferredActionScheduler,
    pub settings: CommandSettings,
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// The exact command name this handler answers to.
    fn name(&self) -> &'static str;

    /// Fields added to the response when the command fails after
    /// authorization, unless the failure already set them.
    fn failure_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }

    async fn handle(&self, ctx: &CommandContext, request: &CommandRequest) -> Result<ResponseBuilder, CommandFailure>;
}

/// The fixed command set exposed by the gateway.
pub fn standard_commands() -> Vec<Arc<dyn CommandHandler>> {
    vec![
        Arc::new(CreateRegion),
        Arc::new(RestartRegion),
        Arc::new(Broadcast),
        Arc::new(Shutdown),
        Arc::new(LoadHeightmap),
        Arc::new(CreateUser),
        Arc::new(LoadXml),
    ]
}
