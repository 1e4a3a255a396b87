//! Operator-wide commands: `broadcast` and `shutdown`.

use super::{CommandContext, CommandHandler};
use crate::error::CommandFailure;
use crate::host::broadcast_to_all;
use crate::request::CommandRequest;
use crate::response::ResponseBuilder;
use crate::scheduler::DeferredAction;
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

/// Sends an operator message to every active region.
pub struct Broadcast;

#[async_trait]
impl CommandHandler for Broadcast {
    fn name(&self) -> &'static str {
        "broadcast"
    }

    async fn handle(&self, ctx: &CommandContext, request: &CommandRequest) -> Result<ResponseBuilder, CommandFailure> {
        let message = request.require_text("message")?;
        info!("📢 Broadcasting: {}", message);

        let reached = broadcast_to_all(ctx.services.regions.as_ref(), &message).await;
        info!("📢 Broadcast delivered to {} region(s)", reached);

        Ok(ResponseBuilder::accepted())
    }
}

/// Schedules a host shutdown and returns immediately.
///
/// `shutdown="delayed"` waits for the caller's `milliseconds`; any other
/// value uses the short fixed grace period.
pub struct Shutdown;

impl Shutdown {
    fn action(ctx: &CommandContext, request: &CommandRequest) -> Result<DeferredAction, CommandFailure> {
        let mode = request.require_text("shutdown")?;
        if mode == "delayed" {
            let millis = request.require_u64("milliseconds")?;
            Ok(DeferredAction {
                delay: Duration::from_millis(millis),
                warning: format!(
                    "Region is going down in {} second(s). Please save what you are doing and log out.",
                    millis / 1000
                ),
            })
        } else {
            Ok(DeferredAction {
                delay: ctx.settings.immediate_shutdown_grace,
                warning: "Region is going down now.".to_string(),
            })
        }
    }
}

#[async_trait]
impl CommandHandler for Shutdown {
    fn name(&self) -> &'static str {
        "shutdown"
    }

    async fn handle(&self, ctx: &CommandContext, request: &CommandRequest) -> Result<ResponseBuilder, CommandFailure> {
        let action = Self::action(ctx, request)?;
        info!("🛑 Received shutdown administrator request ({:?} delay)", action.delay);

        ctx.scheduler.schedule(action).await;
        Ok(ResponseBuilder::accepted())
    }
}
