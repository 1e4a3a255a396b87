//! Region lifecycle commands: `create_region` and `restart_region`.

use super::{CommandContext, CommandHandler};
use crate::error::CommandFailure;
use crate::host::{GridLocation, RegionDescriptor, RegionId};
use crate::request::CommandRequest;
use crate::response::{fields, ResponseBuilder};
use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use tracing::info;

const CREATE_REGION_REQUIRED: [&str; 8] = [
    "region_name",
    "region_x",
    "region_y",
    "region_master_first",
    "region_master_last",
    "listen_ip",
    "listen_port",
    "external_address",
];

/// Creates and starts a new region.
///
/// A caller-supplied `region_id` is used verbatim. It is not checked against
/// existing regions, and neither are the name or listen endpoint; the
/// directory decides what to do with duplicates.
pub struct CreateRegion;

impl CreateRegion {
    fn descriptor(request: &CommandRequest) -> Result<RegionDescriptor, CommandFailure> {
        request.require_present(&CREATE_REGION_REQUIRED)?;

        let region_id = match request.optional_text("region_id").filter(|id| !id.is_empty()) {
            Some(raw) => RegionId::parse(&raw).map_err(|e| CommandFailure::invalid("region_id", e))?,
            None => RegionId::new(),
        };

        let listen_ip: IpAddr = request
            .require_text("listen_ip")?
            .trim()
            .parse()
            .map_err(|e| CommandFailure::invalid("listen_ip", e))?;
        let listen_port = request.require_u16("listen_port")?;

        Ok(RegionDescriptor {
            region_id,
            name: request.require_text("region_name")?,
            location: GridLocation {
                x: request.require_u32("region_x")?,
                y: request.require_u32("region_y")?,
            },
            internal_endpoint: SocketAddr::new(listen_ip, listen_port),
            external_host_name: request.require_text("external_address")?,
            master_first_name: request.require_text("region_master_first")?,
            master_last_name: request.require_text("region_master_last")?,
            datastore: request.optional_text("datastore"),
        })
    }
}

#[async_trait]
impl CommandHandler for CreateRegion {
    fn name(&self) -> &'static str {
        "create_region"
    }

    fn failure_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[(fields::SUCCESS, "false")]
    }

    async fn handle(&self, ctx: &CommandContext, request: &CommandRequest) -> Result<ResponseBuilder, CommandFailure> {
        let descriptor = Self::descriptor(request)?;
        let region_id = descriptor.region_id;
        let region_name = descriptor.name.clone();

        ctx.services
            .regions
            .create(descriptor, true)
            .await
            .map_err(CommandFailure::collaborator)?;

        info!("🌍 Region '{}' created with id {}", region_name, region_id);
        Ok(ResponseBuilder::accepted()
            .flag(fields::SUCCESS, true)
            .field(fields::REGION_UUID, region_id.to_string())
            .field(fields::REGION_NAME, region_name))
    }
}

/// Restarts an existing region. An unknown id is reported as `rebooting=false`, not as an error.
pub struct RestartRegion;

#[async_trait]
impl CommandHandler for RestartRegion {
    fn name(&self) -> &'static str {
        "restart_region"
    }

    fn failure_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[(fields::REBOOTING, "false")]
    }

    async fn handle(&self, ctx: &CommandContext, request: &CommandRequest) -> Result<ResponseBuilder, CommandFailure> {
        let raw_id = request.require_text("regionID")?;
        let region_id = RegionId::parse(&raw_id).map_err(|e| CommandFailure::invalid("regionID", e))?;

        let rebooting = match ctx.services.regions.lookup_by_id(region_id).await {
            Some(region) => {
                info!("🔄 Restarting region {} ({})", region.name(), region_id);
                region.restart(ctx.settings.restart_grace).await;
                true
            }
            None => {
                info!("❔ Restart requested for unknown region {}", region_id);
                false
            }
        };

        Ok(ResponseBuilder::accepted().flag(fields::REBOOTING, rebooting))
    }
}
