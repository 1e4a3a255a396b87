//! Scene content commands: `load_heightmap` and `load_xml`.

use super::{CommandContext, CommandHandler};
use crate::error::CommandFailure;
use crate::host::{RegionId, Vector3};
use crate::request::CommandRequest;
use crate::response::{fields, ResponseBuilder};
use async_trait::async_trait;
use tracing::{info, warn};

/// Looks up the target region for a terrain load.
///
/// Terrain loading itself is not wired into the host yet: once the region is
/// found the command reports success without touching its terrain.
pub struct LoadHeightmap;

#[async_trait]
impl CommandHandler for LoadHeightmap {
    fn name(&self) -> &'static str {
        "load_heightmap"
    }

    fn failure_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[(fields::SUCCESS, "false")]
    }

    async fn handle(&self, ctx: &CommandContext, request: &CommandRequest) -> Result<ResponseBuilder, CommandFailure> {
        request.require_present(&["filename", "regionid"])?;
        let filename = request.require_text("filename")?;
        let raw_id = request.require_text("regionid")?;
        let region_id = RegionId::parse(&raw_id).map_err(|e| CommandFailure::invalid("regionid", e))?;

        info!("🏔️ Terrain loading: {}", filename);

        match ctx.services.regions.lookup_by_id(region_id).await {
            Some(region) => {
                warn!(
                    "🚧 Heightmap loading is not implemented; '{}' was not applied to region {}",
                    filename,
                    region.name()
                );
                Ok(ResponseBuilder::accepted().flag(fields::SUCCESS, true))
            }
            None => Err(CommandFailure::collaborator(format!(
                "unable to get a scene with id {region_id}"
            ))),
        }
    }
}

/// Loads a scene snapshot into a named region.
///
/// The target region is resolved per call and passed to the loader
/// explicitly, so concurrent loads into different regions do not interfere.
/// `switched` and `loaded` are reported independently.
pub struct LoadXml;

#[async_trait]
impl CommandHandler for LoadXml {
    fn name(&self) -> &'static str {
        "load_xml"
    }

    fn failure_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[(fields::SWITCHED, "false"), (fields::LOADED, "false")]
    }

    async fn handle(&self, ctx: &CommandContext, request: &CommandRequest) -> Result<ResponseBuilder, CommandFailure> {
        request.require_present(&["region_name", "filename"])?;
        let region_name = request.require_text("region_name")?;
        let filename = request.require_text("filename")?;

        let target = ctx
            .services
            .scenes
            .select_scene(&region_name)
            .await
            .ok_or_else(|| CommandFailure::collaborator(format!("failed to switch to region {region_name}")))?;
        info!("🎯 Switched to region {}", region_name);

        ctx.services
            .scenes
            .load_snapshot(&target, &filename, Vector3::ORIGIN)
            .await
            .map_err(|e| CommandFailure::collaborator(e).with_field(fields::SWITCHED, "true"))?;
        info!("📦 Loaded '{}' into region {}", filename, region_name);

        Ok(ResponseBuilder::accepted()
            .flag(fields::SWITCHED, true)
            .flag(fields::LOADED, true))
    }
}
