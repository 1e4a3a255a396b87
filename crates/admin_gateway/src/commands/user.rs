//! User provisioning: `create_user`.

use super::{CommandContext, CommandHandler};
use crate::error::CommandFailure;
use crate::host::{GridLocation, UserAccountDescriptor};
use crate::request::CommandRequest;
use crate::response::{fields, ResponseBuilder};
use async_trait::async_trait;
use tracing::info;

const CREATE_USER_REQUIRED: [&str; 5] = [
    "user_firstname",
    "user_lastname",
    "user_password",
    "start_region_x",
    "start_region_y",
];

const NIL_AVATAR: &str = "00000000-0000-0000-0000-000000000000";

/// Provisions a user account. Duplicate names are left to the provisioner,
/// which refuses them by returning the nil id.
pub struct CreateUser;

#[async_trait]
impl CommandHandler for CreateUser {
    fn name(&self) -> &'static str {
        "create_user"
    }

    fn failure_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[(fields::SUCCESS, "false"), (fields::AVATAR_UUID, NIL_AVATAR)]
    }

    async fn handle(&self, ctx: &CommandContext, request: &CommandRequest) -> Result<ResponseBuilder, CommandFailure> {
        request.require_present(&CREATE_USER_REQUIRED)?;

        let account = UserAccountDescriptor {
            first_name: request.require_text("user_firstname")?,
            last_name: request.require_text("user_lastname")?,
            password: request.require_text("user_password")?,
            start_location: GridLocation {
                x: request.require_u32("start_region_x")?,
                y: request.require_u32("start_region_y")?,
            },
        };
        let first_name = account.first_name.clone();
        let last_name = account.last_name.clone();

        let avatar = ctx
            .services
            .users
            .create_user(account)
            .await
            .map_err(CommandFailure::collaborator)?;

        if avatar.is_nil() {
            return Err(CommandFailure::collaborator(format!(
                "failed to create new user {first_name} {last_name}"
            )));
        }

        info!("👤 User {} {} created, UUID {}", first_name, last_name, avatar);
        Ok(ResponseBuilder::accepted()
            .flag(fields::SUCCESS, true)
            .field(fields::AVATAR_UUID, avatar.to_string()))
    }
}
