//! # Admin Gateway - Remote Administration for a Multi-Region Host
//!
//! A small authenticated command surface that lets an external operator tool
//! drive a running simulation host: create and restart regions, provision
//! user accounts, load scene snapshots, broadcast notices and schedule a
//! host shutdown.
//!
//! The gateway owns no host state. Every command is carried out through the
//! collaborator traits in [`host`], so the same gateway can front the
//! in-memory host used for development or a real one.
//!
//! ## Request flow
//!
//! 1. A client sends a WebSocket text frame `{"method", "params", "id"}`
//! 2. The [`MessageRouter`] strips the method prefix and resolves the command
//! 3. The [`CommandDispatcher`] checks the shared secret
//! 4. The handler runs on its own task and talks to the collaborators
//! 5. The outcome is rendered as a flat map of string fields
//!
//! ## Commands
//!
//! | command          | success fields                              |
//! |------------------|---------------------------------------------|
//! | `create_region`  | `success`, `region_uuid`, `region_name`     |
//! | `restart_region` | `rebooting`                                 |
//! | `broadcast`      | `accepted`                                  |
//! | `shutdown`       | `accepted` (the shutdown itself is deferred)|
//! | `load_heightmap` | `success`                                   |
//! | `create_user`    | `success`, `avatar_uuid`                    |
//! | `load_xml`       | `switched`, `loaded`                        |
//!
//! Every response carries `accepted`. It is `"false"` only when the secret
//! check failed, in which case it is also the only field. Failures after
//! authorization keep `accepted = "true"` and add a free-text `error`.
//!
//! ## Security
//!
//! The secret travels in the request parameters and is compared as plain
//! text. Run the listener on a trusted network or behind a TLS terminator.

pub use auth::AuthorizationGuard;
pub use commands::{CommandContext, CommandHandler, CommandSettings};
pub use config::GatewayConfig;
pub use dispatcher::{CommandDispatcher, DispatcherBuilder};
pub use error::{CommandFailure, FailureKind, GatewayError};
pub use messaging::{MessageRouter, RpcReply, RpcRequest};
pub use request::{CommandRequest, ParamValue};
pub use response::{fields, CommandResponse, ResponseBuilder};
pub use scheduler::{DeferredAction, DeferredActionScheduler, SchedulerState, ShutdownPolicy};
pub use server::GatewayServer;
pub use shutdown::ShutdownState;
pub use utils::{create_gateway, create_gateway_with_config};

pub mod auth;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod messaging;
pub mod request;
pub mod response;
pub mod scheduler;
pub mod server;
pub mod shutdown;
pub mod utils;

#[cfg(test)]
mod testing;
