//! Gateway configuration types and defaults.

use crate::commands::CommandSettings;
use crate::scheduler::ShutdownPolicy;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Configuration for the admin gateway listener and its commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// The socket address the admin listener binds to
    pub bind_address: SocketAddr,

    /// Shared secret expected in the `password` parameter.
    /// An empty value disables the check entirely.
    pub access_password: String,

    /// Optional prefix stripped from wire method names
    pub method_prefix: String,

    /// Warning period handed to regions on `restart_region`
    pub restart_grace_secs: u64,

    /// Delay before a `shutdown` with any mode other than `delayed` takes effect
    pub immediate_grace_ms: u64,

    /// How overlapping delayed shutdowns interact
    pub shutdown_policy: ShutdownPolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 9000)),
            access_password: String::new(),
            method_prefix: "admin_".to_string(),
            restart_grace_secs: 30,
            immediate_grace_ms: 2000,
            shutdown_policy: ShutdownPolicy::default(),
        }
    }
}

impl GatewayConfig {
    pub fn command_settings(&self) -> CommandSettings {
        CommandSettings {
            restart_grace: Duration::from_secs(self.restart_grace_secs),
            immediate_shutdown_grace: Duration::from_millis(self.immediate_grace_ms),
        }
    }
}
