//! Factory functions for gateway instances.

use crate::{config::GatewayConfig, error::GatewayError, host::HostServices, server::GatewayServer};

/// Creates a gateway with default configuration.
///
/// The defaults bind `127.0.0.1:9000` with no access password, which is
/// only suitable for local development.
pub fn create_gateway(services: HostServices) -> Result<GatewayServer, GatewayError> {
    GatewayServer::new(GatewayConfig::default(), services)
}

/// Creates a gateway with custom configuration.
///
/// ```rust,ignore
/// let config = GatewayConfig {
///     bind_address: "0.0.0.0:9000".parse()?,
///     access_password: "hunter2".into(),
///     ..Default::default()
/// };
/// let gateway = create_gateway_with_config(config, HostServices::from_host(host))?;
/// ```
pub fn create_gateway_with_config(config: GatewayConfig, services: HostServices) -> Result<GatewayServer, GatewayError> {
    GatewayServer::new(config, services)
}
