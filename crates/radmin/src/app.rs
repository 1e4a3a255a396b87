//! Main application logic and lifecycle management.
//!
//! The `Application` owns the in-memory host and, when enabled, the admin
//! gateway in front of it. It runs until a termination signal arrives or an
//! admin `shutdown` command fires.

use crate::{
    cli::CliArgs,
    config::AppConfig,
    logging::display_banner,
    signals::{setup_signal_handlers, wait_for_signal},
};
use admin_gateway::{GatewayServer, ShutdownState};
use sim_host::SimHost;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

pub struct Application {
    config: AppConfig,
    host: Arc<SimHost>,
    gateway: Option<GatewayServer>,
    shutdown_state: ShutdownState,
}

impl Application {
    /// Creates a new application instance.
    ///
    /// 1. Load configuration from file (creating default if missing)
    /// 2. Apply command-line argument overrides
    /// 3. Validate merged configuration
    /// 4. Start the seed regions
    /// 5. Build the admin gateway unless it is disabled
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(bind_address) = args.bind_address {
            config.gateway.bind_address = bind_address;
        }

        if let Some(password) = args.password {
            config.gateway.access_password = password;
        }

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }

        if args.json_logs {
            config.logging.json_format = true;
        }

        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {e}").into());
        }
        info!("✅ Configuration loaded and validated successfully");

        display_banner();

        let shutdown_state = ShutdownState::new();
        let host = SimHost::new(shutdown_state.clone());
        let seeded = host.seed(config.region_seeds()?).await?;
        info!("🌍 Started {} seed region(s)", seeded);

        let gateway = if config.gateway.enabled {
            Some(GatewayServer::new(config.to_gateway_config()?, host.services())?)
        } else {
            info!("🔕 Remote admin gateway disabled by configuration");
            None
        };

        Ok(Self {
            config,
            host,
            gateway,
            shutdown_state,
        })
    }

    pub fn host(&self) -> &Arc<SimHost> {
        &self.host
    }

    pub fn shutdown_state(&self) -> &ShutdownState {
        &self.shutdown_state
    }

    /// Runs until shutdown is initiated, then stops the gateway.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        self.log_configuration_summary();

        let server_handle = self.gateway.map(|gateway| {
            let shutdown_state = self.shutdown_state.clone();
            tokio::spawn(async move {
                match gateway.start_with_shutdown_state(shutdown_state.clone()).await {
                    Ok(()) => info!("✅ Admin gateway completed successfully"),
                    Err(e) => {
                        error!("❌ Admin gateway error: {}", e);
                        shutdown_state.initiate_shutdown();
                    }
                }
            })
        });

        info!("✅ Host is now running with {} region(s)", self.host.region_count());
        info!("🛑 Press Ctrl+C to gracefully shutdown");

        tokio::select! {
            result = setup_signal_handlers(&self.shutdown_state) => result?,
            _ = self.shutdown_state.wait() => {
                info!("🛑 Shutdown initiated by the host");
            }
        }

        // merciless shutdown
        tokio::spawn(async move {
            if let Err(e) = wait_for_signal().await {
                error!("Failed to set up merciless shutdown signal handler: {e}");
                return;
            }

            warn!("Shutdown handler received again! I'll make this quick.");
            std::process::exit(1);
        });

        if let Some(handle) = server_handle {
            info!("⏳ Waiting for the admin gateway to stop...");
            match tokio::time::timeout(Duration::from_secs(8), handle).await {
                Ok(_) => info!("✅ Admin gateway stopped"),
                Err(_) => warn!("⏰ Admin gateway did not stop within timeout, proceeding with shutdown"),
            }
        }

        self.shutdown_state.complete_shutdown();

        info!("📊 Final state: {} region(s) active", self.host.region_count());
        info!("✅ Host shutdown complete");
        Ok(())
    }

    fn log_configuration_summary(&self) {
        info!("📋 Configuration Summary:");
        if self.config.gateway.enabled {
            info!("  🌐 Admin gateway: {}", self.config.gateway.bind_address);
            info!("  🔑 Access password: {}", if self.config.gateway.access_password.is_empty() { "none" } else { "set" });
            info!("  ⏳ Shutdown policy: {}", self.config.gateway.shutdown_policy);
        } else {
            info!("  🌐 Admin gateway: disabled");
        }
        info!("  🌍 Seed regions: {}", self.config.host.regions.len());
    }
}
