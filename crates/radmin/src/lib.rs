//! # radmin - Simulation Host with Remote Administration
//!
//! Runs the in-memory multi-region host and the admin gateway in front of it.
//!
//! ```bash
//! # Run with default configuration
//! radmin
//!
//! # Require a shared secret and listen on all interfaces
//! radmin --bind 0.0.0.0:9000 --password hunter2
//!
//! # JSON logging for production
//! radmin --json-logs --log-level debug
//! ```
//!
//! Configuration is read from a TOML file (default: `config.toml`), which is
//! created with defaults when missing. The host stops on SIGINT/SIGTERM or
//! when an admin `shutdown` command fires.

use tracing::error;

mod app;
mod cli;
mod config;
mod logging;
mod signals;

use app::Application;
use cli::CliArgs;
use config::AppConfig;

/// Entry point called from the binary's `#[tokio::main]`.
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Load configuration to get logging settings
    let config = AppConfig::load_from_file(&args.config_path).await.unwrap_or_default();
    let mut logging_settings = config.logging;
    if let Some(level) = &args.log_level {
        logging_settings.level = level.clone();
    }

    if let Err(e) = logging::setup_logging(&logging_settings, args.json_logs) {
        eprintln!("❌ Failed to setup logging: {e}");
        std::process::exit(1);
    }

    match Application::new(args).await {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("❌ Application error: {:?}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("❌ Failed to start application: {e:?}");
            std::process::exit(1);
        }
    }

    Ok(())
}

pub use config::{GatewaySettings, HostSettings, LoggingSettings, RegionSeed};

#[cfg(test)]
mod tests {
    use super::*;
    use admin_gateway::host::HostControl;
    use std::path::PathBuf;
    use std::time::Duration;

    fn args_for(path: PathBuf) -> CliArgs {
        CliArgs {
            config_path: path,
            bind_address: Some("127.0.0.1:0".to_string()),
            password: Some("hunter2".to_string()),
            log_level: None,
            json_logs: false,
        }
    }

    #[tokio::test]
    async fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());

        let gateway_config = config
            .to_gateway_config()
            .expect("Default config should convert to GatewayConfig");
        assert_eq!(gateway_config.method_prefix, "admin_");
        assert_eq!(gateway_config.immediate_grace_ms, 2000);
        assert_eq!(config.region_seeds().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_application_seeds_regions() {
        let dir = tempfile::tempdir().unwrap();
        let app = Application::new(args_for(dir.path().join("config.toml"))).await.unwrap();

        assert_eq!(app.host().region_count(), 1);
        assert!(dir.path().join("config.toml").exists());
    }

    #[tokio::test]
    async fn test_invalid_override_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args_for(dir.path().join("config.toml"));
        args.bind_address = Some("not an address".to_string());

        assert!(Application::new(args).await.is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_host_shutdown_stops_application() {
        let dir = tempfile::tempdir().unwrap();
        let app = Application::new(args_for(dir.path().join("config.toml"))).await.unwrap();
        let host = app.host().clone();
        let state = app.shutdown_state().clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            HostControl::shutdown(host.as_ref()).await;
        });

        let result = tokio::time::timeout(Duration::from_secs(10), app.run())
            .await
            .expect("application stops after host shutdown");
        assert!(result.is_ok());
        assert!(state.is_shutdown_complete());
    }
}
