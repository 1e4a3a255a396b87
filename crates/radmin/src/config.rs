//! Configuration management for the radmin host.
//!
//! This module handles loading, validation, and conversion of the host and
//! admin gateway configuration from TOML files.

use admin_gateway::host::{GridLocation, RegionDescriptor, RegionId};
use admin_gateway::{GatewayConfig, ShutdownPolicy};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tracing::info;

fn default_enabled() -> bool {
    true
}

fn default_method_prefix() -> String {
    "admin_".to_string()
}

fn default_restart_grace_secs() -> u64 {
    30
}

fn default_immediate_grace_ms() -> u64 {
    2000
}

fn default_shutdown_policy() -> String {
    ShutdownPolicy::default().to_string()
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote admin gateway settings
    pub gateway: GatewaySettings,
    /// Logging configuration settings
    pub logging: LoggingSettings,
    /// Regions brought up when the host starts
    #[serde(default)]
    pub host: HostSettings,
}

/// Remote admin gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Whether the admin listener is started at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Network address to bind the admin listener to (e.g., "127.0.0.1:9000")
    pub bind_address: String,
    /// Shared secret required in the `password` parameter; empty disables the check
    #[serde(default)]
    pub access_password: String,
    /// Prefix stripped from wire method names
    #[serde(default = "default_method_prefix")]
    pub method_prefix: String,
    /// Warning period given to a region before `restart_region` takes effect
    #[serde(default = "default_restart_grace_secs")]
    pub restart_grace_secs: u64,
    /// Delay used by `shutdown` when no delayed mode is requested
    #[serde(default = "default_immediate_grace_ms")]
    pub immediate_grace_ms: u64,
    /// "stack" or "replace"
    #[serde(default = "default_shutdown_policy")]
    pub shutdown_policy: String,
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostSettings {
    #[serde(default)]
    pub regions: Vec<RegionSeed>,
}

/// A region created at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionSeed {
    /// Fixed id; a random one is generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub listen_ip: String,
    pub listen_port: u16,
    pub external_address: String,
    pub master_first: String,
    pub master_last: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datastore: Option<String>,
}

impl RegionSeed {
    pub fn to_descriptor(&self) -> Result<RegionDescriptor, Box<dyn std::error::Error>> {
        let region_id = match &self.region_id {
            Some(raw) => RegionId::parse(raw)?,
            None => RegionId::new(),
        };
        let listen_ip: IpAddr = self.listen_ip.parse()?;

        Ok(RegionDescriptor {
            region_id,
            name: self.name.clone(),
            location: GridLocation { x: self.x, y: self.y },
            internal_endpoint: SocketAddr::new(listen_ip, self.listen_port),
            external_host_name: self.external_address.clone(),
            master_first_name: self.master_first.clone(),
            master_last_name: self.master_last.clone(),
            datastore: self.datastore.clone(),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway: GatewaySettings {
                enabled: true,
                bind_address: "127.0.0.1:9000".to_string(),
                access_password: String::new(),
                method_prefix: default_method_prefix(),
                restart_grace_secs: default_restart_grace_secs(),
                immediate_grace_ms: default_immediate_grace_ms(),
                shutdown_policy: default_shutdown_policy(),
            },
            logging: LoggingSettings {
                level: "info".to_string(),
                json_format: false,
            },
            host: HostSettings {
                regions: vec![RegionSeed {
                    region_id: None,
                    name: "Default Region".to_string(),
                    x: 1000,
                    y: 1000,
                    listen_ip: "0.0.0.0".to_string(),
                    listen_port: 9001,
                    external_address: "127.0.0.1".to_string(),
                    master_first: "Default".to_string(),
                    master_last: "Admin".to_string(),
                    datastore: None,
                }],
            },
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, a default configuration is written to
    /// `path` and returned.
    pub async fn load_from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Converts the `[gateway]` section into the gateway's own configuration.
    pub fn to_gateway_config(&self) -> Result<GatewayConfig, Box<dyn std::error::Error>> {
        Ok(GatewayConfig {
            bind_address: self.gateway.bind_address.parse()?,
            access_password: self.gateway.access_password.clone(),
            method_prefix: self.gateway.method_prefix.clone(),
            restart_grace_secs: self.gateway.restart_grace_secs,
            immediate_grace_ms: self.gateway.immediate_grace_ms,
            shutdown_policy: self.gateway.shutdown_policy.parse::<ShutdownPolicy>()?,
        })
    }

    pub fn region_seeds(&self) -> Result<Vec<RegionDescriptor>, Box<dyn std::error::Error>> {
        self.host.regions.iter().map(RegionSeed::to_descriptor).collect()
    }

    /// Validates the configuration for common errors.
    pub fn validate(&self) -> Result<(), String> {
        if self.gateway.bind_address.parse::<SocketAddr>().is_err() {
            return Err(format!("Invalid bind address: {}", &self.gateway.bind_address));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        self.gateway.shutdown_policy.parse::<ShutdownPolicy>()?;

        for seed in &self.host.regions {
            if seed.name.is_empty() {
                return Err("Seed region name cannot be empty".to_string());
            }
            if seed.listen_ip.parse::<IpAddr>().is_err() {
                return Err(format!("Invalid listen_ip for region {}: {}", seed.name, seed.listen_ip));
            }
            if let Some(raw) = &seed.region_id {
                if RegionId::parse(raw).is_err() {
                    return Err(format!("Invalid region_id for region {}: {}", seed.name, raw));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;
    use tokio::fs;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert!(config.gateway.enabled);
        assert_eq!(config.gateway.bind_address, "127.0.0.1:9000");
        assert!(config.gateway.access_password.is_empty());
        assert_eq!(config.gateway.method_prefix, "admin_");
        assert_eq!(config.gateway.restart_grace_secs, 30);
        assert_eq!(config.gateway.immediate_grace_ms, 2000);
        assert_eq!(config.gateway.shutdown_policy, "stack");

        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);
        assert_eq!(config.host.regions.len(), 1);
    }

    #[tokio::test]
    async fn test_load_from_nonexistent_file_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config.gateway.bind_address, "127.0.0.1:9000");
        assert!(path.exists());

        let reloaded = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(reloaded.gateway.bind_address, config.gateway.bind_address);
        assert_eq!(reloaded.host.regions.len(), 1);
        assert_eq!(reloaded.host.regions[0].name, "Default Region");
    }

    #[tokio::test]
    async fn test_load_from_existing_file() {
        let toml_content = r#"
[gateway]
enabled = false
bind_address = "0.0.0.0:9100"
access_password = "hunter2"
shutdown_policy = "replace"

[logging]
level = "debug"
json_format = true

[[host.regions]]
region_id = "6f1c3f8e-3d4b-4a55-9c1e-1f2b3c4d5e6f"
name = "Harbor"
x = 1000
y = 1001
listen_ip = "0.0.0.0"
listen_port = 9001
external_address = "harbor.example.net"
master_first = "Ada"
master_last = "Lovelace"

[[host.regions]]
name = "Ridge"
x = 1001
y = 1001
listen_ip = "0.0.0.0"
listen_port = 9002
external_address = "ridge.example.net"
master_first = "Ada"
master_last = "Lovelace"
datastore = "ridge.db"
"#;

        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), toml_content).await.unwrap();

        let config = AppConfig::load_from_file(&temp_file.path().to_path_buf()).await.unwrap();
        assert!(config.validate().is_ok());

        assert!(!config.gateway.enabled);
        assert_eq!(config.gateway.access_password, "hunter2");
        assert_eq!(config.gateway.method_prefix, "admin_");
        assert_eq!(config.gateway.restart_grace_secs, 30);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);

        let gateway = config.to_gateway_config().unwrap();
        assert_eq!(gateway.bind_address.to_string(), "0.0.0.0:9100");
        assert_eq!(gateway.shutdown_policy, ShutdownPolicy::Replace);

        let seeds = config.region_seeds().unwrap();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].region_id.to_string(), "6f1c3f8e-3d4b-4a55-9c1e-1f2b3c4d5e6f");
        assert_eq!(seeds[1].internal_endpoint.port(), 9002);
        assert_eq!(seeds[1].datastore.as_deref(), Some("ridge.db"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.gateway.bind_address = "invalid".to_string();
        assert!(config.validate().is_err());
        config.gateway.bind_address = "127.0.0.1:9000".to_string();

        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
        config.logging.level = "info".to_string();

        config.gateway.shutdown_policy = "queue".to_string();
        assert!(config.validate().is_err());
        config.gateway.shutdown_policy = "replace".to_string();
        assert!(config.validate().is_ok());

        config.host.regions[0].listen_ip = "harbor".to_string();
        assert!(config.validate().is_err());
        config.host.regions[0].listen_ip = "0.0.0.0".to_string();

        config.host.regions[0].region_id = Some("not-a-uuid".to_string());
        assert!(config.validate().is_err());
    }
}
