//! Configuration management
//!
//! Handles:
//! - smartctl location, refresh interval and invocation options
//! - Optional timeout and concurrency cap (both off by default)
//! - Fake-data mode with a fixtures directory
//! - HTTP listen address and an optional explicit device list

use crate::device::Device;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "SMARTMON_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub smartctl: SmartctlConfig,
    pub server: ServerConfig,
    pub devices: Vec<Device>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartctlConfig {
    pub path: PathBuf,
    /// Maximum age of a reading before it is refreshed (e.g. "60s", "5m")
    pub interval: String,
    /// Value passed to `--nocheck=`
    pub power_mode_check: String,
    pub scan_device_types: Vec<String>,
    pub collect_timeout: Option<String>,
    pub max_concurrent_collections: Option<usize>,
    pub fake_data: bool,
    pub fixtures_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for SmartctlConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/usr/sbin/smartctl"),
            interval: "60s".to_string(),
            power_mode_check: "standby".to_string(),
            scan_device_types: Vec::new(),
            collect_timeout: None,
            max_concurrent_collections: None,
            fake_data: false,
            fixtures_dir: PathBuf::from("debug"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:9633".to_string(),
        }
    }
}

impl SmartctlConfig {
    pub fn interval(&self) -> Result<Duration> {
        humantime::parse_duration(&self.interval)
            .with_context(|| format!("Invalid smartctl.interval '{}'", self.interval))
    }

    pub fn collect_timeout(&self) -> Result<Option<Duration>> {
        self.collect_timeout
            .as_deref()
            .map(|raw| {
                humantime::parse_duration(raw)
                    .with_context(|| format!("Invalid smartctl.collect_timeout '{raw}'"))
            })
            .transpose()
    }
}

impl AgentConfig {
    /// Load config from `$SMARTMON_CONFIG` or the OS config directory.
    /// A missing file gives the defaults.
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        if config_path.exists() {
            let content = tokio::fs::read_to_string(&config_path)
                .await
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Self::from_toml_str(&content)
                .with_context(|| format!("Invalid config file {}", config_path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AgentConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject durations that would only fail later at startup
    pub fn validate(&self) -> Result<()> {
        self.smartctl.interval()?;
        self.smartctl.collect_timeout()?;
        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        path.push("smartmon-agent");
        path.push("config.toml");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.smartctl.interval().unwrap(), Duration::from_secs(60));
        assert_eq!(config.smartctl.power_mode_check, "standby");
        assert_eq!(config.smartctl.collect_timeout().unwrap(), None);
        assert_eq!(config.smartctl.max_concurrent_collections, None);
        assert!(!config.smartctl.fake_data);
        assert_eq!(config.server.listen, "0.0.0.0:9633");
        assert!(config.devices.is_empty());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = AgentConfig::from_toml_str(
            r#"
            [smartctl]
            interval = "5m"
            scan_device_types = ["sat", "nvme"]
            collect_timeout = "30s"

            [[devices]]
            name = "/dev/sda"
            type = "sat"

            [[devices]]
            name = "/dev/sdb"
            "#,
        )
        .unwrap();

        assert_eq!(config.smartctl.interval().unwrap(), Duration::from_secs(300));
        assert_eq!(config.smartctl.collect_timeout().unwrap(), Some(Duration::from_secs(30)));
        assert_eq!(config.smartctl.scan_device_types, vec!["sat", "nvme"]);
        assert_eq!(config.smartctl.path, PathBuf::from("/usr/sbin/smartctl"));
        assert_eq!(
            config.devices,
            vec![Device::new("/dev/sda", "sat"), Device::new("/dev/sdb", "auto")]
        );
    }

    #[test]
    fn test_invalid_interval_is_rejected() {
        let err = AgentConfig::from_toml_str("[smartctl]\ninterval = \"soon\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("smartctl.interval"));
    }

    #[test]
    fn test_config_file_path() {
        let path = AgentConfig::config_file_path().unwrap();
        let shown = path.to_string_lossy();
        assert!(shown.contains("smartmon") || std::env::var(CONFIG_ENV).is_ok());
    }
}
