//! Configuration management for PowLedger

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ChainError;
use crate::miner::{DIFFICULTY, MAX_DIFFICULTY};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub miner: MinerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            api_port: default_api_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct NodeConfig {
    /// Recipient of mining rewards. A random identifier is generated when unset.
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MinerConfig {
    #[serde(default = "default_difficulty")]
    pub difficulty: usize,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Check the values that would make the node unusable.
    pub fn validate(&self) -> Result<(), ChainError> {
        if self.network.host.trim().is_empty() {
            return Err(ChainError::Config("network.host must not be empty".to_string()));
        }
        if self.network.api_port == 0 {
            return Err(ChainError::Config("network.api_port must be non-zero".to_string()));
        }
        if self.miner.difficulty == 0 || self.miner.difficulty > MAX_DIFFICULTY {
            return Err(ChainError::Config(format!(
                "miner.difficulty must be between 1 and {}, got {}",
                MAX_DIFFICULTY, self.miner.difficulty
            )));
        }
        if let Some(id) = &self.node.id {
            if id.trim().is_empty() {
                return Err(ChainError::Config("node.id must not be blank".to_string()));
            }
        }
        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<tracing::Level, ChainError> {
        self.logging.level.parse::<tracing::Level>().map_err(|_| {
            ChainError::Config(format!("logging.level '{}' is not a valid level", self.logging.level))
        })
    }

    /// The configured node identifier, or a fresh dash-free UUID.
    pub fn node_id(&self) -> String {
        match &self.node.id {
            Some(id) => id.trim().to_string(),
            None => uuid::Uuid::new_v4().simple().to_string(),
        }
    }
}

/// Parse configuration from TOML text and validate it.
pub fn parse_config(config_str: &str) -> Result<Config, ChainError> {
    let config: Config = toml::from_str(config_str)?;
    config.validate()?;
    Ok(config)
}

/// Load `path`, falling back to defaults when the file does not exist.
/// The `PORT` environment variable overrides `network.api_port`.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<Config, ChainError> {
    let path = path.as_ref();
    let mut config = if path.exists() {
        let config_str = fs::read_to_string(path)?;
        toml::from_str(&config_str)?
    } else {
        Config::default()
    };

    if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
        config.network.api_port = port;
    }

    config.validate()?;
    Ok(config)
}

pub fn load_config() -> Result<Config, ChainError> {
    load_config_from(DEFAULT_CONFIG_PATH)
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    5000
}

fn default_difficulty() -> usize {
    DIFFICULTY
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.network.host, "0.0.0.0");
        assert_eq!(config.network.api_port, 5000);
        assert_eq!(config.miner.difficulty, DIFFICULTY);
        assert_eq!(config.log_level().unwrap(), tracing::Level::INFO);
        assert!(config.node.id.is_none());
    }

    #[test]
    fn test_full_config() {
        let config = parse_config(
            r#"
            [network]
            host = "127.0.0.1"
            api_port = 8080

            [node]
            id = "node-a"

            [miner]
            difficulty = 3

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.network.host, "127.0.0.1");
        assert_eq!(config.network.api_port, 8080);
        assert_eq!(config.node_id(), "node-a");
        assert_eq!(config.miner.difficulty, 3);
        assert_eq!(config.log_level().unwrap(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_generated_node_id() {
        let config = Config::default();
        let id = config.node_id();
        assert_eq!(id.len(), 32);
        assert!(!id.contains('-'));
        assert_ne!(id, config.node_id());
    }

    #[test]
    fn test_invalid_values_rejected() {
        for bad in [
            "[miner]\ndifficulty = 0",
            "[miner]\ndifficulty = 65",
            "[network]\napi_port = 0",
            "[network]\nhost = \"\"",
            "[node]\nid = \"  \"",
            "[logging]\nlevel = \"loud\"",
        ] {
            let err = parse_config(bad).unwrap_err();
            assert!(matches!(err, ChainError::Config(_)), "{}", bad);
        }
    }

    #[test]
    fn test_malformed_toml() {
        let err = parse_config("[network\napi_port = ").unwrap_err();
        assert!(matches!(err, ChainError::Config(_)));
    }
}
