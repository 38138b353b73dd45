//! Configuration management for AuraChain

use crate::error::ChainError;
use crate::network::DEFAULT_PEER_TIMEOUT;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub miner: MinerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Peers registered at startup, in any form `register_peer` accepts.
    #[serde(default)]
    pub bootstrap_peers: Vec<String>,
    #[serde(default = "default_peer_timeout")]
    pub peer_timeout_secs: u64,
    /// Run conflict resolution this often; 0 disables the background loop.
    #[serde(default)]
    pub resolve_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MinerConfig {
    /// Amount credited to this node by each block it forges.
    #[serde(default = "default_reward")]
    pub reward: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bootstrap_peers: Vec::new(),
            peer_timeout_secs: default_peer_timeout(),
            resolve_interval_secs: 0,
        }
    }
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            reward: default_reward(),
        }
    }
}

impl NetworkConfig {
    pub fn peer_timeout(&self) -> Duration {
        Duration::from_secs(self.peer_timeout_secs)
    }

    pub fn resolve_interval(&self) -> Option<Duration> {
        (self.resolve_interval_secs > 0).then(|| Duration::from_secs(self.resolve_interval_secs))
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, ChainError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ChainError> {
        if self.network.host.is_empty() {
            return Err(ChainError::ConfigError("network.host must be set".to_string()));
        }
        if self.network.peer_timeout_secs == 0 {
            return Err(ChainError::ConfigError(
                "network.peer_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load configuration from `path`, falling back to defaults when the file is absent.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ChainError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }
    let config_str = fs::read_to_string(path)?;
    Config::from_toml(&config_str)
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_peer_timeout() -> u64 {
    DEFAULT_PEER_TIMEOUT.as_secs()
}

fn default_reward() -> u64 {
    1
}
