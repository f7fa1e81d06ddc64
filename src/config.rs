use anyhow::Context;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::money::DEFAULT_TRANSFER_CEILING;
use crate::transfer::{LockStrategy, TransferLimits};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    /// When false, settlement outcome events are filtered out
    pub enable_tracing: bool,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL; absent selects the in-memory ledger
    #[serde(default)]
    pub postgres_url: Option<String>,
    #[serde(default)]
    pub ledger: LedgerConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

/// Settlement behaviour
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Largest amount one transfer may move
    #[serde(default = "default_ceiling")]
    pub transfer_ceiling: Decimal,
    #[serde(default)]
    pub lock_strategy: LockStrategy,
}

fn default_ceiling() -> Decimal {
    DEFAULT_TRANSFER_CEILING
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            transfer_ceiling: DEFAULT_TRANSFER_CEILING,
            lock_strategy: LockStrategy::default(),
        }
    }
}

impl LedgerConfig {
    pub fn limits(&self) -> TransferLimits {
        TransferLimits {
            ceiling: self.transfer_ceiling,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", config_path))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: AppConfig = serde_yaml::from_str(content)?;
        anyhow::ensure!(
            config.ledger.transfer_ceiling > Decimal::ZERO,
            "ledger.transfer_ceiling must be positive"
        );
        Ok(config)
    }
}
