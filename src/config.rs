//! Configuration module

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target chain and endpoints
    pub network: NetworkConfig,

    /// Transaction building and confirmation settings
    pub submission: SubmissionConfig,

    /// Batch run settings
    pub benchmark: BenchmarkConfig,

    /// Key storage
    pub wallet: WalletConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Prometheus exporter, disabled when absent
    pub metrics: Option<MetricsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub name: String,
    pub chain_id: u64,
    pub rpc_url: String,
    pub explorer_url: String,
    pub native_symbol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    pub poll_interval_ms: u64,
    pub confirmation_timeout_ms: u64,
    /// Forwarded as the second `eth_sendRawTransactionSync` param when set
    pub sync_timeout_ms: Option<u64>,
    pub gas_limit: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    pub iterations: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub key_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json_output: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub listen_addr: SocketAddr,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "Monad".to_string(),
            chain_id: 143,
            rpc_url: "https://rpc-mainnet.monadinfra.com".to_string(),
            explorer_url: "https://explorer.monad.xyz".to_string(),
            native_symbol: "MON".to_string(),
        }
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
            confirmation_timeout_ms: 60_000,
            sync_timeout_ms: None,
            gas_limit: 21_000,
        }
    }
}

impl SubmissionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms)
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self { iterations: 10 }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            key_path: PathBuf::from(".txsync/key.json"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_output: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            submission: SubmissionConfig::default(),
            benchmark: BenchmarkConfig::default(),
            wallet: WalletConfig::default(),
            logging: LoggingConfig::default(),
            metrics: None,
        }
    }
}

impl Config {
    /// Load config from environment
    pub fn from_env() -> anyhow::Result<Self> {
        let config_path = std::env::var("TXSYNC_CONFIG")
            .unwrap_or_else(|_| "config/txsync.json".to_string());

        let mut config = Self::load(&config_path)?;

        if let Ok(url) = std::env::var("TXSYNC_RPC_URL") {
            config.network.rpc_url = url;
        }

        Ok(config)
    }

    /// Load from a JSON file, falling back to defaults when it does not exist
    pub fn load(path: &str) -> anyhow::Result<Self> {
        if std::path::Path::new(path).exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.benchmark.iterations > 0, "benchmark.iterations must be positive");
        anyhow::ensure!(self.submission.poll_interval_ms > 0, "submission.poll_interval_ms must be positive");
        anyhow::ensure!(self.submission.gas_limit >= 21_000, "submission.gas_limit below intrinsic gas");
        Ok(())
    }

    /// Save config to file
    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
