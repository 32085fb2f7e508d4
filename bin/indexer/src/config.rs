use ::config::{NetworkConfig, NetworkConfigBuilder, NetworkType};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, str::FromStr, time::Duration};

/// Where token metadata is read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataKind {
    /// The token API that also serves balances
    #[default]
    Alchemy,
    /// The token contracts themselves, over RPC
    Contract,
}

impl FromStr for MetadataKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alchemy" => Ok(Self::Alchemy),
            "contract" => Ok(Self::Contract),
            other => Err(format!("unknown metadata source: {other}")),
        }
    }
}

impl fmt::Display for MetadataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alchemy => f.write_str("alchemy"),
            Self::Contract => f.write_str("contract"),
        }
    }
}

/// Top-level indexer configuration.
///
/// Every field is optional in the file; command line flags and environment
/// variables override it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target network (sepolia when unset)
    pub network: Option<NetworkType>,

    /// Token API key
    pub alchemy_api_key: Option<String>,

    /// JSON-RPC wallet endpoint
    pub wallet_rpc_url: Option<String>,

    /// Node RPC endpoint for contract metadata reads
    pub rpc_url: Option<String>,

    /// Metadata source
    pub metadata_source: MetadataKind,

    /// Entries revealed per page
    pub page_size: Option<usize>,

    /// Wallet poll interval in milliseconds
    pub wallet_poll_ms: Option<u64>,

    /// Prometheus exporter port
    pub metrics_port: Option<u16>,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;

        Ok(config)
    }

    /// Network parameters with the file's overrides applied.
    pub fn network_config(&self) -> NetworkConfig {
        let mut builder =
            NetworkConfigBuilder::from_network_type(self.network.unwrap_or(NetworkType::Sepolia));

        if let Some(page_size) = self.page_size {
            builder = builder.page_size(page_size);
        }
        if let Some(ms) = self.wallet_poll_ms {
            builder = builder.wallet_poll_interval(Duration::from_millis(ms));
        }

        builder.build()
    }

    /// The token API key, which every query needs.
    pub fn api_key(&self) -> eyre::Result<&str> {
        self.alchemy_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                eyre::eyre!("Token API key missing: set ALCHEMY_API_KEY or alchemy_api_key")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        let network = config.network_config();

        assert_eq!(network.network_type, NetworkType::Sepolia);
        assert_eq!(network.page_size, ::config::DEFAULT_PAGE_SIZE);
        assert_eq!(config.metadata_source, MetadataKind::Alchemy);
        assert!(config.api_key().is_err());
    }

    #[test]
    fn test_file_overrides() {
        let config: Config = toml::from_str(
            r#"
            network = "mainnet"
            alchemy_api_key = "demo"
            metadata_source = "contract"
            rpc_url = "http://localhost:8545"
            page_size = 6
            wallet_poll_ms = 500
            "#,
        )
        .unwrap();
        let network = config.network_config();

        assert_eq!(network.network_type, NetworkType::Mainnet);
        assert_eq!(network.page_size, 6);
        assert_eq!(network.wallet_poll_interval, Duration::from_millis(500));
        assert_eq!(config.metadata_source, MetadataKind::Contract);
        assert_eq!(config.api_key().unwrap(), "demo");
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let config = Config {
            alchemy_api_key: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(config.api_key().is_err());
    }

    #[test]
    fn test_metadata_kind_parsing() {
        assert_eq!("Contract".parse(), Ok(MetadataKind::Contract));
        assert!("ipfs".parse::<MetadataKind>().is_err());
    }
}
