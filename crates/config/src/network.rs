//! Network configuration for token queries.
//!
//! Provides chain-specific identifiers and data-service endpoints for the
//! supported networks.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, time::Duration};

/// Number of token entries revealed per page.
pub const DEFAULT_PAGE_SIZE: usize = 18;

/// Default interval between wallet endpoint polls.
const DEFAULT_WALLET_POLL: Duration = Duration::from_secs(2);

/// Network type (mainnet or sepolia testnet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Mainnet,
    Sepolia,
}

impl NetworkType {
    /// Network slug used in Alchemy endpoint hostnames.
    pub const fn alchemy_slug(self) -> &'static str {
        match self {
            Self::Mainnet => "eth-mainnet",
            Self::Sepolia => "eth-sepolia",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mainnet => f.write_str("mainnet"),
            Self::Sepolia => f.write_str("sepolia"),
        }
    }
}

impl FromStr for NetworkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "eth-mainnet" => Ok(Self::Mainnet),
            "sepolia" | "eth-sepolia" | "testnet" => Ok(Self::Sepolia),
            other => Err(format!("unknown network: {other}")),
        }
    }
}

/// Complete network configuration for token queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network type
    pub network_type: NetworkType,
    /// Chain ID
    pub chain_id: u64,
    /// Entries revealed per page
    pub page_size: usize,
    /// Interval between wallet endpoint polls
    pub wallet_poll_interval: Duration,
}

impl NetworkConfig {
    /// Ethereum mainnet configuration.
    pub const fn mainnet() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            chain_id: 1,
            page_size: DEFAULT_PAGE_SIZE,
            wallet_poll_interval: DEFAULT_WALLET_POLL,
        }
    }

    /// Ethereum Sepolia testnet configuration.
    pub const fn sepolia() -> Self {
        Self {
            network_type: NetworkType::Sepolia,
            chain_id: 11155111,
            page_size: DEFAULT_PAGE_SIZE,
            wallet_poll_interval: DEFAULT_WALLET_POLL,
        }
    }

    /// Create configuration from network type.
    pub const fn from_network_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Mainnet => Self::mainnet(),
            NetworkType::Sepolia => Self::sepolia(),
        }
    }

    /// Alchemy JSON-RPC endpoint for this network.
    pub fn alchemy_url(&self, api_key: &str) -> String {
        format!(
            "https://{}.g.alchemy.com/v2/{}",
            self.network_type.alchemy_slug(),
            api_key
        )
    }
}

/// Builder for custom network configurations.
#[derive(Debug, Clone)]
pub struct NetworkConfigBuilder {
    config: NetworkConfig,
}

impl NetworkConfigBuilder {
    /// Start with mainnet defaults.
    pub const fn mainnet() -> Self {
        Self {
            config: NetworkConfig::mainnet(),
        }
    }

    /// Start with sepolia defaults.
    pub const fn sepolia() -> Self {
        Self {
            config: NetworkConfig::sepolia(),
        }
    }

    /// Start with the defaults of the given network.
    pub const fn from_network_type(network_type: NetworkType) -> Self {
        Self {
            config: NetworkConfig::from_network_type(network_type),
        }
    }

    /// Override the page size. Zero is clamped to one.
    pub const fn page_size(mut self, page_size: usize) -> Self {
        self.config.page_size = if page_size == 0 { 1 } else { page_size };
        self
    }

    /// Override the wallet poll interval.
    pub const fn wallet_poll_interval(mut self, interval: Duration) -> Self {
        self.config.wallet_poll_interval = interval;
        self
    }

    /// Build the network configuration.
    pub const fn build(self) -> NetworkConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_config() {
        let config = NetworkConfig::mainnet();
        assert_eq!(config.chain_id, 1);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.network_type, NetworkType::Mainnet);
    }

    #[test]
    fn test_sepolia_config() {
        let config = NetworkConfig::sepolia();
        assert_eq!(config.chain_id, 11155111);
        assert_eq!(config.network_type, NetworkType::Sepolia);
        assert_eq!(
            config.alchemy_url("key"),
            "https://eth-sepolia.g.alchemy.com/v2/key"
        );
    }

    #[test]
    fn test_custom_config_builder() {
        let config = NetworkConfigBuilder::mainnet()
            .page_size(5)
            .wallet_poll_interval(Duration::from_millis(250))
            .build();

        assert_eq!(config.page_size, 5);
        assert_eq!(config.wallet_poll_interval, Duration::from_millis(250));
        assert_eq!(config.network_type, NetworkType::Mainnet);
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        let config = NetworkConfigBuilder::sepolia().page_size(0).build();
        assert_eq!(config.page_size, 1);
    }

    #[test]
    fn test_network_type_parsing() {
        assert_eq!("Mainnet".parse::<NetworkType>(), Ok(NetworkType::Mainnet));
        assert_eq!(" sepolia ".parse::<NetworkType>(), Ok(NetworkType::Sepolia));
        assert!("goerli".parse::<NetworkType>().is_err());
    }

    #[test]
    fn test_network_type_serde() {
        #[derive(Deserialize)]
        struct Wrapper {
            network: NetworkType,
        }

        let parsed: Wrapper = toml::from_str("network = \"sepolia\"").unwrap();
        assert_eq!(parsed.network, NetworkType::Sepolia);
    }
}
