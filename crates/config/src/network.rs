//! Network configuration for balance monitoring.
//!
//! Provides chain-specific endpoints and display parameters for the networks
//! the watchdog knows about.

use serde::{Deserialize, Serialize};

/// Supported network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkType {
    #[default]
    Bsc,
    BscTestnet,
    Ethereum,
}

/// Chain parameters used when querying and reporting balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network type
    pub network_type: NetworkType,
    /// Chain ID
    pub chain_id: u64,
    /// Short chain name used in alert text
    pub chain_name: String,
    /// Public JSON-RPC endpoint
    pub rpc_url: String,
    /// Symbol of the native coin
    pub native_symbol: String,
    /// Explorer URL prefix; an address is appended to link to its page
    pub explorer_address_url: String,
}

impl NetworkConfig {
    /// BNB Smart Chain mainnet configuration.
    pub fn bsc() -> Self {
        Self {
            network_type: NetworkType::Bsc,
            chain_id: 56,
            chain_name: "BSC".to_string(),
            rpc_url: "https://bsc-dataseed.binance.org/".to_string(),
            native_symbol: "BNB".to_string(),
            explorer_address_url: "https://bscscan.com/address/".to_string(),
        }
    }

    /// BNB Smart Chain testnet configuration.
    pub fn bsc_testnet() -> Self {
        Self {
            network_type: NetworkType::BscTestnet,
            chain_id: 97,
            chain_name: "BSC testnet".to_string(),
            rpc_url: "https://data-seed-prebsc-1-s1.binance.org:8545/".to_string(),
            native_symbol: "tBNB".to_string(),
            explorer_address_url: "https://testnet.bscscan.com/address/".to_string(),
        }
    }

    /// Ethereum mainnet configuration.
    pub fn ethereum() -> Self {
        Self {
            network_type: NetworkType::Ethereum,
            chain_id: 1,
            chain_name: "Ethereum".to_string(),
            rpc_url: "https://ethereum-rpc.publicnode.com".to_string(),
            native_symbol: "ETH".to_string(),
            explorer_address_url: "https://etherscan.io/address/".to_string(),
        }
    }

    /// Create configuration from network type.
    pub fn from_network_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Bsc => Self::bsc(),
            NetworkType::BscTestnet => Self::bsc_testnet(),
            NetworkType::Ethereum => Self::ethereum(),
        }
    }

    /// Explorer link for `address`.
    pub fn address_url(&self, address: &str) -> String {
        format!("{}{}", self.explorer_address_url, address)
    }
}

/// Builder for custom network configurations.
#[derive(Debug, Clone)]
pub struct NetworkConfigBuilder {
    config: NetworkConfig,
}

impl NetworkConfigBuilder {
    /// Start from a preset.
    pub fn new(network_type: NetworkType) -> Self {
        Self {
            config: NetworkConfig::from_network_type(network_type),
        }
    }

    /// Override the RPC endpoint.
    pub fn rpc_url(mut self, url: impl Into<String>) -> Self {
        self.config.rpc_url = url.into();
        self
    }

    /// Override the native coin symbol.
    pub fn native_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.config.native_symbol = symbol.into();
        self
    }

    /// Build the network configuration.
    pub fn build(self) -> NetworkConfig {
        self.config
    }
}
