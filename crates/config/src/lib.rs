//! Network presets for the balance watchdog.
//!
//! This crate provides:
//! - Supported networks (BSC mainnet, BSC testnet, Ethereum mainnet)
//! - Per-network public RPC endpoint, native coin symbol and block explorer

pub mod network;

pub use network::{NetworkConfig, NetworkConfigBuilder, NetworkType};
