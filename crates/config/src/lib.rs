//! Configuration types for the token indexer.
//!
//! This crate provides:
//! - Network presets (mainnet, sepolia)
//! - Chain ids and data-service endpoints per network
//! - Listing parameters such as the page size

pub mod network;

pub use network::{NetworkConfig, NetworkConfigBuilder, NetworkType, DEFAULT_PAGE_SIZE};
