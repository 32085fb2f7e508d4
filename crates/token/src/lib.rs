//! ERC20 token balance querying and paging.
//!
//! This crate provides:
//! - Address validation for user-typed input
//! - Fixed-point balance formatting
//! - Balance and metadata sources (Alchemy token API, on-chain contract reads)
//! - The two-phase fetch pipeline producing a [`ResultSet`]
//! - A [`Listing`] that reveals a result set page by page

pub mod address;
pub mod alchemy;
pub mod contract;
pub mod format;
pub mod pager;
pub mod query;
pub mod result;

pub use address::{validate, AddressError};
pub use contract::ContractMetadata;
pub use format::format_balance;
pub use pager::{Listing, ListingStatus, Pager};
pub use query::fetch_result_set;
pub use result::{ResultSet, TokenView};

use alloy_primitives::{Address, U256};
use client::ClientError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

/// A token balance held by the queried owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEntry {
    /// Token contract address
    pub contract_address: Address,
    /// Balance in the token's smallest unit
    pub raw_balance: U256,
}

/// Descriptive data for a token contract. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Contract the metadata was fetched for
    pub contract_address: Address,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
    pub logo_url: Option<String>,
}

impl TokenMetadata {
    /// Decimals assumed when the token does not declare any.
    pub const DEFAULT_DECIMALS: u8 = 18;

    /// Metadata with no known fields.
    pub fn unknown(contract_address: Address) -> Self {
        Self {
            contract_address,
            ..Default::default()
        }
    }

    /// Declared decimals, or [`Self::DEFAULT_DECIMALS`].
    pub fn decimals_or_default(&self) -> u8 {
        self.decimals.unwrap_or(Self::DEFAULT_DECIMALS)
    }
}

/// Failure of a query cycle.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The balance request failed
    #[error("Token service error: {0}")]
    Service(#[from] ClientError),

    /// A metadata request failed
    #[error("Metadata fetch failed for {contract}: {reason}")]
    Metadata { contract: Address, reason: String },

    /// The service answered with data that cannot be interpreted
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Source of the ERC20 balances held by an address.
pub trait BalanceSource: Send + Sync {
    /// Fetch every ERC20 balance entry of `owner`, zero balances included.
    fn token_balances(
        &self,
        owner: Address,
    ) -> impl Future<Output = Result<Vec<BalanceEntry>, QueryError>> + Send;
}

/// Source of per-contract token metadata.
pub trait MetadataSource: Send + Sync {
    /// Fetch metadata for a single token contract.
    fn token_metadata(
        &self,
        contract: Address,
    ) -> impl Future<Output = Result<TokenMetadata, QueryError>> + Send;
}
