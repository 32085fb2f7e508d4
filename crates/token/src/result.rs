//! Query results and the balance/metadata join.

use crate::{format::format_balance, BalanceEntry, QueryError, TokenMetadata};
use alloy_primitives::Address;
use std::collections::HashMap;
use tracing::debug;

/// Symbol shown for tokens without a known symbol.
pub const UNKNOWN_SYMBOL: &str = "N/A";

/// Balances and their metadata, produced by one query cycle.
///
/// Both sequences have the same length and order. Metadata is looked up by
/// contract address, never by position.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    balances: Vec<BalanceEntry>,
    metadata: Vec<TokenMetadata>,
    index: HashMap<Address, usize>,
}

impl ResultSet {
    /// Pair balances with the metadata fetched for them.
    pub fn new(
        balances: Vec<BalanceEntry>,
        metadata: Vec<TokenMetadata>,
    ) -> Result<Self, QueryError> {
        if balances.len() != metadata.len() {
            return Err(QueryError::Malformed(format!(
                "{} balances but {} metadata records",
                balances.len(),
                metadata.len()
            )));
        }

        let mut index = HashMap::with_capacity(metadata.len());
        for (position, meta) in metadata.iter().enumerate() {
            index.entry(meta.contract_address).or_insert(position);
        }

        Ok(Self {
            balances,
            metadata,
            index,
        })
    }

    pub fn balances(&self) -> &[BalanceEntry] {
        &self.balances
    }

    pub fn metadata(&self) -> &[TokenMetadata] {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Metadata fetched for `contract`, if any.
    pub fn metadata_for(&self, contract: Address) -> Option<&TokenMetadata> {
        self.index
            .get(&contract)
            .and_then(|&position| self.metadata.get(position))
    }

    /// Join a balance entry with its metadata for display.
    pub fn view<'a>(&'a self, entry: &'a BalanceEntry) -> TokenView<'a> {
        let metadata = self.metadata_for(entry.contract_address);

        let symbol = metadata
            .and_then(|m| m.symbol.as_deref())
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_SYMBOL);
        let decimals = metadata.map_or(TokenMetadata::DEFAULT_DECIMALS, |m| {
            m.decimals_or_default()
        });
        let logo_url = metadata
            .and_then(|m| m.logo_url.as_deref())
            .filter(|s| !s.is_empty());

        let balance = format_balance(entry.raw_balance, decimals).unwrap_or_else(|e| {
            debug!(contract = %entry.contract_address, decimals, error = %e, "Showing raw balance");
            entry.raw_balance.to_string()
        });

        TokenView {
            contract_address: entry.contract_address,
            symbol,
            decimals,
            balance,
            logo_url,
        }
    }
}

/// A balance entry joined with its metadata, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenView<'a> {
    pub contract_address: Address,
    pub symbol: &'a str,
    pub decimals: u8,
    /// Formatted balance in whole tokens
    pub balance: String,
    /// Logo, omitted when unknown
    pub logo_url: Option<&'a str>,
}
