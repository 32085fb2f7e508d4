//! Balance and metadata sources backed by the Alchemy token API.

use crate::{BalanceEntry, BalanceSource, MetadataSource, QueryError, TokenMetadata};
use alloy_primitives::{Address, U256};
use client::{AlchemyClient, RawTokenBalance, TokenMetadataResponse};
use std::collections::HashSet;
use tracing::{debug, warn};

impl BalanceSource for AlchemyClient {
    async fn token_balances(&self, owner: Address) -> Result<Vec<BalanceEntry>, QueryError> {
        let mut entries = Vec::new();
        let mut page_key: Option<String> = None;
        let mut seen_keys = HashSet::new();

        loop {
            let page = self.get_token_balances(owner, page_key.as_deref()).await?;

            debug!(
                owner = %owner,
                page_entries = page.token_balances.len(),
                has_next = page.page_key.is_some(),
                "Received balance page"
            );

            for raw in page.token_balances {
                entries.push(parse_balance(raw)?);
            }

            match next_page_key(&mut seen_keys, page.page_key) {
                Some(next) => page_key = Some(next),
                None => break,
            }
        }

        Ok(entries)
    }
}

impl MetadataSource for AlchemyClient {
    async fn token_metadata(&self, contract: Address) -> Result<TokenMetadata, QueryError> {
        let response = self
            .get_token_metadata(contract)
            .await
            .map_err(|e| QueryError::Metadata {
                contract,
                reason: e.to_string(),
            })?;

        Ok(into_metadata(contract, response))
    }
}

/// Continuation key to follow, or `None` once the listing is exhausted or
/// the service hands back a key it already gave.
fn next_page_key(seen: &mut HashSet<String>, key: Option<String>) -> Option<String> {
    let key = key?;
    if !seen.insert(key.clone()) {
        warn!(page_key = %key, "Balance page key repeated, stopping");
        return None;
    }
    Some(key)
}

fn parse_balance(raw: RawTokenBalance) -> Result<BalanceEntry, QueryError> {
    let encoded = raw.token_balance.ok_or_else(|| {
        QueryError::Malformed(format!(
            "no balance for {}: {}",
            raw.contract_address,
            raw.error.as_deref().unwrap_or("missing tokenBalance")
        ))
    })?;

    let raw_balance: U256 = encoded.parse().map_err(|e| {
        QueryError::Malformed(format!(
            "invalid balance {encoded:?} for {}: {e}",
            raw.contract_address
        ))
    })?;

    Ok(BalanceEntry {
        contract_address: raw.contract_address,
        raw_balance,
    })
}

fn into_metadata(contract: Address, response: TokenMetadataResponse) -> TokenMetadata {
    TokenMetadata {
        contract_address: contract,
        name: response.name,
        symbol: response.symbol,
        decimals: response.decimals,
        logo_url: response.logo,
    }
}
