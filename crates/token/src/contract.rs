//! Metadata source reading the token contract over RPC.

use crate::{MetadataSource, QueryError, TokenMetadata};
use alloy_primitives::Address;
use alloy_provider::Provider;
use binding::token::IERC20Metadata;
use std::future::IntoFuture;
use tracing::debug;

/// JSON-RPC error code nodes use for a reverted call.
const EXECUTION_REVERTED_CODE: i64 = 3;

/// Metadata source that reads `name`, `symbol` and `decimals` straight from
/// the token contract.
///
/// The metadata extension is optional in ERC20, so a call that reverts or
/// returns undecodable data leaves the field empty. Any other node or
/// transport failure fails the fetch.
pub struct ContractMetadata<P> {
    provider: P,
}

impl<P> ContractMetadata<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P> MetadataSource for ContractMetadata<P>
where
    P: Provider + Clone,
{
    async fn token_metadata(&self, contract: Address) -> Result<TokenMetadata, QueryError> {
        debug!("Querying erc20 metadata: contract={}", contract);

        let token = IERC20Metadata::new(contract, &self.provider);
        let name_call = token.name();
        let symbol_call = token.symbol();
        let decimals_call = token.decimals();

        let (name, symbol, decimals) = futures::join!(
            name_call.call().into_future(),
            symbol_call.call().into_future(),
            decimals_call.call().into_future()
        );

        Ok(TokenMetadata {
            contract_address: contract,
            name: optional_field(contract, "name", name)?,
            symbol: optional_field(contract, "symbol", symbol)?,
            decimals: optional_field(contract, "decimals", decimals)?,
            logo_url: None,
        })
    }
}

fn optional_field<T>(
    contract: Address,
    field: &'static str,
    result: Result<T, alloy_contract::Error>,
) -> Result<Option<T>, QueryError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(alloy_contract::Error::TransportError(e)) => {
            let reverted = e.as_error_resp().is_some_and(|payload| {
                payload.code == EXECUTION_REVERTED_CODE
                    || payload.as_revert_data().is_some()
                    || payload.message.to_ascii_lowercase().contains("revert")
            });
            if !reverted {
                return Err(QueryError::Metadata {
                    contract,
                    reason: e.to_string(),
                });
            }

            debug!(contract = %contract, field, error = %e, "Token field call reverted");
            Ok(None)
        }
        Err(e) => {
            debug!(contract = %contract, field, error = %e, "Token field unavailable");
            Ok(None)
        }
    }
}
