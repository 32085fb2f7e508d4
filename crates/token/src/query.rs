//! Two-phase token query pipeline.
//!
//! Phase 1 fetches every balance entry of the owner. Phase 2 fetches the
//! metadata of each entry concurrently. The pipeline resolves only once every
//! metadata request has completed; a single failure fails the whole cycle.

use crate::{BalanceSource, MetadataSource, QueryError, ResultSet};
use alloy_primitives::Address;
use futures::future::try_join_all;
use tracing::{debug, info};

/// Fetch the balances of `owner` together with the metadata of every token.
pub async fn fetch_result_set<B, M>(
    balances: &B,
    metadata: &M,
    owner: Address,
) -> Result<ResultSet, QueryError>
where
    B: BalanceSource,
    M: MetadataSource,
{
    debug!(owner = %owner, "Fetching token balances");
    let entries = balances.token_balances(owner).await?;

    debug!(
        owner = %owner,
        count = entries.len(),
        "Fetched balances, resolving metadata"
    );

    let resolved = try_join_all(entries.iter().map(|entry| async move {
        let mut meta = metadata.token_metadata(entry.contract_address).await?;
        // Key the record by the contract it was requested for.
        meta.contract_address = entry.contract_address;
        Ok::<_, QueryError>(meta)
    }))
    .await?;

    info!(owner = %owner, tokens = entries.len(), "Token query completed");

    ResultSet::new(entries, resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BalanceEntry, TokenMetadata};
    use alloy_primitives::U256;
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
        time::Duration,
    };

    struct FixedBalances(Vec<BalanceEntry>);

    impl BalanceSource for FixedBalances {
        async fn token_balances(&self, _owner: Address) -> Result<Vec<BalanceEntry>, QueryError> {
            Ok(self.0.clone())
        }
    }

    struct FailingBalances;

    impl BalanceSource for FailingBalances {
        async fn token_balances(&self, _owner: Address) -> Result<Vec<BalanceEntry>, QueryError> {
            Err(QueryError::Malformed("balance service down".to_string()))
        }
    }

    /// Answers with a symbol derived from the contract, completing in the
    /// reverse order of the requests.
    #[derive(Default)]
    struct DelayedMetadata {
        fail_on: Option<Address>,
        calls: AtomicUsize,
        completed: Mutex<Vec<Address>>,
    }

    impl MetadataSource for DelayedMetadata {
        async fn token_metadata(&self, contract: Address) -> Result<TokenMetadata, QueryError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as u64;
            tokio::time::sleep(Duration::from_millis(100 - n * 10)).await;
            self.completed.lock().unwrap().push(contract);

            if self.fail_on == Some(contract) {
                return Err(QueryError::Metadata {
                    contract,
                    reason: "rate limited".to_string(),
                });
            }

            Ok(TokenMetadata {
                contract_address: Address::ZERO,
                symbol: Some(format!("T{}", contract.0[19])),
                decimals: Some(contract.0[19]),
                ..Default::default()
            })
        }
    }

    fn entries(n: u8) -> Vec<BalanceEntry> {
        (1..=n)
            .map(|i| BalanceEntry {
                contract_address: Address::with_last_byte(i),
                raw_balance: U256::ZERO,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_metadata_joins_despite_completion_order() {
        let balances = FixedBalances(entries(5));
        let metadata = DelayedMetadata::default();

        let set = fetch_result_set(&balances, &metadata, Address::ZERO)
            .await
            .unwrap();

        let completed = metadata.completed.lock().unwrap().clone();
        let requested: Vec<Address> = entries(5).iter().map(|e| e.contract_address).collect();
        assert_ne!(completed, requested, "completion order should be shuffled");

        for entry in set.balances() {
            let meta = set.metadata_for(entry.contract_address).unwrap();
            let tag = entry.contract_address.0[19];
            assert_eq!(meta.symbol.as_deref(), Some(format!("T{tag}").as_str()));
            assert_eq!(meta.decimals, Some(tag));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_balances_are_kept() {
        let balances = FixedBalances(entries(3));
        let metadata = DelayedMetadata::default();

        let set = fetch_result_set(&balances, &metadata, Address::ZERO)
            .await
            .unwrap();

        assert_eq!(set.len(), 3);
        assert!(set.balances().iter().all(|b| b.raw_balance.is_zero()));
    }

    #[tokio::test]
    async fn test_empty_holdings() {
        let balances = FixedBalances(Vec::new());
        let metadata = DelayedMetadata::default();

        let set = fetch_result_set(&balances, &metadata, Address::ZERO)
            .await
            .unwrap();

        assert!(set.is_empty());
        assert_eq!(metadata.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_metadata_failure_fails_cycle() {
        let balances = FixedBalances(entries(4));
        let metadata = DelayedMetadata {
            fail_on: Some(Address::with_last_byte(2)),
            ..Default::default()
        };

        let result = fetch_result_set(&balances, &metadata, Address::ZERO).await;

        match result {
            Err(QueryError::Metadata { contract, .. }) => {
                assert_eq!(contract, Address::with_last_byte(2));
            }
            other => panic!("expected metadata failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_balance_failure_skips_metadata() {
        let metadata = DelayedMetadata::default();

        let result = fetch_result_set(&FailingBalances, &metadata, Address::ZERO).await;

        assert!(matches!(result, Err(QueryError::Malformed(_))));
        assert_eq!(metadata.calls.load(Ordering::SeqCst), 0);
    }
}
