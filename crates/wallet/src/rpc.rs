//! Wallet provider over a JSON-RPC wallet endpoint.
//!
//! Accounts are authorized with `eth_requestAccounts`. The endpoint pushes no
//! events, so account and chain changes are detected by polling
//! `eth_accounts` and `eth_chainId`.

use crate::{Subscription, WalletError, WalletEvent, WalletProvider, USER_REJECTED_CODE};
use alloy_primitives::Address;
use alloy_provider::Provider;
use async_trait::async_trait;
use std::time::Duration;
use tokio::{
    sync::mpsc,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, warn};

pub struct RpcWallet<P> {
    provider: P,
    poll_interval: Duration,
}

impl<P> RpcWallet<P>
where
    P: Provider + Clone + 'static,
{
    pub const fn new(provider: P, poll_interval: Duration) -> Self {
        Self {
            provider,
            poll_interval,
        }
    }

    /// Probe the endpoint and return a wallet only if it answers.
    pub async fn detect(provider: P, poll_interval: Duration) -> Option<Self> {
        match provider.get_chain_id().await {
            Ok(chain_id) => {
                info!(chain_id, "Wallet endpoint detected");
                Some(Self::new(provider, poll_interval))
            }
            Err(e) => {
                warn!(error = %e, "Wallet endpoint not reachable");
                None
            }
        }
    }
}

#[async_trait]
impl<P> WalletProvider for RpcWallet<P>
where
    P: Provider + Clone + 'static,
{
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.provider
            .raw_request::<(), Vec<Address>>("eth_requestAccounts".into(), ())
            .await
            .map_err(|e| classify(e.as_error_resp().map(|payload| payload.code), e.to_string()))
    }

    fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(poll_events(self.provider.clone(), self.poll_interval, tx));

        Subscription::new(rx, move || handle.abort())
    }
}

/// Map a wallet RPC failure onto the wallet error taxonomy.
fn classify(code: Option<i64>, message: String) -> WalletError {
    match code {
        Some(USER_REJECTED_CODE) => WalletError::ConnectionRejected,
        _ => WalletError::Rpc(message),
    }
}

/// Tracks the last observed wallet state and derives events from snapshots.
#[derive(Debug, Default)]
struct Watcher {
    accounts: Option<Vec<Address>>,
    chain_id: Option<u64>,
    reachable: bool,
}

impl Watcher {
    fn observe(&mut self, accounts: Vec<Address>, chain_id: u64) -> Vec<WalletEvent> {
        let mut events = Vec::new();

        if self.chain_id.is_some_and(|previous| previous != chain_id) {
            events.push(WalletEvent::ChainChanged(chain_id));
        }
        if self
            .accounts
            .as_ref()
            .is_some_and(|previous| *previous != accounts)
        {
            events.push(WalletEvent::AccountsChanged(accounts.clone()));
        }

        self.chain_id = Some(chain_id);
        self.accounts = Some(accounts);
        self.reachable = true;
        events
    }

    fn unreachable(&mut self) -> Option<WalletEvent> {
        let was_reachable = std::mem::replace(&mut self.reachable, false);
        self.accounts = None;
        self.chain_id = None;
        was_reachable.then_some(WalletEvent::Disconnected)
    }
}

async fn poll_events<P>(provider: P, interval: Duration, tx: mpsc::UnboundedSender<WalletEvent>)
where
    P: Provider,
{
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut watcher = Watcher {
        reachable: true,
        ..Default::default()
    };

    loop {
        ticker.tick().await;

        let events = match tokio::try_join!(provider.get_accounts(), provider.get_chain_id()) {
            Ok((accounts, chain_id)) => watcher.observe(accounts, chain_id),
            Err(e) => {
                debug!(error = %e, "Wallet poll failed");
                watcher.unreachable().into_iter().collect()
            }
        };

        for event in events {
            debug!(?event, "Wallet event");
            if tx.send(event).is_err() {
                return;
            }
        }

        if tx.is_closed() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Address = Address::with_last_byte(0xa1);
    const BOB: Address = Address::with_last_byte(0xb0);

    #[test]
    fn test_classify_rejection() {
        assert_eq!(
            classify(Some(USER_REJECTED_CODE), "User rejected the request.".to_string()),
            WalletError::ConnectionRejected
        );
        assert_eq!(
            classify(None, "connection refused".to_string()),
            WalletError::Rpc("connection refused".to_string())
        );
        assert!(matches!(
            classify(Some(-32603), "internal".to_string()),
            WalletError::Rpc(_)
        ));
    }

    #[test]
    fn test_first_snapshot_is_baseline() {
        let mut watcher = Watcher::default();
        assert!(watcher.observe(vec![ALICE], 1).is_empty());
    }

    #[test]
    fn test_account_switch_emits_event() {
        let mut watcher = Watcher::default();
        watcher.observe(vec![ALICE], 1);

        assert_eq!(
            watcher.observe(vec![BOB, ALICE], 1),
            vec![WalletEvent::AccountsChanged(vec![BOB, ALICE])]
        );
        assert!(watcher.observe(vec![BOB, ALICE], 1).is_empty());
    }

    #[test]
    fn test_locking_emits_empty_account_list() {
        let mut watcher = Watcher::default();
        watcher.observe(vec![ALICE], 1);

        assert_eq!(
            watcher.observe(vec![], 1),
            vec![WalletEvent::AccountsChanged(vec![])]
        );
    }

    #[test]
    fn test_chain_switch_emits_event() {
        let mut watcher = Watcher::default();
        watcher.observe(vec![ALICE], 1);

        assert_eq!(
            watcher.observe(vec![ALICE], 11155111),
            vec![WalletEvent::ChainChanged(11155111)]
        );
    }

    #[test]
    fn test_disconnect_reported_once() {
        let mut watcher = Watcher {
            reachable: true,
            ..Default::default()
        };
        watcher.observe(vec![ALICE], 1);

        assert_eq!(watcher.unreachable(), Some(WalletEvent::Disconnected));
        assert_eq!(watcher.unreachable(), None);

        // Recovery re-establishes a silent baseline.
        assert!(watcher.observe(vec![ALICE], 1).is_empty());
        assert_eq!(watcher.unreachable(), Some(WalletEvent::Disconnected));
    }
}
