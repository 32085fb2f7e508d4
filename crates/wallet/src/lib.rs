//! Wallet connection and account tracking.
//!
//! This crate provides:
//! - The [`WalletProvider`] seam over an account-holding wallet
//! - Scoped event [`Subscription`]s released on drop
//! - [`RpcWallet`], a provider over a JSON-RPC wallet endpoint
//! - The [`SessionManager`] state machine

pub mod rpc;
pub mod session;

pub use rpc::RpcWallet;
pub use session::{short_address, Session, SessionChange, SessionManager};

use alloy_primitives::Address;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

/// EIP-1193 provider error code for a request the user rejected.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Event emitted by a wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// The authorized account list changed; the first entry is active
    AccountsChanged(Vec<Address>),
    /// The wallet switched to another chain
    ChainChanged(u64),
    /// The wallet became unreachable
    Disconnected,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// No wallet was detected at startup
    #[error("No wallet detected")]
    ProviderUnavailable,

    /// The user declined the authorization request
    #[error("Wallet connection rejected")]
    ConnectionRejected,

    /// The wallet authorized no account
    #[error("Wallet returned no accounts")]
    NoAccounts,

    /// Any other wallet RPC failure
    #[error("Wallet RPC error: {0}")]
    Rpc(String),
}

/// A wallet holding the user's accounts.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet to authorize its accounts.
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Start listening for wallet events. Listening stops when the returned
    /// subscription is dropped.
    fn subscribe(&self) -> Subscription;
}

/// Live stream of wallet events.
///
/// Dropping the subscription removes the listener it stands for.
pub struct Subscription {
    events: mpsc::UnboundedReceiver<WalletEvent>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Subscription over `events` that runs `release` on drop.
    pub fn new(
        events: mpsc::UnboundedReceiver<WalletEvent>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            events,
            release: Some(Box::new(release)),
        }
    }

    /// Next event, or `None` once the provider stopped emitting.
    pub async fn next(&mut self) -> Option<WalletEvent> {
        self.events.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
            debug!("Wallet listeners removed");
        }
    }
}
