//! Wallet session state machine.
//!
//! A [`SessionManager`] owns the single session of an app instance. It
//! connects through the wallet provider detected at startup and follows the
//! provider's account, chain and disconnect events.

use crate::{Subscription, WalletError, WalletEvent, WalletProvider};
use alloy_primitives::Address;
use std::sync::Arc;
use tracing::{info, warn};

/// Connection state towards the wallet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub connected: bool,
    /// Active account, always as reported by the wallet
    pub address: Option<Address>,
}

impl Session {
    const fn with_account(address: Address) -> Self {
        Self {
            connected: true,
            address: Some(address),
        }
    }
}

/// What a wallet event means for the rest of the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChange {
    /// A new active account was adopted
    Connected(Address),
    /// The session was cleared
    Cleared,
    /// The chain changed; every piece of in-memory state must be discarded
    Reload,
}

pub struct SessionManager {
    provider: Option<Arc<dyn WalletProvider>>,
    session: Session,
}

impl SessionManager {
    /// Manager over the provider detected at startup, if any.
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        Self {
            provider,
            session: Session::default(),
        }
    }

    /// Whether a wallet was detected.
    pub const fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    pub const fn session(&self) -> &Session {
        &self.session
    }

    pub const fn address(&self) -> Option<Address> {
        self.session.address
    }

    /// Provider to authorize against, or `ProviderUnavailable`.
    ///
    /// Split from [`Self::finish_connect`] so the request can run without
    /// holding the manager.
    pub fn begin_connect(&self) -> Result<Arc<dyn WalletProvider>, WalletError> {
        self.provider
            .clone()
            .ok_or(WalletError::ProviderUnavailable)
    }

    /// Apply the outcome of an account request. The session is unchanged on
    /// failure.
    pub fn finish_connect(
        &mut self,
        outcome: Result<Vec<Address>, WalletError>,
    ) -> Result<Address, WalletError> {
        let accounts = outcome.inspect_err(|e| warn!(error = %e, "Error connecting to wallet"))?;

        let Some(&address) = accounts.first() else {
            warn!("Wallet authorized no accounts");
            return Err(WalletError::NoAccounts);
        };

        info!(address = %address, "Wallet connected");
        self.session = Session::with_account(address);
        Ok(address)
    }

    /// Request account access and adopt the first authorized account.
    pub async fn connect(&mut self) -> Result<Address, WalletError> {
        let provider = self.begin_connect()?;
        let outcome = provider.request_accounts().await;
        self.finish_connect(outcome)
    }

    /// Forget the active account locally. Wallet permissions are untouched.
    pub fn disconnect(&mut self) {
        if self.session.connected {
            info!("Wallet disconnected");
        }
        self.session = Session::default();
    }

    /// Listen to the provider's events, if a provider exists.
    pub fn subscribe(&self) -> Option<Subscription> {
        self.provider.as_ref().map(|provider| provider.subscribe())
    }

    /// React to a provider event.
    pub fn handle_event(&mut self, event: WalletEvent) -> SessionChange {
        match event {
            WalletEvent::AccountsChanged(accounts) => match accounts.first() {
                Some(&address) => {
                    info!(address = %address, "Wallet account changed");
                    self.session = Session::with_account(address);
                    SessionChange::Connected(address)
                }
                None => {
                    info!("Wallet locked or revoked all accounts");
                    self.session = Session::default();
                    SessionChange::Cleared
                }
            },
            WalletEvent::ChainChanged(chain_id) => {
                info!(chain_id, "Chain changed");
                self.session = Session::default();
                SessionChange::Reload
            }
            WalletEvent::Disconnected => {
                info!("Wallet provider disconnected");
                self.session = Session::default();
                SessionChange::Cleared
            }
        }
    }

    /// Caption of the connect control.
    pub fn connect_label(&self) -> String {
        match (self.is_available(), self.session.address) {
            (false, _) => "No Wallet Detected".to_string(),
            (true, Some(address)) => format!("Connected: {}", short_address(address)),
            (true, None) => "Connect Wallet".to_string(),
        }
    }
}

/// `0x1234...abcd` rendering of an address.
pub fn short_address(address: Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}
