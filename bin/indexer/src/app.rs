//! Application state.
//!
//! [`App`] is the single owned context of a running indexer: the wallet
//! session, the typed address, the loading flag and the current listing.
//! Asynchronous work (wallet authorization, token queries) runs outside of it
//! and is applied back through the `finish_*` transitions.

use crate::metrics::Metrics;
use alloy_primitives::Address;
use std::{sync::Arc, time::Instant};
use thiserror::Error;
use token::{
    fetch_result_set, validate, AddressError, BalanceSource, Listing, MetadataSource,
    QueryError, ResultSet,
};
use tracing::{debug, error, info};
use wallet::{SessionChange, SessionManager, WalletError, WalletEvent, WalletProvider};

/// Live verdict on the typed address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validity {
    /// Nothing typed
    Unset,
    Valid,
    Invalid(AddressError),
}

/// The address field.
#[derive(Debug, Clone)]
pub struct AddressInput {
    text: String,
    active: Option<Address>,
    validity: Validity,
}

impl Default for AddressInput {
    fn default() -> Self {
        Self {
            text: String::new(),
            active: None,
            validity: Validity::Unset,
        }
    }
}

impl AddressInput {
    /// Replace the typed text and re-validate it. Invalid text never replaces
    /// the active address.
    pub fn update(&mut self, text: impl Into<String>) -> &Validity {
        self.text = text.into();

        self.validity = if self.text.trim().is_empty() {
            Validity::Unset
        } else {
            match validate(&self.text) {
                Ok(address) => {
                    self.active = Some(address);
                    Validity::Valid
                }
                Err(e) => Validity::Invalid(e),
            }
        };

        &self.validity
    }

    /// Fill the field with a wallet-provided address.
    pub fn seed(&mut self, address: Address) {
        self.text = address.to_string();
        self.active = Some(address);
        self.validity = Validity::Valid;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Last valid address typed or seeded.
    pub const fn active(&self) -> Option<Address> {
        self.active
    }

    pub const fn validity(&self) -> &Validity {
        &self.validity
    }

    /// Validate the current text again, as a query is about to use it.
    pub fn revalidate(&self) -> Result<Address, AddressError> {
        validate(&self.text)
    }
}

/// Why a query trigger was refused before any request went out.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryRejected {
    #[error("A query is already in progress")]
    InFlight,

    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] AddressError),
}

/// Single owned state of a running indexer.
pub struct App {
    wallet: SessionManager,
    input: AddressInput,
    page_size: usize,
    loading: bool,
    query_started: Option<Instant>,
    listing: Option<Listing>,
    last_error: Option<String>,
    metrics: Metrics,
}

impl App {
    pub fn new(wallet: SessionManager, page_size: usize) -> Self {
        Self {
            wallet,
            input: AddressInput::default(),
            page_size,
            loading: false,
            query_started: None,
            listing: None,
            last_error: None,
            metrics: Metrics::new(),
        }
    }

    pub const fn wallet(&self) -> &SessionManager {
        &self.wallet
    }

    pub const fn input(&self) -> &AddressInput {
        &self.input
    }

    pub const fn listing(&self) -> Option<&Listing> {
        self.listing.as_ref()
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether a result set is available for display.
    pub const fn has_queried(&self) -> bool {
        self.listing.is_some()
    }

    /// Most recent user-facing failure, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Address input
    // ─────────────────────────────────────────────────────────────────────────────

    /// Handle an edit of the address field.
    pub fn set_address_text(&mut self, text: impl Into<String>) -> &Validity {
        self.input.update(text)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Wallet
    // ─────────────────────────────────────────────────────────────────────────────

    /// Provider to request accounts from, or `ProviderUnavailable`.
    pub fn begin_connect(&mut self) -> Result<Arc<dyn WalletProvider>, WalletError> {
        self.wallet.begin_connect().inspect_err(|e| {
            info!("Connect requested without a wallet");
            self.last_error = Some(e.to_string());
        })
    }

    /// Apply the outcome of an account request.
    pub fn finish_connect(
        &mut self,
        outcome: Result<Vec<Address>, WalletError>,
    ) -> Result<Address, WalletError> {
        match self.wallet.finish_connect(outcome) {
            Ok(address) => {
                self.input.seed(address);
                self.last_error = None;
                Ok(address)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Request wallet accounts and seed the address field with the first.
    pub async fn connect(&mut self) -> Result<Address, WalletError> {
        let provider = self.begin_connect()?;
        let outcome = provider.request_accounts().await;
        self.finish_connect(outcome)
    }

    /// Local disconnect: clears the session and the address field.
    pub fn disconnect(&mut self) {
        self.wallet.disconnect();
        self.input.clear();
    }

    /// Apply a wallet event.
    pub fn handle_wallet_event(&mut self, event: WalletEvent) -> SessionChange {
        self.metrics.record_wallet_event(match &event {
            WalletEvent::AccountsChanged(_) => "accounts_changed",
            WalletEvent::ChainChanged(_) => "chain_changed",
            WalletEvent::Disconnected => "disconnected",
        });

        let change = self.wallet.handle_event(event);
        match change {
            SessionChange::Connected(address) => self.input.seed(address),
            SessionChange::Cleared => self.input.clear(),
            SessionChange::Reload => self.reload(),
        }
        change
    }

    /// Discard all in-memory state, as after a fresh start.
    pub fn reload(&mut self) {
        info!("Reloading: discarding session, input and results");
        self.wallet.disconnect();
        self.input.clear();
        self.loading = false;
        self.query_started = None;
        self.listing = None;
        self.last_error = None;
        self.metrics.set_tokens_total(0);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Token query
    // ─────────────────────────────────────────────────────────────────────────────

    /// Start a query for the typed address and enter the loading state.
    pub fn begin_query(&mut self) -> Result<Address, QueryRejected> {
        if self.loading {
            debug!("Query ignored, another one is in flight");
            self.metrics.record_query_rejected("in_flight");
            return Err(QueryRejected::InFlight);
        }

        let owner = self.input.revalidate().map_err(|e| {
            debug!(input = %self.input.text(), error = %e, "Query refused for invalid address");
            self.metrics.record_query_rejected("invalid_address");
            QueryRejected::from(e)
        })?;

        info!(owner = %owner, "Querying token balances");
        self.loading = true;
        self.query_started = Some(Instant::now());
        self.metrics.record_query_started();
        Ok(owner)
    }

    /// Leave the loading state and apply the query outcome.
    ///
    /// A success replaces the listing and shows its first page. A failure
    /// keeps the previous listing as it was.
    pub fn finish_query(
        &mut self,
        outcome: Result<ResultSet, QueryError>,
    ) -> Result<usize, QueryError> {
        self.loading = false;
        let elapsed = self
            .query_started
            .take()
            .map(|started| started.elapsed())
            .unwrap_or_default();
        self.metrics.record_query(outcome.is_ok(), elapsed);

        match outcome {
            Ok(results) => {
                let total = results.len();
                self.listing = Some(Listing::new(results, self.page_size));
                self.last_error = None;
                self.metrics.set_tokens_total(total);
                info!(total, "Token balances loaded");
                Ok(total)
            }
            Err(e) => {
                error!(error = %e, "Error fetching token balances");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Validate, fetch and apply a query in one go.
    pub async fn run_query<B, M>(&mut self, balances: &B, metadata: &M) -> eyre::Result<usize>
    where
        B: BalanceSource,
        M: MetadataSource,
    {
        let owner = self.begin_query()?;
        let outcome = fetch_result_set(balances, metadata, owner).await;
        Ok(self.finish_query(outcome)?)
    }

    /// Reveal the next page of the listing; false if nothing was left.
    pub fn load_more(&mut self) -> bool {
        let loaded = self
            .listing
            .as_mut()
            .is_some_and(|listing| listing.load_more());
        if loaded {
            self.metrics.record_load_more();
        }
        loaded
    }
}
