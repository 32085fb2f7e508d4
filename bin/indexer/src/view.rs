//! Plain-text rendering of the app state.

use crate::app::{App, Validity};
use std::fmt::Write;
use token::{Listing, ListingStatus, TokenView};

pub const TITLE: &str = "ERC-20 Token Indexer";
pub const PROMPT: &str = "Please make a query! This may take a few seconds...";
pub const LOADING: &str = "Loading...";

/// Footer line describing where the listing stands.
pub fn status_line(listing: &Listing) -> String {
    match listing.status() {
        ListingStatus::More { remaining } => format!("Load More Tokens ({remaining} remaining)"),
        ListingStatus::Complete { total } => format!("All tokens loaded ({total} total)"),
    }
}

/// One line per token: symbol, balance and the logo when there is one.
pub fn token_line(view: &TokenView<'_>) -> String {
    let mut line = format!("{:<10} {}", view.symbol, view.balance);
    if let Some(logo) = view.logo_url {
        let _ = write!(line, "  [{logo}]");
    }
    line
}

/// Marker shown next to the address field.
pub const fn validity_marker(validity: &Validity) -> &'static str {
    match validity {
        Validity::Unset => "",
        Validity::Valid => " ✓",
        Validity::Invalid(_) => " ⚠ invalid address",
    }
}

/// Render the whole screen.
pub fn render(app: &App) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{TITLE}");
    let _ = writeln!(out, "[{}]", app.wallet().connect_label());
    let _ = writeln!(
        out,
        "Address: {}{}",
        app.input().text(),
        validity_marker(app.input().validity())
    );

    if let Some(error) = app.last_error() {
        let _ = writeln!(out, "Error: {error}");
    }

    if app.is_loading() {
        let _ = writeln!(out, "{LOADING}");
    }

    match app.listing() {
        Some(listing) => {
            let _ = writeln!(out, "Page {}", listing.current_page());
            for view in listing.views() {
                let _ = writeln!(out, "{}", token_line(&view));
            }
            let _ = writeln!(out, "{}", status_line(listing));
        }
        None if !app.is_loading() => {
            let _ = writeln!(out, "{PROMPT}");
        }
        None => {}
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    #[test]
    fn test_token_line_omits_missing_logo() {
        let view = TokenView {
            contract_address: Address::ZERO,
            symbol: "N/A",
            decimals: 18,
            balance: "0.0".to_string(),
            logo_url: None,
        };
        assert_eq!(token_line(&view), "N/A        0.0");

        let view = TokenView {
            logo_url: Some("https://logo/usdc.png"),
            ..view
        };
        assert!(token_line(&view).ends_with("[https://logo/usdc.png]"));
    }

    #[test]
    fn test_validity_marker() {
        assert_eq!(validity_marker(&Validity::Unset), "");
        assert!(validity_marker(&Validity::Invalid(token::AddressError::MissingPrefix))
            .contains("invalid"));
    }

    #[test]
    fn test_fresh_app_prompts_for_query() {
        let app = App::new(wallet::SessionManager::new(None), 18);
        let screen = render(&app);

        assert!(screen.contains("[No Wallet Detected]"));
        assert!(screen.contains(PROMPT));
        assert!(!screen.contains(LOADING));
    }
}
