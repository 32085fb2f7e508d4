//! Page-by-page reveal of a result set.

use crate::{result::ResultSet, BalanceEntry, TokenView};

/// Cursor over a prefix-growing slice of a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,
    current_page: usize,
    displayed: usize,
}

impl Pager {
    /// Cursor positioned on the first page of `total` entries.
    pub fn new(page_size: usize, total: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            page_size,
            current_page: 1,
            displayed: page_size.min(total),
        }
    }

    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    /// Number of entries revealed so far.
    pub const fn displayed(&self) -> usize {
        self.displayed
    }

    /// Reveal the next page. Returns false, leaving the cursor untouched,
    /// when everything is already displayed.
    pub fn load_more(&mut self, total: usize) -> bool {
        if self.displayed >= total {
            return false;
        }

        self.displayed = (self.displayed + self.page_size).min(total);
        self.current_page += 1;
        true
    }
}

/// Where a listing stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStatus {
    /// More entries can be loaded
    More { remaining: usize },
    /// Every entry is displayed
    Complete { total: usize },
}

/// A result set together with its page cursor.
#[derive(Debug, Clone)]
pub struct Listing {
    results: ResultSet,
    pager: Pager,
}

impl Listing {
    /// Start a listing on the first page.
    pub fn new(results: ResultSet, page_size: usize) -> Self {
        let pager = Pager::new(page_size, results.len());
        Self { results, pager }
    }

    pub const fn results(&self) -> &ResultSet {
        &self.results
    }

    pub const fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub const fn current_page(&self) -> usize {
        self.pager.current_page()
    }

    /// Entries revealed so far, in fetch order.
    pub fn displayed(&self) -> &[BalanceEntry] {
        &self.results.balances()[..self.pager.displayed()]
    }

    pub fn remaining(&self) -> usize {
        self.total() - self.pager.displayed()
    }

    pub fn has_more(&self) -> bool {
        self.remaining() > 0
    }

    /// Reveal the next page; false if there was nothing left.
    pub fn load_more(&mut self) -> bool {
        let total = self.total();
        self.pager.load_more(total)
    }

    pub fn status(&self) -> ListingStatus {
        match self.remaining() {
            0 => ListingStatus::Complete {
                total: self.total(),
            },
            remaining => ListingStatus::More { remaining },
        }
    }

    /// Displayed entries joined with their metadata.
    pub fn views(&self) -> impl Iterator<Item = TokenView<'_>> {
        self.displayed()
            .iter()
            .map(move |entry| self.results.view(entry))
    }
}
