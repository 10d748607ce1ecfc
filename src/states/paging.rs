//! Paging State
//!
//! The cursor over a server-paged collection and the request parameters
//! derived from it.

use serde::Serialize;

/// Parameters of one paged collection request
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RequestParams {
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_value: Option<String>,
}

/// Build the parameters of the next fetch from the cursor
///
/// Mirrors the cursor exactly. `page` is not clamped against `total`, which
/// may be stale when this runs; see [`PagingState::clamp_current`].
pub fn build_request_params(state: &PagingState) -> RequestParams {
    RequestParams {
        page: state.current,
        page_size: state.page_size,
        search_value: state.search_value.clone(),
    }
}

impl From<&PagingState> for RequestParams {
    fn from(state: &PagingState) -> Self {
        build_request_params(state)
    }
}

/// Paging cursor of one tree view
///
/// `current` and `page_size` are always at least 1. `total` stays `None`
/// until the first response arrives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PagingState {
    current: u32,
    total: Option<u64>,
    page_size: u32,
    search_value: Option<String>,
}

impl PagingState {
    pub fn new(page_size: u32) -> Self {
        Self {
            current: 1,
            total: None,
            page_size: page_size.max(1),
            search_value: None,
        }
    }

    // ==================== Getters ====================

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn search_value(&self) -> Option<&str> {
        self.search_value.as_deref()
    }

    /// Number of pages implied by the last known total
    pub fn total_pages(&self) -> Option<u32> {
        self.total.map(|total| {
            let pages = total.div_ceil(u64::from(self.page_size)).max(1);
            u32::try_from(pages).unwrap_or(u32::MAX)
        })
    }

    /// Whether a page after the current one exists (assumed while total is unknown)
    pub fn has_next_page(&self) -> bool {
        self.total_pages().is_none_or(|pages| self.current < pages)
    }

    pub fn has_previous_page(&self) -> bool {
        self.current > 1
    }

    // ==================== Setters ====================

    /// Move to `page` (pages below 1 become 1)
    pub fn set_page(&mut self, page: u32) {
        self.current = page.max(1);
    }

    pub fn next_page(&mut self) -> bool {
        if !self.has_next_page() {
            return false;
        }
        self.current = self.current.saturating_add(1);
        true
    }

    pub fn previous_page(&mut self) -> bool {
        if !self.has_previous_page() {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Change the search filter; a different filter starts over at page 1
    ///
    /// Blank terms clear the filter. Returns whether the filter changed.
    pub fn set_search(&mut self, search: Option<String>) -> bool {
        let search = search.filter(|s| !s.trim().is_empty());
        if search == self.search_value {
            return false;
        }
        self.search_value = search;
        self.current = 1;
        true
    }

    /// Pull `current` back onto the last page of the known total
    pub fn clamp_current(&mut self) {
        if let Some(pages) = self.total_pages() {
            self.current = self.current.min(pages);
        }
    }

    /// Accept the total reported by the latest response
    pub(crate) fn set_total(&mut self, total: u64) {
        self.total = Some(total);
    }
}
