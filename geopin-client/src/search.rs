//! Name search over markers
//!
//! Independent from the marker store: results come from their own fetch
//! and are rebuilt in full on every response. Matching happens on the
//! server; the client only lists what it gets back.
//!
//! Dropdown states:
//!
//! ```text
//! Hidden --(results >= 1 while focused)--> Visible
//! Visible --(empty query | outside click | selection | 0 results)--> Hidden
//! Hidden --(click on non-empty input with previous results)--> Visible
//! ```

use shared::{LngLat, MarkersQuery, MarkersResponse};

use crate::ClientError;
use crate::config::ResponseOrdering;

/// One row of the result dropdown
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub name: String,
    pub coordinate: LngLat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dropdown {
    #[default]
    Hidden,
    Visible,
}

/// An issued search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub seq: u64,
    pub query: MarkersQuery,
}

/// Result of an input change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchAction {
    /// Query was blank: results cleared, dropdown hidden, nothing to fetch
    Cleared,
    /// Fetch this query
    Fetch(SearchTicket),
}

#[derive(Debug)]
pub struct SearchIndex {
    ordering: ResponseOrdering,
    input: String,
    hits: Vec<SearchHit>,
    dropdown: Dropdown,
    focused: bool,
    issued: u64,
    applied: Option<u64>,
    /// Responses up to and including this seq are ignored
    invalidated_through: u64,
}

impl SearchIndex {
    pub fn new(ordering: ResponseOrdering) -> Self {
        Self {
            ordering,
            input: String::new(),
            hits: Vec::new(),
            dropdown: Dropdown::Hidden,
            focused: false,
            issued: 0,
            applied: None,
            invalidated_through: 0,
        }
    }

    /// The search input changed
    pub fn on_input(&mut self, text: &str, viewer_id: u64) -> SearchAction {
        self.input = text.to_string();
        self.focused = true;

        if text.trim().is_empty() {
            self.hits.clear();
            self.dropdown = Dropdown::Hidden;
            self.invalidated_through = self.issued;
            tracing::debug!("Search cleared");
            return SearchAction::Cleared;
        }

        self.issued += 1;
        SearchAction::Fetch(SearchTicket {
            seq: self.issued,
            query: MarkersQuery::search(viewer_id, text),
        })
    }

    /// Apply a search response. Returns whether it was used.
    pub fn apply(&mut self, ticket: &SearchTicket, response: &MarkersResponse) -> bool {
        if ticket.seq <= self.invalidated_through {
            tracing::debug!(seq = ticket.seq, "Ignoring search response after clear");
            return false;
        }
        if self.ordering == ResponseOrdering::LatestRequest
            && self.applied.is_some_and(|applied| ticket.seq < applied)
        {
            tracing::warn!(seq = ticket.seq, applied = ?self.applied, "Dropping stale search response");
            return false;
        }

        self.hits = response
            .rows()
            .filter(|row| row.coordinate().is_finite())
            .map(|row| SearchHit {
                name: row.name.clone(),
                coordinate: row.coordinate(),
            })
            .collect();
        self.applied = Some(ticket.seq);
        self.dropdown = if self.focused && !self.hits.is_empty() {
            Dropdown::Visible
        } else {
            Dropdown::Hidden
        };
        tracing::debug!(seq = ticket.seq, hits = self.hits.len(), "Search applied");
        true
    }

    /// Record a failed search; results stay as they were
    pub fn fail(&self, ticket: &SearchTicket, error: &ClientError) {
        tracing::error!(seq = ticket.seq, error = %error, "Search failed");
    }

    /// Click on the input itself: reopen previous results without fetching
    pub fn on_input_click(&mut self) -> bool {
        self.focused = true;
        if !self.input.is_empty() && !self.hits.is_empty() {
            self.dropdown = Dropdown::Visible;
            return true;
        }
        false
    }

    /// Click anywhere outside the search input
    pub fn on_outside_click(&mut self) {
        self.focused = false;
        self.dropdown = Dropdown::Hidden;
    }

    /// Pick a result: the input takes its name and the dropdown closes.
    /// The caller flies the map to the returned hit.
    pub fn select(&mut self, index: usize) -> Option<SearchHit> {
        let hit = self.hits.get(index).cloned()?;
        self.input = hit.name.clone();
        self.focused = false;
        self.dropdown = Dropdown::Hidden;
        Some(hit)
    }

    pub fn hits(&self) -> &[SearchHit] {
        &self.hits
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn dropdown(&self) -> Dropdown {
        self.dropdown
    }

    pub fn is_visible(&self) -> bool {
        self.dropdown == Dropdown::Visible
    }
}

impl Default for SearchIndex {
    fn default() -> Self {
        Self::new(ResponseOrdering::default())
    }
}
