//! In-memory marker store
//!
//! Holds the last-known-good marker lists and tag list. A refresh is split
//! into issuing a [`RefreshTicket`] and applying its response, so several
//! refreshes may be in flight at once; see [`ResponseOrdering`] for how
//! overlapping responses are resolved.

use shared::{Marker, MarkerRecord, MarkersQuery, MarkersResponse, Tag};

use crate::config::ResponseOrdering;
use crate::filter::TagFilterState;
use crate::http::MarkerApi;
use crate::{ClientError, ClientResult};

/// A refresh that has been issued but not yet applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    pub seq: u64,
    pub query: MarkersQuery,
}

/// What happened to a refresh response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Replaced the store contents
    Applied,
    /// A newer response was already applied; this one was dropped
    Stale,
}

/// Markers partitioned by ownership, plus the tag list of the same fetch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerSnapshot {
    pub owned: Vec<Marker>,
    pub others: Vec<Marker>,
    pub tags: Vec<Tag>,
}

impl MarkerSnapshot {
    /// Build from a listing response, skipping rows that cannot be shown
    pub fn from_response(response: MarkersResponse, viewer_id: u64) -> Self {
        let owner = (viewer_id != 0).then_some(viewer_id);
        let owned = convert_rows(response.my_markers, owner);
        let others = convert_rows(response.other_markers, None);
        Self {
            owned,
            others,
            tags: response.tags,
        }
    }

    pub fn len(&self) -> usize {
        self.owned.len() + self.others.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn convert_rows(rows: Vec<MarkerRecord>, owner: Option<u64>) -> Vec<Marker> {
    rows.into_iter()
        .filter_map(|row| match row.into_marker() {
            Ok(mut marker) => {
                if marker.owner_id.is_none() {
                    marker.owner_id = owner;
                }
                Some(marker)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping marker row");
                None
            }
        })
        .collect()
}

/// Client-side marker store
#[derive(Debug)]
pub struct MarkerStore {
    ordering: ResponseOrdering,
    snapshot: MarkerSnapshot,
    issued: u64,
    applied: Option<u64>,
}

impl MarkerStore {
    pub fn new(ordering: ResponseOrdering) -> Self {
        Self {
            ordering,
            snapshot: MarkerSnapshot::default(),
            issued: 0,
            applied: None,
        }
    }

    /// Issue a refresh for the current filter
    pub fn begin_refresh(&mut self, filter: &TagFilterState, viewer_id: u64) -> RefreshTicket {
        self.issued += 1;
        let ticket = RefreshTicket {
            seq: self.issued,
            query: MarkersQuery::listing(viewer_id, filter.slugs().iter().cloned()),
        };
        tracing::debug!(seq = ticket.seq, tags = ?ticket.query.tags, "Marker refresh issued");
        ticket
    }

    /// Apply a successful response. The swap is all-or-nothing.
    pub fn apply(&mut self, ticket: &RefreshTicket, response: MarkersResponse) -> RefreshOutcome {
        if self.ordering == ResponseOrdering::LatestRequest
            && self.applied.is_some_and(|applied| ticket.seq < applied)
        {
            tracing::warn!(
                seq = ticket.seq,
                applied = ?self.applied,
                "Dropping stale marker refresh"
            );
            return RefreshOutcome::Stale;
        }

        self.snapshot = MarkerSnapshot::from_response(response, ticket.query.user_id);
        self.applied = Some(ticket.seq);
        tracing::debug!(
            seq = ticket.seq,
            owned = self.snapshot.owned.len(),
            others = self.snapshot.others.len(),
            tags = self.snapshot.tags.len(),
            "Marker refresh applied"
        );
        RefreshOutcome::Applied
    }

    /// Record a failed refresh; the store keeps its last-known-good state
    pub fn fail(&self, ticket: &RefreshTicket, error: &ClientError) {
        tracing::error!(seq = ticket.seq, error = %error, "Marker refresh failed");
    }

    /// Issue, fetch and apply in one go
    pub async fn refresh(
        &mut self,
        api: &dyn MarkerApi,
        filter: &TagFilterState,
        viewer_id: u64,
    ) -> ClientResult<RefreshOutcome> {
        let ticket = self.begin_refresh(filter, viewer_id);
        match api.fetch_markers(&ticket.query).await {
            Ok(response) => Ok(self.apply(&ticket, response)),
            Err(e) => {
                self.fail(&ticket, &e);
                Err(e)
            }
        }
    }

    pub fn snapshot(&self) -> &MarkerSnapshot {
        &self.snapshot
    }

    pub fn owned(&self) -> &[Marker] {
        &self.snapshot.owned
    }

    pub fn others(&self) -> &[Marker] {
        &self.snapshot.others
    }

    pub fn tags(&self) -> &[Tag] {
        &self.snapshot.tags
    }

    /// Whether any refresh has been applied yet
    pub fn is_loaded(&self) -> bool {
        self.applied.is_some()
    }

    /// Sequence number of the applied snapshot
    pub fn applied_seq(&self) -> Option<u64> {
        self.applied
    }
}

impl Default for MarkerStore {
    fn default() -> Self {
        Self::new(ResponseOrdering::default())
    }
}
