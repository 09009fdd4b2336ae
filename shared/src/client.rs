//! Markers endpoint wire contract
//!
//! One endpoint, dispatched by method:
//!
//! - `GET ?tag[]=<slug>&user_id=<id>` lists markers split by ownership plus all tags
//! - `GET ?user_id=<id>&search=<text>` same shape, restricted to a name match
//! - `POST` form `user_id, name, tag, new_tag, lat, lng` creates a marker

use serde::{Deserialize, Serialize};

use crate::models::{LngLat, MarkerRecord, Tag};

/// `result` value of a successful POST
pub const RESULT_SUCCESS: &str = "success";

/// Query string parameter name for the tag filter
pub const TAG_PARAM: &str = "tag[]";

// =============================================================================
// GET
// =============================================================================

/// Query parameters of a marker listing or search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkersQuery {
    pub user_id: u64,
    /// Active tag slugs, OR semantics; empty means unfiltered
    pub tags: Vec<String>,
    pub search: Option<String>,
}

impl MarkersQuery {
    /// Listing filtered by the given tag slugs
    pub fn listing(user_id: u64, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            user_id,
            tags: tags.into_iter().map(Into::into).collect(),
            search: None,
        }
    }

    /// Name search, independent of any tag filter
    pub fn search(user_id: u64, text: impl Into<String>) -> Self {
        Self {
            user_id,
            tags: Vec::new(),
            search: Some(text.into()),
        }
    }

    /// Encode as ordered key/value pairs (`tag[]` repeated once per slug)
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> =
            self.tags.iter().map(|t| (TAG_PARAM, t.clone())).collect();
        pairs.push(("user_id", self.user_id.to_string()));
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }

    /// Decode from raw key/value pairs.
    ///
    /// Accepts `tag[]`, indexed `tag[0]` and bare `tag` keys; an unparsable
    /// `user_id` is treated as anonymous and an empty `search` as absent.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let key = key.as_ref();
            let value: String = value.into();
            match key {
                "user_id" => query.user_id = value.trim().parse().unwrap_or(0),
                "search" => query.search = (!value.is_empty()).then_some(value),
                _ if is_tag_key(key) => {
                    if !value.is_empty() && !query.tags.contains(&value) {
                        query.tags.push(value);
                    }
                }
                _ => {}
            }
        }
        query
    }
}

fn is_tag_key(key: &str) -> bool {
    key == "tag"
        || key
            .strip_prefix("tag[")
            .and_then(|rest| rest.strip_suffix(']'))
            .is_some_and(|index| index.chars().all(|c| c.is_ascii_digit()))
}

/// Listing/search response
///
/// Owned markers come before others' markers; no further order is defined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkersResponse {
    #[serde(default)]
    pub my_markers: Vec<MarkerRecord>,
    #[serde(default)]
    pub other_markers: Vec<MarkerRecord>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Current user as reported by the backend; opaque to the client
    #[serde(default)]
    pub user: serde_json::Value,
}

impl MarkersResponse {
    pub fn total(&self) -> usize {
        self.my_markers.len() + self.other_markers.len()
    }

    /// Owned rows followed by others' rows, in server order
    pub fn rows(&self) -> impl Iterator<Item = &MarkerRecord> {
        self.my_markers.iter().chain(self.other_markers.iter())
    }
}

// =============================================================================
// POST
// =============================================================================

/// Marker creation form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMarkerForm {
    pub user_id: u64,
    pub name: String,
    /// Existing tag name chosen in the prompt
    #[serde(default)]
    pub tag: String,
    /// Free-text tag; wins over `tag` when non-empty
    #[serde(default)]
    pub new_tag: String,
    pub lat: f64,
    pub lng: f64,
}

impl CreateMarkerForm {
    pub fn coordinate(&self) -> LngLat {
        LngLat::new(self.lng, self.lat)
    }

    /// Tag the marker ends up with: a non-empty `new_tag` takes precedence
    /// over the existing-tag selection.
    pub fn effective_tag(&self) -> Option<&str> {
        let new_tag = self.new_tag.trim();
        if !new_tag.is_empty() {
            return Some(new_tag);
        }
        let tag = self.tag.trim();
        (!tag.is_empty()).then_some(tag)
    }
}

/// Marker creation response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMarkerResponse {
    pub result: String,
}

impl CreateMarkerResponse {
    pub fn success() -> Self {
        Self {
            result: RESULT_SUCCESS.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result == RESULT_SUCCESS
    }
}
