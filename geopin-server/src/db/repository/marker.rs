//! Marker Repository
//!
//! Markers and tags behind one lock so a creation that introduces a new
//! tag is atomic.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::util::{slugify, unique_slug};
use shared::{LngLat, MarkerRecord, MarkersQuery, Tag};
use tokio::sync::RwLock;

use super::{RepoError, RepoResult};

#[derive(Debug, Clone)]
struct StoredMarker {
    id: u64,
    name: String,
    slug: String,
    /// Tag slugs
    tags: Vec<String>,
    at: LngLat,
    author: u64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Store {
    markers: Vec<StoredMarker>,
    /// Tags in creation order; counts are derived on read
    tags: Vec<Tag>,
    next_id: u64,
}

impl Store {
    fn tag_by_slug(&self, slug: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.slug == slug)
    }

    /// Existing tag matching `name` by name or slug, else a new one
    fn find_or_create_tag(&mut self, name: &str) -> RepoResult<Tag> {
        let slug = slugify(name);
        if let Some(tag) = self
            .tags
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name) || (!slug.is_empty() && t.slug == slug))
        {
            return Ok(tag.clone());
        }
        if slug.is_empty() {
            return Err(RepoError::Validation(format!(
                "Tag '{name}' has no usable characters"
            )));
        }
        let tag = Tag::new(slug, name, 0);
        tracing::info!(slug = %tag.slug, name = %tag.name, "Tag created");
        self.tags.push(tag.clone());
        Ok(tag)
    }

    fn record(&self, marker: &StoredMarker) -> MarkerRecord {
        MarkerRecord {
            name: marker.name.clone(),
            slug: marker.slug.clone(),
            tag: marker
                .tags
                .iter()
                .filter_map(|slug| self.tag_by_slug(slug))
                .map(|t| t.name.clone())
                .collect(),
            lng: marker.at.lng,
            lat: marker.at.lat,
            author: Some(marker.author),
        }
    }
}

/// A marker to be created
#[derive(Debug, Clone)]
pub struct NewMarker {
    pub author: u64,
    pub name: String,
    /// Tag name; created when unknown
    pub tag: Option<String>,
    pub at: LngLat,
}

/// Query result split by ownership
#[derive(Debug, Clone, Default)]
pub struct MarkerListing {
    pub my_markers: Vec<MarkerRecord>,
    pub other_markers: Vec<MarkerRecord>,
}

#[derive(Debug, Clone)]
pub struct MarkerRepository {
    store: Arc<RwLock<Store>>,
    /// Cap on rows per listing; `None` returns everything
    page_size: Option<usize>,
}

impl MarkerRepository {
    pub fn new(page_size: Option<usize>) -> Self {
        Self {
            store: Arc::new(RwLock::new(Store::default())),
            page_size,
        }
    }

    /// Insert the given tags unless they already exist
    pub async fn seed_tags(&self, names: &[&str]) -> RepoResult<()> {
        let mut store = self.store.write().await;
        for name in names {
            store.find_or_create_tag(name)?;
        }
        Ok(())
    }

    /// Create a marker, creating its tag first when needed
    pub async fn create(&self, data: NewMarker) -> RepoResult<MarkerRecord> {
        let mut store = self.store.write().await;

        let tags = match data.tag.as_deref() {
            Some(name) => vec![store.find_or_create_tag(name)?.slug],
            None => Vec::new(),
        };
        let slug = unique_slug(&slugify(&data.name), |candidate| {
            store.markers.iter().any(|m| m.slug == candidate)
        });

        store.next_id += 1;
        let marker = StoredMarker {
            id: store.next_id,
            name: data.name,
            slug,
            tags,
            at: data.at,
            author: data.author,
            created_at: Utc::now(),
        };
        let record = store.record(&marker);
        tracing::info!(
            id = marker.id,
            slug = %marker.slug,
            author = marker.author,
            at = %marker.at,
            "Marker created"
        );
        store.markers.push(marker);
        Ok(record)
    }

    /// Newest-first markers matching the tag filter (any of the slugs) and
    /// every search term, split by whether `query.user_id` authored them.
    pub async fn list(&self, query: &MarkersQuery) -> MarkerListing {
        let store = self.store.read().await;

        let terms: Vec<String> = query
            .search
            .as_deref()
            .unwrap_or("")
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();

        let mut matching: Vec<&StoredMarker> = store
            .markers
            .iter()
            .filter(|m| query.tags.is_empty() || m.tags.iter().any(|t| query.tags.contains(t)))
            .filter(|m| {
                let name = m.name.to_lowercase();
                terms.iter().all(|term| name.contains(term.as_str()))
            })
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = self.page_size {
            matching.truncate(limit);
        }

        let mut listing = MarkerListing::default();
        for marker in matching {
            let record = store.record(marker);
            if marker.author == query.user_id {
                listing.my_markers.push(record);
            } else {
                listing.other_markers.push(record);
            }
        }
        listing
    }

    /// All tags, empty ones included, most used first
    pub async fn tags_by_count(&self) -> Vec<Tag> {
        let store = self.store.read().await;
        let mut tags: Vec<Tag> = store
            .tags
            .iter()
            .map(|tag| {
                let count = store
                    .markers
                    .iter()
                    .filter(|m| m.tags.contains(&tag.slug))
                    .count() as u32;
                Tag::new(tag.slug.clone(), tag.name.clone(), count)
            })
            .collect();
        // Stable: equal counts keep creation order
        tags.sort_by(|a, b| b.count.cmp(&a.count));
        tags
    }

    pub async fn marker_count(&self) -> usize {
        self.store.read().await.markers.len()
    }
}

impl Default for MarkerRepository {
    fn default() -> Self {
        Self::new(None)
    }
}
