//! In-memory markers endpoint for unit tests

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::{Mutex, MutexGuard};
use shared::util::slugify;
use shared::{CreateMarkerForm, CreateMarkerResponse, MarkerRecord, MarkersQuery, MarkersResponse, Tag};

use crate::http::MarkerApi;
use crate::{ClientError, ClientResult};

pub fn record(name: &str, tags: &[&str], lng: f64, lat: f64) -> MarkerRecord {
    MarkerRecord {
        name: name.to_string(),
        slug: slugify(name),
        tag: tags.iter().map(|t| t.to_string()).collect(),
        lng,
        lat,
        author: None,
    }
}

struct Entry {
    record: MarkerRecord,
    author: u64,
}

#[derive(Default)]
struct State {
    entries: Vec<Entry>,
    tags: Vec<Tag>,
    canned: VecDeque<MarkersResponse>,
    fail_fetch: bool,
    fail_create: bool,
    reject_create: bool,
    queries: Vec<MarkersQuery>,
    forms: Vec<CreateMarkerForm>,
}

/// Fake endpoint that filters like the real one: OR over tag slugs,
/// case-insensitive name search, ownership split on `user_id`.
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<State>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two owned markers for viewer 5, three from others, four tags
    pub fn seeded() -> Self {
        let api = Self::new();
        for name in ["Shop", "Hotel", "School", "Office"] {
            api.add_tag(name);
        }
        api.add_marker(5, "Corner Shop", &["Shop"], 13.40, 52.51);
        api.add_marker(5, "Home Office", &["Office"], 13.41, 52.52);
        api.add_marker(7, "Grand Hotel", &["Hotel"], 13.42, 52.53);
        api.add_marker(7, "Book Shop", &["Shop"], 13.43, 52.54);
        api.add_marker(9, "Primary School", &["School"], 13.44, 52.55);
        api
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock()
    }

    pub fn add_tag(&self, name: &str) {
        let mut state = self.lock();
        if !state.tags.iter().any(|t| t.name == name) {
            state.tags.push(Tag::new(slugify(name), name, 0));
        }
    }

    pub fn add_marker(&self, author: u64, name: &str, tags: &[&str], lng: f64, lat: f64) {
        for tag in tags {
            self.add_tag(tag);
        }
        self.lock().entries.push(Entry {
            record: record(name, tags, lng, lat),
            author,
        });
    }

    /// Answer the next fetch with this response instead of the dataset
    pub fn push_listing(&self, response: MarkersResponse) {
        self.lock().canned.push_back(response);
    }

    pub fn fail_next_fetch(&self) {
        self.lock().fail_fetch = true;
    }

    pub fn fail_next_create(&self) {
        self.lock().fail_create = true;
    }

    pub fn reject_next_create(&self) {
        self.lock().reject_create = true;
    }

    pub fn queries(&self) -> Vec<MarkersQuery> {
        self.lock().queries.clone()
    }

    pub fn forms(&self) -> Vec<CreateMarkerForm> {
        self.lock().forms.clone()
    }

    fn listing(state: &State, query: &MarkersQuery) -> MarkersResponse {
        let slug_of = |name: &str| {
            state
                .tags
                .iter()
                .find(|t| t.name == name)
                .map(|t| t.slug.clone())
                .unwrap_or_else(|| slugify(name))
        };
        let terms: Vec<String> = query
            .search
            .as_deref()
            .unwrap_or("")
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();

        let mut response = MarkersResponse::default();
        for entry in &state.entries {
            let slugs: Vec<String> = entry.record.tag.iter().map(|t| slug_of(t.as_str())).collect();
            if !query.tags.is_empty() && !slugs.iter().any(|s| query.tags.contains(s)) {
                continue;
            }
            let name = entry.record.name.to_lowercase();
            if !terms.iter().all(|t| name.contains(t.as_str())) {
                continue;
            }
            if entry.author == query.user_id {
                response.my_markers.push(entry.record.clone());
            } else {
                response.other_markers.push(entry.record.clone());
            }
        }
        response.tags = state
            .tags
            .iter()
            .map(|tag| {
                let count = state
                    .entries
                    .iter()
                    .filter(|e| e.record.tag.contains(&tag.name))
                    .count() as u32;
                Tag::new(tag.slug.clone(), tag.name.clone(), count)
            })
            .collect();
        response
    }
}

#[async_trait]
impl MarkerApi for FakeApi {
    async fn fetch_markers(&self, query: &MarkersQuery) -> ClientResult<MarkersResponse> {
        let mut state = self.lock();
        state.queries.push(query.clone());
        if std::mem::take(&mut state.fail_fetch) {
            return Err(ClientError::Internal("connection reset".into()));
        }
        if let Some(canned) = state.canned.pop_front() {
            return Ok(canned);
        }
        Ok(Self::listing(&state, query))
    }

    async fn create_marker(&self, form: &CreateMarkerForm) -> ClientResult<CreateMarkerResponse> {
        let mut state = self.lock();
        state.forms.push(form.clone());
        if std::mem::take(&mut state.fail_create) {
            return Err(ClientError::Internal("connection reset".into()));
        }
        if std::mem::take(&mut state.reject_create) {
            return Err(ClientError::Rejected("error".into()));
        }
        let tags: Vec<String> = form.effective_tag().map(str::to_string).into_iter().collect();
        for tag in &tags {
            if !state.tags.iter().any(|t| &t.name == tag) {
                state.tags.push(Tag::new(slugify(tag), tag.clone(), 0));
            }
        }
        state.entries.push(Entry {
            record: MarkerRecord {
                name: form.name.clone(),
                slug: slugify(&form.name),
                tag: tags,
                lng: form.lng,
                lat: form.lat,
                author: None,
            },
            author: form.user_id,
        });
        Ok(CreateMarkerResponse::success())
    }
}
