//! Geopin Client - interactive map over the markers endpoint
//!
//! The [`MapController`] drives everything: it loads markers through a
//! [`MarkerApi`], renders them onto a [`MapSurface`] and keeps the page
//! widgets ([`PageView`]) in sync with the tag filter, name search and the
//! click-to-place flow.

pub mod config;
pub mod controller;
pub mod creation;
pub mod error;
pub mod filter;
pub mod http;
pub mod page;
pub mod render;
pub mod search;
pub mod store;
pub mod surface;

#[cfg(test)]
mod test_support;

pub use config::{ClientConfig, ResponseOrdering};
pub use controller::{Completion, MapController, UiEvent};
pub use creation::{CreationError, CreationState, MarkerCreationFlow, PromptInput};
pub use error::{ClientError, ClientResult};
pub use filter::{TagFilterState, TagOption};
pub use http::{MarkerApi, NetworkMarkerApi};
pub use page::{HeadlessPage, NoPage, Notice, PageView};
pub use render::MapRenderer;
pub use search::{Dropdown, SearchHit, SearchIndex};
pub use store::{MarkerSnapshot, MarkerStore, RefreshOutcome};
pub use surface::{HeadlessSurface, MapSurface, MarkerHandle, MarkerStyle, PopupContent, PopupHandle};

// Re-export shared types for convenience
pub use shared::{LngLat, Marker, MarkersQuery, MarkersResponse, Tag};
