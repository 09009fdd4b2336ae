//! Shared types for geopin
//!
//! Data model and wire contract used by both the map client and the
//! marker endpoint: coordinates, markers, tags and the request/response
//! shapes of the single method-dispatched markers endpoint.

pub mod client;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use client::{
    CreateMarkerForm, CreateMarkerResponse, MarkersQuery, MarkersResponse, RESULT_SUCCESS,
};
pub use models::{LngLat, Marker, MarkerRecord, RecordError, Tag};
