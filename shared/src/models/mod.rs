//! Data models
//!
//! Shared between the marker endpoint and the map client (via API).
//! Coordinates are always carried as `[lng, lat]`.

pub mod marker;
pub mod tag;

// Re-exports
pub use marker::*;
pub use tag::*;
