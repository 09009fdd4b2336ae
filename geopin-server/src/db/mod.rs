//! Storage layer
//!
//! Markers and their tag taxonomy live in memory for the lifetime of the
//! process.

pub mod repository;

pub use repository::{MarkerListing, MarkerRepository, NewMarker, RepoError, RepoResult};

/// Tags every fresh store starts with
pub const SEED_TAGS: [&str; 10] = [
    "Shop",
    "Real Estate",
    "Hospital",
    "School",
    "Restaurant",
    "Office",
    "Hotel",
    "Motel",
    "Bathroom",
    "Sport Center",
];
