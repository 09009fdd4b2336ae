//! Marker Model

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Geographic coordinate in decimal degrees.
///
/// Field order and the array form are `[lng, lat]` at every boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Both components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }

    /// Within `[-180, 180]` longitude and `[-90, 90]` latitude
    pub fn in_range(&self) -> bool {
        self.is_finite() && (-180.0..=180.0).contains(&self.lng) && (-90.0..=90.0).contains(&self.lat)
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

impl From<[f64; 2]> for LngLat {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

impl std::fmt::Display for LngLat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.lng, self.lat)
    }
}

/// Marker row as transmitted by the markers endpoint
///
/// `lng`/`lat` are accepted both as JSON numbers and as decimal strings,
/// since post meta is stored and echoed as text by some backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub tag: Vec<String>,
    #[serde(deserialize_with = "lenient_degrees")]
    pub lng: f64,
    #[serde(deserialize_with = "lenient_degrees")]
    pub lat: f64,
    /// Creating user; absent on legacy rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<u64>,
}

impl MarkerRecord {
    pub fn coordinate(&self) -> LngLat {
        LngLat::new(self.lng, self.lat)
    }

    /// Convert into the client-side model, rejecting rows that would
    /// break the marker invariants.
    pub fn into_marker(self) -> Result<Marker, RecordError> {
        if self.name.trim().is_empty() {
            return Err(RecordError::EmptyName { slug: self.slug });
        }
        let coordinate = self.coordinate();
        if !coordinate.is_finite() {
            return Err(RecordError::InvalidCoordinate {
                slug: self.slug,
                coordinate,
            });
        }
        Ok(Marker {
            id: self.slug,
            name: self.name,
            tags: self.tag,
            coordinate,
            owner_id: self.author.filter(|id| *id != 0),
        })
    }
}

/// Why a wire row could not become a [`Marker`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("marker '{slug}' has an empty name")]
    EmptyName { slug: String },

    #[error("marker '{slug}' has a non-finite coordinate {coordinate}")]
    InvalidCoordinate { slug: String, coordinate: LngLat },
}

/// A point of interest
///
/// Never mutated in place on the client; a changed marker is replaced
/// wholesale on the next refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Server-assigned stable identifier (the post slug)
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub coordinate: LngLat,
    /// `None` for anonymous/legacy rows
    pub owner_id: Option<u64>,
}

impl Marker {
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t == name)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Degrees {
    Number(f64),
    Text(String),
}

fn lenient_degrees<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Degrees::deserialize(deserializer)? {
        Degrees::Number(value) => Ok(value),
        Degrees::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid degrees '{text}': {e}"))),
    }
}
