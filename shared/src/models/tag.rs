//! Tag Model

use serde::{Deserialize, Serialize};

/// Tag entity
///
/// `count` is computed by the server at fetch time and may be stale
/// between fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub count: u32,
}

impl Tag {
    pub fn new(slug: impl Into<String>, name: impl Into<String>, count: u32) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            count,
        }
    }

    /// Sidebar label, e.g. `Shop ( 3 )`
    pub fn label(&self) -> String {
        format!("{} ( {} )", self.name, self.count)
    }
}
