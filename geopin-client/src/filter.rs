//! Active tag filter

use shared::Tag;

/// One row of the sidebar tag checklist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOption {
    pub tag: Tag,
    pub checked: bool,
}

/// Set of active tag slugs, kept in toggle order.
///
/// Filtering itself runs on the server with OR semantics; an empty set
/// means no filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilterState {
    active: Vec<String>,
}

impl TagFilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `slug` if absent, remove it if present. Returns whether the
    /// slug is active afterwards.
    pub fn toggle(&mut self, slug: &str) -> bool {
        if let Some(index) = self.active.iter().position(|s| s == slug) {
            self.active.remove(index);
            false
        } else {
            self.active.push(slug.to_string());
            true
        }
    }

    /// Force a slug on or off (checkbox semantics)
    pub fn set(&mut self, slug: &str, checked: bool) {
        if self.is_active(slug) != checked {
            self.toggle(slug);
        }
    }

    pub fn is_active(&self, slug: &str) -> bool {
        self.active.iter().any(|s| s == slug)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn slugs(&self) -> &[String] {
        &self.active
    }

    /// Active slugs that no longer appear in `tags`. They are kept and
    /// still sent, the server simply matches nothing for them.
    pub fn stale_slugs<'a>(&'a self, tags: &'a [Tag]) -> impl Iterator<Item = &'a str> + 'a {
        self.active
            .iter()
            .filter(|slug| !tags.iter().any(|t| &t.slug == *slug))
            .map(String::as_str)
    }

    /// Checklist rows for the given tag list, in tag-list order
    pub fn checklist(&self, tags: &[Tag]) -> Vec<TagOption> {
        tags.iter()
            .map(|tag| TagOption {
                tag: tag.clone(),
                checked: self.is_active(&tag.slug),
            })
            .collect()
    }
}
