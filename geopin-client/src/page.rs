//! Page widgets around the map
//!
//! Search box, result dropdown, sidebar tag checklist, prompt tag choices
//! and notices. Every method has a no-op default so a host that lacks a
//! widget simply loses that feature.

use crate::filter::TagOption;
use crate::search::SearchHit;

/// Severity of a user-visible notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Inline message next to the placement prompt
    Validation(String),
    /// Banner for a failed background operation
    Error(String),
}

/// DOM-side collaborator of the map controller
pub trait PageView {
    fn show_tag_checklist(&mut self, _options: &[TagOption]) {}

    /// Tag names offered by the placement prompt; the first is preselected
    fn show_tag_choices(&mut self, _choices: &[String]) {}

    fn show_search_results(&mut self, _hits: &[SearchHit]) {}

    fn set_search_dropdown(&mut self, _visible: bool) {}

    fn set_search_text(&mut self, _text: &str) {}

    fn notify(&mut self, _notice: Notice) {}
}

/// Page with no widgets at all
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPage;

impl PageView for NoPage {}

/// In-memory page that records what it was told to display
#[derive(Debug, Default, Clone)]
pub struct HeadlessPage {
    pub checklist: Vec<TagOption>,
    pub tag_choices: Vec<String>,
    pub search_results: Vec<SearchHit>,
    pub dropdown_visible: bool,
    pub search_text: String,
    pub notices: Vec<Notice>,
}

impl HeadlessPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slugs currently rendered as checked
    pub fn checked_slugs(&self) -> Vec<&str> {
        self.checklist
            .iter()
            .filter(|o| o.checked)
            .map(|o| o.tag.slug.as_str())
            .collect()
    }
}

impl PageView for HeadlessPage {
    fn show_tag_checklist(&mut self, options: &[TagOption]) {
        self.checklist = options.to_vec();
    }

    fn show_tag_choices(&mut self, choices: &[String]) {
        self.tag_choices = choices.to_vec();
    }

    fn show_search_results(&mut self, hits: &[SearchHit]) {
        self.search_results = hits.to_vec();
    }

    fn set_search_dropdown(&mut self, visible: bool) {
        self.dropdown_visible = visible;
    }

    fn set_search_text(&mut self, text: &str) {
        self.search_text = text.to_string();
    }

    fn notify(&mut self, notice: Notice) {
        match &notice {
            Notice::Validation(message) => tracing::info!(%message, "Validation notice"),
            Notice::Error(message) => tracing::warn!(%message, "Error notice"),
        }
        self.notices.push(notice);
    }
}
