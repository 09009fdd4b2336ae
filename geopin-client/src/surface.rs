//! Map surface abstraction
//!
//! The mapping SDK is an external collaborator; the core only needs marker
//! and popup placement plus camera moves. [`HeadlessSurface`] implements the
//! trait in memory for tests and non-graphical sessions.

use std::collections::BTreeMap;

use shared::LngLat;

/// Handle of a placed visual marker, issued by the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerHandle(pub u64);

/// Handle of an open popup (info popup or placement prompt)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PopupHandle(pub u64);

/// Visual affordance of a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    /// Created by the current viewer
    Owned,
    /// Created by someone else
    Other,
}

/// Text shown in a hover popup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupContent {
    pub name: String,
    pub tags: String,
    pub lng: String,
    pub lat: String,
}

impl PopupContent {
    pub fn new(name: &str, tags: &[String], at: LngLat) -> Self {
        Self {
            name: name.to_string(),
            tags: tags.join(", "),
            lng: format!("{:.2}", at.lng),
            lat: format!("{:.2}", at.lat),
        }
    }
}

/// Marker/popup placement API of the mapping SDK
pub trait MapSurface {
    /// Position the camera without animation
    fn set_view(&mut self, center: LngLat, zoom: f64);

    /// Animate the camera to `center`
    fn fly_to(&mut self, center: LngLat);

    fn add_marker(&mut self, at: LngLat, style: MarkerStyle) -> MarkerHandle;

    fn remove_marker(&mut self, marker: MarkerHandle);

    fn show_popup(&mut self, at: LngLat, content: &PopupContent) -> PopupHandle;

    /// Open the marker placement prompt with the selectable tag names
    fn open_prompt(&mut self, at: LngLat, tag_choices: &[String]) -> PopupHandle;

    /// Close an info popup or prompt; a popup that is already closed is ignored
    fn remove_popup(&mut self, popup: PopupHandle);
}

/// A placed marker as seen by [`HeadlessSurface`]
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    pub at: LngLat,
    pub style: MarkerStyle,
}

/// What a popup slot of [`HeadlessSurface`] holds
#[derive(Debug, Clone, PartialEq)]
pub enum OpenPopup {
    Info { at: LngLat, content: PopupContent },
    Prompt { at: LngLat, tag_choices: Vec<String> },
}

/// In-memory surface
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    next_id: u64,
    markers: BTreeMap<MarkerHandle, PlacedMarker>,
    popups: BTreeMap<PopupHandle, OpenPopup>,
    center: Option<LngLat>,
    zoom: Option<f64>,
    flights: Vec<LngLat>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn markers(&self) -> impl Iterator<Item = (&MarkerHandle, &PlacedMarker)> {
        self.markers.iter()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn count_style(&self, style: MarkerStyle) -> usize {
        self.markers.values().filter(|m| m.style == style).count()
    }

    pub fn marker(&self, handle: MarkerHandle) -> Option<&PlacedMarker> {
        self.markers.get(&handle)
    }

    /// Open info popups
    pub fn info_popups(&self) -> Vec<&PopupContent> {
        self.popups
            .values()
            .filter_map(|p| match p {
                OpenPopup::Info { content, .. } => Some(content),
                OpenPopup::Prompt { .. } => None,
            })
            .collect()
    }

    /// Open prompts
    pub fn prompts(&self) -> Vec<(LngLat, &[String])> {
        self.popups
            .values()
            .filter_map(|p| match p {
                OpenPopup::Prompt { at, tag_choices } => Some((*at, tag_choices.as_slice())),
                OpenPopup::Info { .. } => None,
            })
            .collect()
    }

    pub fn center(&self) -> Option<LngLat> {
        self.center
    }

    pub fn zoom(&self) -> Option<f64> {
        self.zoom
    }

    /// Close every open prompt the way the map does on its own (map moved,
    /// close button). Returns how many were closed.
    pub fn dismiss_prompts(&mut self) -> usize {
        let before = self.popups.len();
        self.popups
            .retain(|_, popup| !matches!(popup, OpenPopup::Prompt { .. }));
        before - self.popups.len()
    }

    /// Every `fly_to` target, oldest first
    pub fn flights(&self) -> &[LngLat] {
        &self.flights
    }
}

impl MapSurface for HeadlessSurface {
    fn set_view(&mut self, center: LngLat, zoom: f64) {
        self.center = Some(center);
        self.zoom = Some(zoom);
    }

    fn fly_to(&mut self, center: LngLat) {
        tracing::debug!(%center, "fly to");
        self.center = Some(center);
        self.flights.push(center);
    }

    fn add_marker(&mut self, at: LngLat, style: MarkerStyle) -> MarkerHandle {
        let handle = MarkerHandle(self.next());
        self.markers.insert(handle, PlacedMarker { at, style });
        handle
    }

    fn remove_marker(&mut self, marker: MarkerHandle) {
        self.markers.remove(&marker);
    }

    fn show_popup(&mut self, at: LngLat, content: &PopupContent) -> PopupHandle {
        let handle = PopupHandle(self.next());
        self.popups.insert(
            handle,
            OpenPopup::Info {
                at,
                content: content.clone(),
            },
        );
        handle
    }

    fn open_prompt(&mut self, at: LngLat, tag_choices: &[String]) -> PopupHandle {
        let handle = PopupHandle(self.next());
        self.popups.insert(
            handle,
            OpenPopup::Prompt {
                at,
                tag_choices: tag_choices.to_vec(),
            },
        );
        handle
    }

    fn remove_popup(&mut self, popup: PopupHandle) {
        self.popups.remove(&popup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popup_content_formatting() {
        let content = PopupContent::new(
            "Cafe X",
            &["Food".to_string(), "Shop".to_string()],
            LngLat::new(13.4049, -52.5),
        );
        assert_eq!(content.tags, "Food, Shop");
        assert_eq!(content.lng, "13.40");
        assert_eq!(content.lat, "-52.50");
    }

    #[test]
    fn test_headless_handles_are_unique() {
        let mut surface = HeadlessSurface::new();
        let a = surface.add_marker(LngLat::new(0.0, 0.0), MarkerStyle::Owned);
        let b = surface.add_marker(LngLat::new(0.0, 0.0), MarkerStyle::Other);
        assert_ne!(a, b);
        surface.remove_marker(a);
        assert_eq!(surface.marker_count(), 1);
        assert_eq!(surface.count_style(MarkerStyle::Other), 1);
    }

    #[test]
    fn test_dismiss_prompts_keeps_info_popups() {
        let mut surface = HeadlessSurface::new();
        let at = LngLat::new(13.4, 52.5);
        surface.show_popup(at, &PopupContent::new("Cafe X", &[], at));
        let prompt = surface.open_prompt(at, &["Shop".to_string()]);

        assert_eq!(surface.dismiss_prompts(), 1);
        assert!(surface.prompts().is_empty());
        assert_eq!(surface.info_popups().len(), 1);

        // Already closed by the map
        surface.remove_popup(prompt);
        assert_eq!(surface.info_popups().len(), 1);
    }
}
