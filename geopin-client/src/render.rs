//! Map renderer
//!
//! Sole owner of the visible marker set. Every [`MapRenderer::render`]
//! clears all previously placed markers before placing the new set, so
//! repeated renders never accumulate visuals. Marker identity (and any
//! open hover popup) does not survive a render.

use shared::{LngLat, Marker};

use crate::surface::{MapSurface, MarkerHandle, MarkerStyle, PopupContent, PopupHandle};

#[derive(Debug)]
struct Visual {
    handle: MarkerHandle,
    at: LngLat,
    content: PopupContent,
}

/// Reconciles marker data onto a [`MapSurface`]
#[derive(Debug)]
pub struct MapRenderer<S> {
    surface: S,
    visible: Vec<Visual>,
    /// At most one hover popup, keyed by the marker it belongs to
    hover: Option<(MarkerHandle, PopupHandle)>,
    prompt: Option<PopupHandle>,
}

impl<S: MapSurface> MapRenderer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            visible: Vec::new(),
            hover: None,
            prompt: None,
        }
    }

    /// Rebuild the visible set. Owned markers are always placed; others
    /// only when `mine_only` is off.
    pub fn render(&mut self, owned: &[Marker], others: &[Marker], mine_only: bool) {
        self.clear();
        for marker in owned {
            self.place(marker.coordinate, MarkerStyle::Owned, &marker.name, &marker.tags);
        }
        if !mine_only {
            for marker in others {
                self.place(marker.coordinate, MarkerStyle::Other, &marker.name, &marker.tags);
            }
        }
        tracing::debug!(
            visible = self.visible.len(),
            mine_only,
            "Map rendered"
        );
    }

    /// Place a single marker ahead of the next full render
    pub fn place_optimistic(&mut self, at: LngLat, name: &str, tags: &[String]) -> MarkerHandle {
        let handle = self.place(at, MarkerStyle::Owned, name, tags);
        tracing::debug!(?handle, %at, name, "Optimistic marker placed");
        handle
    }

    /// Remove one marker if it is still visible
    pub fn discard(&mut self, handle: MarkerHandle) -> bool {
        let Some(index) = self.visible.iter().position(|v| v.handle == handle) else {
            return false;
        };
        if self.hover.is_some_and(|(owner, _)| owner == handle) {
            self.hide_hover();
        }
        let visual = self.visible.remove(index);
        self.surface.remove_marker(visual.handle);
        true
    }

    fn place(&mut self, at: LngLat, style: MarkerStyle, name: &str, tags: &[String]) -> MarkerHandle {
        let handle = self.surface.add_marker(at, style);
        self.visible.push(Visual {
            handle,
            at,
            content: PopupContent::new(name, tags, at),
        });
        handle
    }

    fn clear(&mut self) {
        self.hide_hover();
        for visual in self.visible.drain(..) {
            self.surface.remove_marker(visual.handle);
        }
    }

    // ========== Hover popups ==========

    /// Pointer entered a marker: show its info popup, replacing any other
    pub fn pointer_enter(&mut self, handle: MarkerHandle) {
        let Some(visual) = self.visible.iter().find(|v| v.handle == handle) else {
            tracing::debug!(?handle, "Pointer enter on unknown marker");
            return;
        };
        if self.hover.is_some_and(|(owner, _)| owner == handle) {
            return;
        }
        let (at, content) = (visual.at, visual.content.clone());
        self.hide_hover();
        let popup = self.surface.show_popup(at, &content);
        self.hover = Some((handle, popup));
    }

    /// Pointer left a marker: hide its popup if it is the one showing
    pub fn pointer_leave(&mut self, handle: MarkerHandle) {
        if self.hover.is_some_and(|(owner, _)| owner == handle) {
            self.hide_hover();
        }
    }

    fn hide_hover(&mut self) {
        if let Some((_, popup)) = self.hover.take() {
            self.surface.remove_popup(popup);
        }
    }

    // ========== Prompt & camera ==========

    /// Open the placement prompt, replacing a previous one
    pub fn open_prompt(&mut self, at: LngLat, tag_choices: &[String]) {
        self.close_prompt();
        self.prompt = Some(self.surface.open_prompt(at, tag_choices));
    }

    pub fn close_prompt(&mut self) {
        if let Some(prompt) = self.prompt.take() {
            self.surface.remove_popup(prompt);
        }
    }

    /// The surface closed the prompt on its own (e.g. the map moved).
    /// The handle is still released in case the surface left it behind.
    pub fn forget_prompt(&mut self) {
        if let Some(prompt) = self.prompt.take() {
            tracing::debug!(?prompt, "Placement prompt closed by the map");
            self.surface.remove_popup(prompt);
        }
    }

    pub fn set_view(&mut self, center: LngLat, zoom: f64) {
        self.surface.set_view(center, zoom);
    }

    pub fn fly_to(&mut self, center: LngLat) {
        self.surface.fly_to(center);
    }

    // ========== Introspection ==========

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Handles of visible markers in placement order
    pub fn visible_handles(&self) -> Vec<MarkerHandle> {
        self.visible.iter().map(|v| v.handle).collect()
    }

    /// Marker whose hover popup is showing
    pub fn hovered(&self) -> Option<MarkerHandle> {
        self.hover.map(|(owner, _)| owner)
    }

    pub fn has_prompt(&self) -> bool {
        self.prompt.is_some()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}
