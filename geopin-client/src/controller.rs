//! Map controller
//!
//! Owns the whole application state (store, filter, search, renderer,
//! creation flow, page) and is the only place where UI events and network
//! completions are applied. Network calls run as spawned tasks that report
//! back through a channel, so the UI side never blocks and overlapping
//! requests are possible; each component decides how a late response is
//! resolved (see [`ResponseOrdering`](crate::ResponseOrdering)).

use std::future::Future;
use std::sync::Arc;

use shared::{CreateMarkerResponse, LngLat, MarkersResponse};
use tokio::sync::mpsc;

use crate::creation::{CreationState, MarkerCreationFlow, PromptInput};
use crate::filter::TagFilterState;
use crate::http::MarkerApi;
use crate::page::{Notice, PageView};
use crate::render::MapRenderer;
use crate::search::{SearchAction, SearchIndex, SearchTicket};
use crate::store::{MarkerStore, RefreshOutcome, RefreshTicket};
use crate::surface::{MapSurface, MarkerHandle};
use crate::{ClientConfig, ClientResult};

/// User interaction delivered by the host page or map surface
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Sidebar checkbox for a tag slug changed
    TagToggled(String),
    /// "Mine only" checkbox changed
    MineOnlyChanged(bool),
    /// Search input text changed
    SearchInput(String),
    /// Click on the search input itself
    SearchInputClicked,
    /// Click anywhere else on the page
    OutsideClicked,
    /// Click on the n-th search result
    SearchResultSelected(usize),
    MapClicked(LngLat),
    PromptSubmitted(PromptInput),
    PromptCancelled,
    /// The surface closed the prompt by itself
    PromptClosed,
    MarkerPointerEnter(MarkerHandle),
    MarkerPointerLeave(MarkerHandle),
}

/// A finished network task
#[derive(Debug)]
pub enum Completion {
    Refresh {
        ticket: RefreshTicket,
        render: bool,
        result: ClientResult<MarkersResponse>,
    },
    Search {
        ticket: SearchTicket,
        result: ClientResult<MarkersResponse>,
    },
    Created {
        result: ClientResult<CreateMarkerResponse>,
    },
}

pub struct MapController<S, V> {
    config: ClientConfig,
    api: Arc<dyn MarkerApi>,
    store: MarkerStore,
    filter: TagFilterState,
    search: SearchIndex,
    renderer: MapRenderer<S>,
    creation: Option<MarkerCreationFlow>,
    page: V,
    mine_only: bool,
    /// Newest refresh that must be followed by a render
    owed_render: Option<u64>,
    in_flight: usize,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<S: MapSurface, V: PageView> MapController<S, V> {
    pub fn new(config: ClientConfig, api: Arc<dyn MarkerApi>, surface: S, page: V) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            store: MarkerStore::new(config.ordering),
            search: SearchIndex::new(config.ordering),
            creation: MarkerCreationFlow::for_viewer(config.user_id),
            filter: TagFilterState::new(),
            renderer: MapRenderer::new(surface),
            page,
            mine_only: false,
            owed_render: None,
            in_flight: 0,
            completions_tx,
            completions_rx,
            config,
            api,
        }
    }

    /// Position the map and issue the initial unfiltered load
    pub fn start(&mut self) {
        tracing::info!(
            endpoint = %self.config.endpoint,
            user_id = self.config.user_id,
            "Map session starting"
        );
        self.renderer.set_view(self.config.center, self.config.zoom);
        self.request_refresh(true);
    }

    // ========== Event loop ==========

    /// Process UI events and completions until the event channel closes
    pub async fn run(&mut self, mut events: mpsc::Receiver<UiEvent>) {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle(event),
                    None => break,
                },
                Some(completion) = self.completions_rx.recv() => self.apply(completion),
            }
        }
        tracing::info!(in_flight = self.in_flight, "Map session event channel closed");
    }

    /// Wait for the next finished network task
    pub async fn next_completion(&mut self) -> Option<Completion> {
        if self.in_flight == 0 {
            return None;
        }
        self.completions_rx.recv().await
    }

    /// Apply completions until nothing is in flight
    pub async fn settle(&mut self) {
        while let Some(completion) = self.next_completion().await {
            self.apply(completion);
        }
    }

    // ========== UI events ==========

    pub fn handle(&mut self, event: UiEvent) {
        tracing::debug!(?event, "UI event");
        match event {
            UiEvent::TagToggled(slug) => {
                self.filter.toggle(&slug);
                self.request_refresh(true);
            }
            UiEvent::MineOnlyChanged(mine_only) => {
                self.mine_only = mine_only;
                self.render_current();
            }
            UiEvent::SearchInput(text) => match self.search.on_input(&text, self.config.user_id) {
                SearchAction::Cleared => {
                    self.page.show_search_results(&[]);
                    self.page.set_search_dropdown(false);
                }
                SearchAction::Fetch(ticket) => {
                    let api = Arc::clone(&self.api);
                    self.spawn(async move {
                        let result = api.fetch_markers(&ticket.query).await;
                        Completion::Search { ticket, result }
                    });
                }
            },
            UiEvent::SearchInputClicked => {
                if self.search.on_input_click() {
                    self.page.set_search_dropdown(true);
                }
            }
            UiEvent::OutsideClicked => {
                self.search.on_outside_click();
                self.page.set_search_dropdown(false);
            }
            UiEvent::SearchResultSelected(index) => {
                if let Some(hit) = self.search.select(index) {
                    self.renderer.fly_to(hit.coordinate);
                    self.page.set_search_text(&hit.name);
                    self.page.set_search_dropdown(false);
                }
            }
            UiEvent::MapClicked(at) => self.on_map_click(at),
            UiEvent::PromptSubmitted(input) => self.on_prompt_submit(&input),
            UiEvent::PromptCancelled => {
                if self.creation.as_mut().is_some_and(|flow| flow.cancel()) {
                    self.renderer.close_prompt();
                }
            }
            UiEvent::PromptClosed => {
                if self.creation.as_mut().is_some_and(|flow| flow.cancel()) {
                    self.renderer.forget_prompt();
                }
            }
            UiEvent::MarkerPointerEnter(handle) => self.renderer.pointer_enter(handle),
            UiEvent::MarkerPointerLeave(handle) => self.renderer.pointer_leave(handle),
        }
    }

    fn on_map_click(&mut self, at: LngLat) {
        // Anonymous viewers have no click handler at all
        let Some(flow) = self.creation.as_mut() else {
            return;
        };
        if flow.on_map_click(at) {
            let choices = self.tag_choices();
            self.renderer.open_prompt(at, &choices);
        }
    }

    fn on_prompt_submit(&mut self, input: &PromptInput) {
        let Some(flow) = self.creation.as_mut() else {
            return;
        };
        let form = match flow.submit(input) {
            Ok(form) => form,
            Err(e) => {
                tracing::info!(error = %e, "Marker submission rejected");
                self.page.notify(Notice::Validation(e.to_string()));
                return;
            }
        };

        self.renderer.close_prompt();
        let tags: Vec<String> = form.effective_tag().map(str::to_string).into_iter().collect();
        let handle = self
            .renderer
            .place_optimistic(form.coordinate(), &form.name, &tags);
        flow.attach_optimistic(handle);

        let api = Arc::clone(&self.api);
        self.spawn(async move {
            let result = api.create_marker(&form).await;
            Completion::Created { result }
        });
    }

    // ========== Completions ==========

    pub fn apply(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match completion {
            Completion::Refresh {
                ticket,
                render,
                result,
            } => self.apply_refresh(ticket, render, result),
            Completion::Search { ticket, result } => match result {
                Ok(response) => {
                    if self.search.apply(&ticket, &response) {
                        self.page.show_search_results(self.search.hits());
                        self.page.set_search_dropdown(self.search.is_visible());
                    }
                }
                Err(e) => self.search.fail(&ticket, &e),
            },
            Completion::Created { result } => self.apply_created(result),
        }
    }

    fn apply_refresh(
        &mut self,
        ticket: RefreshTicket,
        render: bool,
        result: ClientResult<MarkersResponse>,
    ) {
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                self.store.fail(&ticket, &e);
                self.page
                    .notify(Notice::Error("Could not load markers".to_string()));
                return;
            }
        };
        if self.store.apply(&ticket, response) == RefreshOutcome::Stale {
            return;
        }

        let stale: Vec<&str> = self.filter.stale_slugs(self.store.tags()).collect();
        if !stale.is_empty() {
            tracing::debug!(?stale, "Active tags missing from latest tag list");
        }
        let checklist = self.filter.checklist(self.store.tags());
        let choices = self.tag_choices();
        self.page.show_tag_checklist(&checklist);
        self.page.show_tag_choices(&choices);

        let owed = self.owed_render.is_some_and(|seq| seq <= ticket.seq);
        if owed {
            self.owed_render = None;
        }
        if render || owed {
            self.render_current();
        }
    }

    fn apply_created(&mut self, result: ClientResult<CreateMarkerResponse>) {
        let Some((form, optimistic)) = self.creation.as_mut().and_then(|flow| flow.finish()) else {
            tracing::warn!("Creation response without a pending submission");
            return;
        };
        match result {
            Ok(_) => {
                tracing::info!(name = %form.name, at = %form.coordinate(), "Marker created");
                // Store only; the optimistic marker stays until the next render
                self.request_refresh(false);
            }
            Err(e) => {
                tracing::error!(name = %form.name, error = %e, "Marker creation failed");
                if let Some(handle) = optimistic {
                    self.renderer.discard(handle);
                }
                self.page
                    .notify(Notice::Error(format!("Could not save marker '{}'", form.name)));
            }
        }
    }

    // ========== Helpers ==========

    fn request_refresh(&mut self, render: bool) {
        let ticket = self.store.begin_refresh(&self.filter, self.config.user_id);
        if render {
            self.owed_render = Some(ticket.seq);
        }
        let api = Arc::clone(&self.api);
        self.spawn(async move {
            let result = api.fetch_markers(&ticket.query).await;
            Completion::Refresh {
                ticket,
                render,
                result,
            }
        });
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            // Receiver lives as long as the controller
            let _ = tx.send(task.await);
        });
    }

    fn render_current(&mut self) {
        self.renderer
            .render(self.store.owned(), self.store.others(), self.mine_only);
    }

    fn tag_choices(&self) -> Vec<String> {
        self.store.tags().iter().map(|t| t.name.clone()).collect()
    }

    // ========== Accessors ==========

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &MarkerStore {
        &self.store
    }

    pub fn filter(&self) -> &TagFilterState {
        &self.filter
    }

    pub fn search(&self) -> &SearchIndex {
        &self.search
    }

    pub fn renderer(&self) -> &MapRenderer<S> {
        &self.renderer
    }

    pub fn page(&self) -> &V {
        &self.page
    }

    pub fn is_mine_only(&self) -> bool {
        self.mine_only
    }

    /// Whether map clicks open the placement prompt
    pub fn accepts_map_clicks(&self) -> bool {
        self.creation.is_some()
    }

    pub fn creation_state(&self) -> Option<&CreationState> {
        self.creation.as_ref().map(MarkerCreationFlow::state)
    }

    /// Network tasks spawned but not yet applied
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResponseOrdering;
    use crate::page::{HeadlessPage, NoPage};
    use crate::surface::{HeadlessSurface, MarkerStyle};
    use crate::test_support::FakeApi;
    use shared::MarkersQuery;

    type Controller = MapController<HeadlessSurface, HeadlessPage>;

    fn controller(user_id: u64) -> (Arc<FakeApi>, Controller) {
        let api = Arc::new(FakeApi::seeded());
        let config = ClientConfig::new("http://test/markers").with_user_id(user_id);
        let controller = MapController::new(
            config,
            api.clone(),
            HeadlessSurface::new(),
            HeadlessPage::new(),
        );
        (api, controller)
    }

    async fn loaded(user_id: u64) -> (Arc<FakeApi>, Controller) {
        let (api, mut controller) = controller(user_id);
        controller.start();
        controller.settle().await;
        (api, controller)
    }

    fn visible_names(controller: &Controller) -> Vec<String> {
        let mut names: Vec<String> = controller
            .store()
            .owned()
            .iter()
            .chain(controller.store().others())
            .map(|m| m.name.clone())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_initial_load_renders_everything() {
        let (api, controller) = loaded(5).await;

        assert_eq!(api.queries(), vec![MarkersQuery::listing(5, Vec::<String>::new())]);
        assert_eq!(controller.store().owned().len(), 2);
        assert_eq!(controller.store().others().len(), 3);
        assert_eq!(controller.store().tags().len(), 4);

        let surface = controller.renderer().surface();
        assert_eq!(surface.count_style(MarkerStyle::Owned), 2);
        assert_eq!(surface.count_style(MarkerStyle::Other), 3);
        assert_eq!(surface.center(), Some(LngLat::new(13.405, 52.52)));
        assert_eq!(surface.zoom(), Some(13.0));

        let page = controller.page();
        assert_eq!(page.checklist.len(), 4);
        assert!(page.checked_slugs().is_empty());
        assert_eq!(page.tag_choices.len(), 4);
    }

    #[tokio::test]
    async fn test_tag_toggle_refetches_with_filter() {
        let (api, mut controller) = loaded(5).await;

        controller.handle(UiEvent::TagToggled("shop".into()));
        controller.settle().await;

        assert_eq!(
            api.queries().last(),
            Some(&MarkersQuery::listing(5, ["shop"]))
        );
        assert_eq!(visible_names(&controller), ["Book Shop", "Corner Shop"]);
        assert_eq!(controller.renderer().visible_count(), 2);
        assert_eq!(controller.page().checked_slugs(), ["shop"]);

        controller.handle(UiEvent::TagToggled("shop".into()));
        controller.settle().await;
        assert_eq!(controller.renderer().visible_count(), 5);
    }

    #[tokio::test]
    async fn test_rapid_toggles_settle_on_latest_filter() {
        let (_, mut controller) = loaded(5).await;

        controller.handle(UiEvent::TagToggled("shop".into()));
        controller.handle(UiEvent::TagToggled("hotel".into()));
        controller.settle().await;

        assert_eq!(
            visible_names(&controller),
            ["Book Shop", "Corner Shop", "Grand Hotel"]
        );
        assert_eq!(controller.renderer().visible_count(), 3);
    }

    #[tokio::test]
    async fn test_mine_only_does_not_refetch() {
        let (api, mut controller) = loaded(5).await;
        let before = api.queries().len();

        controller.handle(UiEvent::MineOnlyChanged(true));
        assert_eq!(controller.in_flight(), 0);
        assert_eq!(api.queries().len(), before);

        let surface = controller.renderer().surface();
        assert_eq!(surface.count_style(MarkerStyle::Other), 0);
        assert_eq!(surface.count_style(MarkerStyle::Owned), 2);

        controller.handle(UiEvent::MineOnlyChanged(false));
        controller.handle(UiEvent::MineOnlyChanged(false));
        assert_eq!(controller.renderer().visible_count(), 5);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_map() {
        let (api, mut controller) = loaded(5).await;
        api.fail_next_fetch();

        controller.handle(UiEvent::TagToggled("shop".into()));
        controller.settle().await;

        assert_eq!(controller.store().owned().len() + controller.store().others().len(), 5);
        assert_eq!(controller.renderer().visible_count(), 5);
        assert!(matches!(
            controller.page().notices.last(),
            Some(Notice::Error(_))
        ));
    }

    #[tokio::test]
    async fn test_superseding_refresh_pays_owed_render() {
        let (_, mut controller) = controller(5);
        controller.start();
        controller.request_refresh(false);

        let mut completions = Vec::new();
        while let Some(completion) = controller.next_completion().await {
            completions.push(completion);
            if completions.len() == 2 {
                break;
            }
        }
        // Land the newer, non-rendering refresh first
        completions.sort_by_key(|c| match c {
            Completion::Refresh { ticket, .. } => std::cmp::Reverse(ticket.seq),
            _ => std::cmp::Reverse(0),
        });
        for completion in completions {
            controller.apply(completion);
        }

        assert_eq!(controller.store().applied_seq(), Some(2));
        assert_eq!(controller.renderer().visible_count(), 5);
    }

    #[tokio::test]
    async fn test_search_flow() {
        let (api, mut controller) = loaded(5).await;
        let before = api.queries().len();

        controller.handle(UiEvent::SearchInput("  ".into()));
        assert_eq!(controller.in_flight(), 0);
        assert_eq!(api.queries().len(), before);
        assert!(!controller.page().dropdown_visible);

        controller.handle(UiEvent::SearchInput("shop".into()));
        controller.settle().await;
        assert_eq!(api.queries().last(), Some(&MarkersQuery::search(5, "shop")));
        let names: Vec<_> = controller
            .page()
            .search_results
            .iter()
            .map(|h| h.name.as_str())
            .collect();
        assert_eq!(names, ["Corner Shop", "Book Shop"]);
        assert!(controller.page().dropdown_visible);

        // Search never touches the rendered markers
        assert_eq!(controller.renderer().visible_count(), 5);

        controller.handle(UiEvent::SearchResultSelected(1));
        assert_eq!(
            controller.renderer().surface().flights(),
            [LngLat::new(13.43, 52.54)]
        );
        assert_eq!(controller.page().search_text, "Book Shop");
        assert!(!controller.page().dropdown_visible);

        controller.handle(UiEvent::SearchInputClicked);
        assert!(controller.page().dropdown_visible);
        controller.handle(UiEvent::OutsideClicked);
        assert!(!controller.page().dropdown_visible);

        controller.handle(UiEvent::SearchInput("zzz".into()));
        controller.settle().await;
        assert!(!controller.page().dropdown_visible);
    }

    #[tokio::test]
    async fn test_create_marker_end_to_end() {
        let (api, mut controller) = loaded(5).await;
        let at = LngLat::new(13.4, 52.5);

        controller.handle(UiEvent::MapClicked(at));
        let prompts = controller.renderer().surface().prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].0, at);
        assert_eq!(prompts[0].1.len(), 4);

        controller.handle(UiEvent::PromptSubmitted(
            PromptInput::new("Cafe X").with_new_tag("Food"),
        ));

        // Optimistic marker shows before the POST lands
        assert!(controller.renderer().surface().prompts().is_empty());
        assert_eq!(controller.renderer().visible_count(), 6);
        let optimistic = controller
            .renderer()
            .surface()
            .markers()
            .filter(|(_, m)| m.at == at)
            .count();
        assert_eq!(optimistic, 1);

        controller.settle().await;

        let forms = api.forms();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].user_id, 5);
        assert_eq!(forms[0].name, "Cafe X");
        assert_eq!(forms[0].new_tag, "Food");
        assert_eq!(forms[0].lat, 52.5);
        assert_eq!(forms[0].lng, 13.4);

        // Background refresh updated the store but did not re-render
        assert_eq!(api.queries().last(), Some(&MarkersQuery::listing(5, Vec::<String>::new())));
        assert_eq!(controller.store().owned().len(), 3);
        assert_eq!(controller.renderer().visible_count(), 6);
        assert_eq!(controller.creation_state(), Some(&CreationState::Idle));
        assert!(controller.page().tag_choices.contains(&"Food".to_string()));
    }

    #[tokio::test]
    async fn test_new_tag_wins_over_selection() {
        let (_, mut controller) = loaded(5).await;

        controller.handle(UiEvent::MapClicked(LngLat::new(1.0, 1.0)));
        controller.handle(UiEvent::PromptSubmitted(
            PromptInput::new("Cafe X").with_tag("Shop").with_new_tag("Cafe"),
        ));
        controller.settle().await;

        let created = controller
            .store()
            .owned()
            .iter()
            .find(|m| m.name == "Cafe X")
            .unwrap();
        assert_eq!(created.tags, ["Cafe"]);
    }

    #[tokio::test]
    async fn test_second_click_while_prompt_open_is_ignored() {
        let (_, mut controller) = loaded(5).await;

        controller.handle(UiEvent::MapClicked(LngLat::new(1.0, 1.0)));
        controller.handle(UiEvent::MapClicked(LngLat::new(2.0, 2.0)));

        let prompts = controller.renderer().surface().prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].0, LngLat::new(1.0, 1.0));
    }

    #[tokio::test]
    async fn test_anonymous_viewer_cannot_place() {
        let (_, mut controller) = loaded(0).await;
        assert!(!controller.accepts_map_clicks());

        controller.handle(UiEvent::MapClicked(LngLat::new(1.0, 1.0)));
        assert!(controller.renderer().surface().prompts().is_empty());
        assert_eq!(controller.creation_state(), None);
        // Everything is someone else's
        assert_eq!(controller.store().others().len(), 5);
    }

    #[tokio::test]
    async fn test_empty_name_is_rejected_inline() {
        let (api, mut controller) = loaded(5).await;

        controller.handle(UiEvent::MapClicked(LngLat::new(1.0, 1.0)));
        controller.handle(UiEvent::PromptSubmitted(PromptInput::new("").with_tag("Shop")));

        assert_eq!(controller.in_flight(), 0);
        assert!(api.forms().is_empty());
        assert_eq!(controller.renderer().surface().prompts().len(), 1);
        assert!(matches!(
            controller.page().notices.last(),
            Some(Notice::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_discards_without_request() {
        let (api, mut controller) = loaded(5).await;

        controller.handle(UiEvent::MapClicked(LngLat::new(1.0, 1.0)));
        controller.handle(UiEvent::PromptCancelled);

        assert!(api.forms().is_empty());
        assert!(controller.renderer().surface().prompts().is_empty());
        assert_eq!(controller.creation_state(), Some(&CreationState::Idle));

        // A fresh click opens a new prompt
        controller.handle(UiEvent::MapClicked(LngLat::new(3.0, 3.0)));
        assert_eq!(controller.renderer().surface().prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_creation_removes_optimistic_marker() {
        let (api, mut controller) = loaded(5).await;
        api.reject_next_create();
        let queries_before = api.queries().len();

        controller.handle(UiEvent::MapClicked(LngLat::new(1.0, 1.0)));
        controller.handle(UiEvent::PromptSubmitted(PromptInput::new("Cafe X").with_tag("Shop")));
        assert_eq!(controller.renderer().visible_count(), 6);

        controller.settle().await;
        assert_eq!(controller.renderer().visible_count(), 5);
        assert_eq!(api.queries().len(), queries_before);
        assert!(matches!(
            controller.page().notices.last(),
            Some(Notice::Error(_))
        ));
        assert_eq!(controller.creation_state(), Some(&CreationState::Idle));
    }

    #[tokio::test]
    async fn test_prompt_closed_by_map_returns_to_idle() {
        let (api, mut controller) = loaded(5).await;

        controller.handle(UiEvent::MapClicked(LngLat::new(1.0, 1.0)));
        assert_eq!(controller.renderer.surface_mut().dismiss_prompts(), 1);
        controller.handle(UiEvent::PromptClosed);

        assert!(api.forms().is_empty());
        assert_eq!(controller.creation_state(), Some(&CreationState::Idle));
        assert!(!controller.renderer().has_prompt());

        controller.handle(UiEvent::MapClicked(LngLat::new(3.0, 3.0)));
        let prompts = controller.renderer().surface().prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].0, LngLat::new(3.0, 3.0));
    }

    #[tokio::test]
    async fn test_transport_failure_removes_optimistic_marker() {
        let (api, mut controller) = loaded(5).await;
        api.fail_next_create();

        controller.handle(UiEvent::MapClicked(LngLat::new(1.0, 1.0)));
        controller.handle(UiEvent::PromptSubmitted(PromptInput::new("X").with_new_tag("Food")));
        assert_eq!(controller.renderer().visible_count(), 6);

        controller.settle().await;
        assert_eq!(api.forms().len(), 1);
        assert_eq!(controller.renderer().visible_count(), 5);
        assert_eq!(controller.renderer().surface().marker_count(), 5);
        assert_eq!(
            controller.page().notices.last(),
            Some(&Notice::Error("Could not save marker 'X'".to_string()))
        );
        assert_eq!(controller.creation_state(), Some(&CreationState::Idle));
    }

    #[tokio::test]
    async fn test_hover_over_rendered_markers() {
        let (_, mut controller) = loaded(5).await;
        let handles = controller.renderer().visible_handles();

        controller.handle(UiEvent::MarkerPointerEnter(handles[0]));
        controller.handle(UiEvent::MarkerPointerEnter(handles[1]));
        assert_eq!(controller.renderer().surface().info_popups().len(), 1);

        controller.handle(UiEvent::MarkerPointerLeave(handles[1]));
        assert!(controller.renderer().surface().info_popups().is_empty());
    }

    #[tokio::test]
    async fn test_run_loop_processes_events() {
        let (api, mut controller) = controller(5);
        let (tx, rx) = mpsc::channel(16);
        controller.start();

        tx.send(UiEvent::TagToggled("hotel".into())).await.unwrap();
        drop(tx);
        controller.run(rx).await;
        controller.settle().await;

        assert_eq!(api.queries().len(), 2);
        assert_eq!(controller.filter().slugs(), ["hotel"]);
        assert_eq!(controller.renderer().visible_count(), 1);
    }

    #[tokio::test]
    async fn test_completion_order_mode_applies_everything() {
        let api = Arc::new(FakeApi::seeded());
        let config = ClientConfig::new("http://test/markers")
            .with_user_id(5)
            .with_ordering(ResponseOrdering::CompletionOrder);
        // No page widgets at all; the map still works
        let mut controller = MapController::new(config, api, HeadlessSurface::new(), NoPage);
        controller.start();
        controller.handle(UiEvent::TagToggled("school".into()));
        controller.settle().await;

        assert!(controller.store().is_loaded());
        assert_eq!(controller.filter().slugs(), ["school"]);
    }
}
