//! Headless map session against a running markers server
//!
//! ```text
//! cargo run -p geopin-server
//! GEOPIN_USER_ID=5 cargo run -p geopin-client --example headless_session
//! ```
//!
//! Loads the markers, toggles the first tag, searches and places a marker
//! at the map center, logging what the map and page would show.

use std::sync::Arc;

use geopin_client::{
    ClientConfig, HeadlessPage, HeadlessSurface, MapController, MarkerStyle, NetworkMarkerApi,
    PromptInput, UiEvent,
};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = ClientConfig::from_env();
    let api = Arc::new(NetworkMarkerApi::new(&config)?);
    tracing::info!(endpoint = %api.endpoint(), user_id = config.user_id, "Connecting");

    let center = config.center;
    let signed_in = config.is_signed_in();
    let mut controller =
        MapController::new(config, api, HeadlessSurface::new(), HeadlessPage::new());

    controller.start();
    controller.settle().await;
    report(&controller, "initial load");

    let (tx, rx) = mpsc::channel(16);
    if let Some(first) = controller.store().tags().first() {
        tx.send(UiEvent::TagToggled(first.slug.clone())).await?;
    }
    tx.send(UiEvent::SearchInput("shop".into())).await?;
    if signed_in {
        tx.send(UiEvent::MapClicked(center)).await?;
        tx.send(UiEvent::PromptSubmitted(
            PromptInput::new("Demo marker").with_new_tag("Demo"),
        ))
        .await?;
    }
    drop(tx);

    controller.run(rx).await;
    controller.settle().await;
    report(&controller, "after interaction");

    for option in &controller.page().checklist {
        tracing::info!(label = %option.tag.label(), checked = option.checked, "Tag");
    }
    for hit in controller.search().hits() {
        tracing::info!(name = %hit.name, at = %hit.coordinate, "Search hit");
    }
    for notice in &controller.page().notices {
        tracing::warn!(?notice, "Notice");
    }
    Ok(())
}

fn report(controller: &MapController<HeadlessSurface, HeadlessPage>, stage: &str) {
    let surface = controller.renderer().surface();
    tracing::info!(
        stage,
        owned = surface.count_style(MarkerStyle::Owned),
        others = surface.count_style(MarkerStyle::Other),
        tags = controller.store().tags().len(),
        active = ?controller.filter().slugs(),
        "Map state"
    );
}
