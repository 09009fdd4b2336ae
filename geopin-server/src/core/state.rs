use anyhow::Context;

use crate::core::{Config, Result};
use crate::db::{MarkerRepository, SEED_TAGS};

/// Handler state
///
/// Cheap to clone: the repository is shared behind an `Arc`.
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub markers: MarkerRepository,
}

impl ServerState {
    pub fn new(config: Config, markers: MarkerRepository) -> Self {
        Self { config, markers }
    }

    /// Build the state for `config`, seeding the initial tags if enabled
    pub async fn initialize(config: &Config) -> Result<Self> {
        let markers = MarkerRepository::new(config.markers_page_size);
        if config.seed_tags {
            markers
                .seed_tags(&SEED_TAGS)
                .await
                .context("Failed to seed initial tags")?;
            tracing::info!(count = SEED_TAGS.len(), "Seeded initial tags");
        }
        Ok(Self::new(config.clone(), markers))
    }
}
