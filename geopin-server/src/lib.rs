//! Geopin Server - reference markers endpoint
//!
//! # Overview
//!
//! Serves the single method-dispatched markers endpoint the map client
//! talks to, backed by an in-memory marker and tag store:
//!
//! - **Markers** (`api::markers`): listing, name search and creation
//! - **Health** (`api::health`): liveness probe
//! - **Store** (`db`): seeded in-memory repository
//!
//! # Layout
//!
//! ```text
//! geopin-server/src/
//! ├── core/          # config, state, errors, HTTP server
//! ├── api/           # routes and handlers
//! ├── db/            # marker/tag repository
//! └── utils/         # AppError, logging, validation
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod utils;

pub use core::{Config, Server, ServerState, build_app};
pub use utils::{AppError, AppResult};

pub use utils::logger::init_logger_with_file;

/// Load `.env`, read the configuration and install the logger
pub fn setup_environment() -> Result<Config, Box<dyn std::error::Error>> {
    // A missing .env is fine; real environment variables still apply
    let _ = dotenv::dotenv();

    let config = Config::from_env();
    if let Some(dir) = &config.log_dir {
        std::fs::create_dir_all(dir)?;
    }
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
   ____                  _
  / ___| ___  ___  _ __ (_)_ __
 | |  _ / _ \/ _ \| '_ \| | '_ \
 | |_| |  __/ (_) | |_) | | | | |
  \____|\___|\___/| .__/|_|_| |_|
                  |_|
    "#
    );
}
