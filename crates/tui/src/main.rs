mod app;
mod input;
mod search_modal;
mod theme;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    sync::Mutex,
};

use stations_core::{
    config::{self, AppConfig},
    FavoritesStore, StationClient,
};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;

    let client = StationClient::from_config(&config.catalog)
        .context("failed to build station catalog client")?;
    info!(base_url = client.base_url(), "Using station catalog");
    let favorites = FavoritesStore::open(config.favorites_path.clone());

    let mut app = app::StationsApp::new(client, config.modal, favorites);
    app.run().await
}

/// Log to `logs/stations.log`; stdout is owned by the terminal UI.
fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("stations.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(file_layer)
        .init();

    Ok(())
}
