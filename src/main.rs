// Main entry point - Dependency injection and terminal dashboard setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_controller::DashboardController;
use crate::infrastructure::config::{load_settings, Settings};
use crate::infrastructure::http_client::HttpSpeedTestApi;

/// The terminal belongs to the UI, so logs go to a file.
fn init_tracing(settings: &Settings) -> anyhow::Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.ui.log_file)
        .with_context(|| format!("Failed to open log file {}", settings.ui.log_file.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.ui.log_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let settings = load_settings().context("Failed to load configuration")?;
    init_tracing(&settings)?;

    // Create API client (infrastructure layer)
    let api = Arc::new(HttpSpeedTestApi::new(
        &settings.api.base_url,
        settings.api.timeout(),
    )?);

    // Create controller (application layer)
    let (controller, events) = DashboardController::new(api, settings);

    // Run terminal UI (presentation layer)
    presentation::terminal::run(controller, events).await
}
