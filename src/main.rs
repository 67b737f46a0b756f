mod app;
mod auth;
mod components;
mod db;
mod settings;
mod tui;
mod utils;

use anyhow::{Context, Result};
use app::App;
use db::CredentialStore;
use log::{info, warn};
use settings::AppConfig;
use std::fs::OpenOptions;
use tui::Tui;

fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config)?;
    info!("starting signform");

    let mut app = App::new(open_store(&config));

    let mut tui = Tui::enter()?;
    let res = app.run(&mut tui);
    drop(tui);

    if let Some(store) = app.take_store() {
        if let Err(e) = store.close() {
            warn!("{e}");
        }
    }

    if let Err(e) = res {
        eprintln!("Application Error: {e}");
    }
    Ok(())
}

/// Sends log output to the configured file; the terminal belongs to the UI.
fn init_logging(config: &AppConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("Failed to open log file {}", config.log_file))?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .target(env_logger::Target::Pipe(Box::new(file)))
    .init();
    Ok(())
}

/// A store that fails to open leaves the form running with sign-in disabled.
fn open_store(config: &AppConfig) -> Option<CredentialStore> {
    let store = if config.in_memory() {
        CredentialStore::open_in_memory(&config.connection_name)
    } else {
        CredentialStore::open(&config.connection_name, &config.database_path)
    };

    match store {
        Ok(store) => Some(store),
        Err(e) => {
            warn!("credential store unavailable: {e}");
            None
        }
    }
}
