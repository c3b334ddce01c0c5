mod utils;

pub mod analysis;
pub mod cli;
pub mod commands;
pub mod db;
pub mod import;
pub mod insights;
pub mod settings;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use cli::Cli;
use db::Database;
use settings::SettingsStore;

const ENABLE_LOGS: bool = true;

pub struct AppState {
    pub db: Database,
    pub settings: SettingsStore,
}

impl AppState {
    /// Open (creating if needed) the database and settings file under `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let database = Database::new(data_dir.join("tidewell.sqlite3"))?;
        let settings_store = SettingsStore::new(data_dir.join("settings.json"))?;

        Ok(Self {
            db: database,
            settings: settings_store,
        })
    }
}

pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    let data_dir = cli.data_dir();
    log_debug!("Using data directory {}", data_dir.display());

    let state = AppState::open(&data_dir)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(cli::dispatch(&state, cli.command))
}
