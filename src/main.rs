mod budget;
mod config;
mod errors;
mod models;
mod run;
mod session;
mod storage;
mod tax;
mod ui;

use anyhow::{Context, Result};
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::{AppConfig, StorageBackend};
use session::BudgetSession;
use storage::{Database, MemoryStore, Storage};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = AppConfig::from_env()?;
    init_logging(&config)?;

    let store = open_storage(&config)?;
    let mut session = BudgetSession::new(store);
    session.initialize()?;

    match args.len() {
        1 => run::as_tui(&mut session),
        2.. => run::as_cli(&args, &mut session),
        _ => {
            eprintln!("Usage: budgetbuddy [command]");
            Ok(())
        }
    }
}

/// Log to a file in the data directory so the TUI is never drawn over.
fn init_logging(config: &AppConfig) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .with_context(|| format!("Failed to open log file: {}", config.log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn open_storage(config: &AppConfig) -> Result<Box<dyn Storage>> {
    if config.storage == StorageBackend::Memory {
        info!("Using in-memory storage; nothing will be saved");
        return Ok(Box::new(MemoryStore::new()?));
    }
    match Database::open(&config.db_path) {
        Ok(db) => Ok(Box::new(db)),
        Err(e) => {
            error!("Could not open database, falling back to memory: {e:#}");
            eprintln!("Warning: {e:#}. Changes this session will not be saved.");
            Ok(Box::new(MemoryStore::new()?))
        }
    }
}
