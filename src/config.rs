use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub(crate) const DATA_DIR_VAR: &str = "BUDGET_BUDDY_DATA_DIR";
pub(crate) const LOG_VAR: &str = "BUDGET_BUDDY_LOG";
pub(crate) const STORAGE_VAR: &str = "BUDGET_BUDDY_STORAGE";

const DB_FILE: &str = "budgetbuddy.db";
const LOG_FILE: &str = "budgetbuddy.log";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StorageBackend {
    Sqlite,
    Memory,
}

impl StorageBackend {
    /// Anything other than `memory` means SQLite.
    pub(crate) fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("memory") {
            Self::Memory
        } else {
            Self::Sqlite
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AppConfig {
    pub(crate) data_dir: PathBuf,
    pub(crate) db_path: PathBuf,
    pub(crate) log_path: PathBuf,
    /// `EnvFilter` directive string.
    pub(crate) log_filter: String,
    pub(crate) storage: StorageBackend,
}

impl AppConfig {
    /// Resolve from the process environment and create the data directory.
    pub(crate) fn from_env() -> Result<Self> {
        let config = Self::resolve(|key| std::env::var(key).ok(), default_data_dir)?;
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!(
                "Failed to create data directory: {}",
                config.data_dir.display()
            )
        })?;
        Ok(config)
    }

    /// `lookup` reads one variable; `default_dir` is only consulted when
    /// no data directory override is set.
    pub(crate) fn resolve(
        lookup: impl Fn(&str) -> Option<String>,
        default_dir: impl FnOnce() -> Result<PathBuf>,
    ) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = match non_empty(DATA_DIR_VAR) {
            Some(dir) => PathBuf::from(shellexpand(dir.trim())),
            None => default_dir()?,
        };
        let log_filter = non_empty(LOG_VAR)
            .or_else(|| non_empty("RUST_LOG"))
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        let storage = non_empty(STORAGE_VAR)
            .map(|s| StorageBackend::parse(&s))
            .unwrap_or(StorageBackend::Sqlite);

        Ok(Self {
            db_path: data_dir.join(DB_FILE),
            log_path: data_dir.join(LOG_FILE),
            data_dir,
            log_filter,
            storage,
        })
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "budgetbuddy", "BudgetBuddy")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(proj_dirs.data_dir().to_path_buf())
}

/// Expand a leading `~/` to `$HOME`.
pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

/// Default export file for `month` in the user's home directory.
pub(crate) fn default_export_path(month: &str) -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
    Path::new(&home).join(format!("budgetbuddy-export-{month}.csv"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
