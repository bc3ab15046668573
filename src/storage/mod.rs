//! Persistence behind a single interface.
//!
//! The session only sees [`Storage`]. `Database` keeps everything in SQLite;
//! `MemoryStore` keeps it for the life of the process and is used when the
//! database can't be opened (or is disabled through configuration).

mod export;
mod memory;
mod sqlite;

use anyhow::Result;
use std::collections::HashMap;

use crate::models::{Expense, Month};

pub(crate) use export::export_to_csv;
pub(crate) use memory::MemoryStore;
pub(crate) use sqlite::Database;

/// Key-value settings plus dated expense records.
///
/// Reads take `&self`; anything that writes takes `&mut self`. Every call
/// either completes or returns an error, nothing is retried.
pub(crate) trait Storage {
    /// Short name shown in the status bar and logs.
    fn backend_name(&self) -> &'static str;

    /// Raw stored value for one settings key.
    fn get_setting(&self, key: &str) -> Result<Option<String>>;

    /// Insert or replace one settings key.
    fn set_setting(&mut self, key: &str, value: &str) -> Result<()>;

    /// Every stored settings key and its raw value.
    fn get_all_settings(&self) -> Result<HashMap<String, String>>;

    fn add_expense(&mut self, expense: &Expense) -> Result<()>;

    /// Expenses dated inside `month`, newest date first, ties broken by
    /// newest `created_at`.
    fn get_expenses(&self, month: Month) -> Result<Vec<Expense>>;

    /// Deleting an id that isn't stored is not an error.
    fn delete_expense(&mut self, id: &str) -> Result<()>;

    /// Replace amount, category, note and date of the stored record with
    /// the same id. `id` and `created_at` are never rewritten.
    fn update_expense(&mut self, expense: &Expense) -> Result<()>;
}
