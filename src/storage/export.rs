use anyhow::{Context, Result};
use csv::Writer;
use std::path::Path;

use crate::models::Expense;

/// Write `expenses` to a CSV file at `path`, one row each, in the order
/// given. Returns the number of rows written.
pub(crate) fn export_to_csv(path: &Path, expenses: &[Expense]) -> Result<usize> {
    let mut wtr = Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    wtr.write_record(["date", "category", "amount", "note", "id"])?;
    for e in expenses {
        wtr.write_record([
            e.date_str().as_str(),
            e.category.as_str(),
            e.amount.to_string().as_str(),
            e.note.as_deref().unwrap_or(""),
            e.id.as_str(),
        ])?;
    }
    wtr.flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(expenses.len())
}
