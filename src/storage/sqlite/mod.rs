mod schema;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

use super::Storage;
use crate::models::{is_valid_amount, Category, Expense, Month, Settings, DATE_FORMAT};

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        db.seed_default_settings()?;
        debug!("Opened database at {}", path.display());
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.migrate()?;
        db.seed_default_settings()?;
        Ok(db)
    }

    /// A fresh file gets the version 1 schema; every migration past the
    /// stored version then runs in order inside one transaction.
    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        let tx = self.conn.transaction()?;
        if !has_version_table {
            tx.execute_batch(schema::SCHEMA_V1)?;
            tx.execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
        }

        let current: i32 = tx
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .context("Missing schema version")?;

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                debug!(from_version, "Applying schema migration");
                tx.execute_batch(sql)
                    .with_context(|| format!("Migration from version {from_version} failed"))?;
            }
        }

        if current < schema::CURRENT_VERSION {
            tx.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Write every default settings value whose key isn't stored yet.
    /// Existing values are never overwritten.
    fn seed_default_settings(&mut self) -> Result<()> {
        let defaults = Settings::default().to_stored()?;
        let tx = self.conn.transaction()?;
        for (key, value) in &defaults {
            tx.execute(
                "INSERT OR IGNORE INTO user_settings (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn schema_version(&self) -> Result<i32> {
        Ok(self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })?)
    }
}

/// One `expenses` row before its columns are validated.
struct ExpenseRow {
    id: String,
    amount: String,
    category: String,
    note: Option<String>,
    date: String,
    created_at: String,
}

impl ExpenseRow {
    fn into_expense(self) -> Result<Expense> {
        let amount = Decimal::from_str(self.amount.trim())
            .ok()
            .filter(|amount| is_valid_amount(*amount))
            .with_context(|| format!("bad amount {:?}", self.amount))?;
        let category = Category::parse(&self.category)
            .with_context(|| format!("unknown category {:?}", self.category))?;
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
            .with_context(|| format!("bad date {:?}", self.date))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .with_context(|| format!("bad created_at {:?}", self.created_at))?
            .with_timezone(&Utc);
        Ok(Expense {
            id: self.id,
            amount,
            category,
            note: self.note,
            date,
            created_at,
        })
    }
}

impl Storage for Database {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM user_settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn set_setting(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO user_settings (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .with_context(|| format!("Failed to save setting {key}"))?;
        Ok(())
    }

    fn get_all_settings(&self) -> Result<HashMap<String, String>> {
        let mut stmt = self.conn.prepare("SELECT key, value FROM user_settings")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        Ok(rows.collect::<std::result::Result<HashMap<_, _>, _>>()?)
    }

    fn add_expense(&mut self, expense: &Expense) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO expenses (id, amount, category, note, date, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    expense.id,
                    expense.amount.to_string(),
                    expense.category.as_str(),
                    expense.note,
                    expense.date_str(),
                    expense.created_at_str(),
                ],
            )
            .context("Failed to save expense")?;
        Ok(())
    }

    fn get_expenses(&self, month: Month) -> Result<Vec<Expense>> {
        let (start, end) = month.date_range();
        let mut stmt = self.conn.prepare(
            "SELECT id, amount, category, note, date, created_at FROM expenses
             WHERE date >= ?1 AND date < ?2
             ORDER BY date DESC, created_at DESC",
        )?;
        let rows = stmt.query_map(
            params![
                start.format(DATE_FORMAT).to_string(),
                end.format(DATE_FORMAT).to_string()
            ],
            |row| {
                Ok(ExpenseRow {
                    id: row.get(0)?,
                    amount: row.get(1)?,
                    category: row.get(2)?,
                    note: row.get(3)?,
                    date: row.get(4)?,
                    created_at: row.get(5)?,
                })
            },
        )?;

        let mut expenses = Vec::new();
        for row in rows {
            let row = row?;
            let id = row.id.clone();
            match row.into_expense() {
                Ok(expense) => expenses.push(expense),
                Err(e) => warn!("Skipping unreadable expense {id}: {e:#}"),
            }
        }
        Ok(expenses)
    }

    fn delete_expense(&mut self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM expenses WHERE id = ?1", params![id])
            .with_context(|| format!("Failed to delete expense {id}"))?;
        Ok(())
    }

    fn update_expense(&mut self, expense: &Expense) -> Result<()> {
        self.conn
            .execute(
                "UPDATE expenses SET amount = ?1, category = ?2, note = ?3, date = ?4
                 WHERE id = ?5",
                params![
                    expense.amount.to_string(),
                    expense.category.as_str(),
                    expense.note,
                    expense.date_str(),
                    expense.id,
                ],
            )
            .with_context(|| format!("Failed to update expense {}", expense.id))?;
        Ok(())
    }
}
