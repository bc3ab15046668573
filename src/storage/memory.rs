use anyhow::Result;
use std::collections::HashMap;

use super::Storage;
use crate::models::{Expense, Month, Settings};

/// Process-local store with the same ordering and filtering rules as the
/// database. Nothing survives a restart.
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    settings: HashMap<String, String>,
    expenses: Vec<Expense>,
}

impl MemoryStore {
    pub(crate) fn new() -> Result<Self> {
        let mut store = Self::default();
        for (key, value) in Settings::default().to_stored()? {
            store.settings.entry(key.to_string()).or_insert(value);
        }
        Ok(store)
    }
}

impl Storage for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        Ok(self.settings.get(key).cloned())
    }

    fn set_setting(&mut self, key: &str, value: &str) -> Result<()> {
        self.settings.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_all_settings(&self) -> Result<HashMap<String, String>> {
        Ok(self.settings.clone())
    }

    fn add_expense(&mut self, expense: &Expense) -> Result<()> {
        if self.expenses.iter().any(|e| e.id == expense.id) {
            anyhow::bail!("Expense {} already exists", expense.id);
        }
        self.expenses.push(expense.clone());
        Ok(())
    }

    fn get_expenses(&self, month: Month) -> Result<Vec<Expense>> {
        let mut found: Vec<Expense> = self
            .expenses
            .iter()
            .filter(|e| month.contains(e.date))
            .cloned()
            .collect();
        found.sort_by(Expense::cmp_recent_first);
        Ok(found)
    }

    fn delete_expense(&mut self, id: &str) -> Result<()> {
        self.expenses.retain(|e| e.id != id);
        Ok(())
    }

    fn update_expense(&mut self, expense: &Expense) -> Result<()> {
        if let Some(stored) = self.expenses.iter_mut().find(|e| e.id == expense.id) {
            stored.amount = expense.amount;
            stored.category = expense.category;
            stored.note = expense.note.clone();
            stored.date = expense.date;
        }
        Ok(())
    }
}
