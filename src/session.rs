//! The budgeting session: owns settings and the selected month's expenses,
//! persists every mutation through [`Storage`] before touching memory, and
//! derives the tax breakdown and budget summary fresh on every read.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::budget::{Allocation, BudgetSummary, SplurgeMeter};
use crate::errors::BudgetError;
use crate::models::{is_valid_amount, Category, Expense, Month, SettingUpdate, Settings};
use crate::storage::{export_to_csv, Storage};
use crate::tax::{compute_take_home, TakeHomeBreakdown};

/// Ticket for one month load. Only the most recently issued ticket can
/// apply its results.
#[derive(Debug)]
pub(crate) struct MonthLoad {
    generation: u64,
    month: Month,
}

impl MonthLoad {
    pub(crate) fn month(&self) -> Month {
        self.month
    }
}

/// Everything a screen needs, computed from the session at one instant.
#[derive(Debug, Clone)]
pub(crate) struct BudgetSnapshot {
    pub(crate) loading: bool,
    pub(crate) backend: &'static str,
    pub(crate) month: Month,
    pub(crate) settings: Settings,
    pub(crate) take_home: TakeHomeBreakdown,
    pub(crate) expenses: Vec<Expense>,
    pub(crate) summary: BudgetSummary,
    pub(crate) splurge: SplurgeMeter,
    pub(crate) allocation: Allocation,
    pub(crate) remaining_total: Decimal,
}

pub(crate) struct BudgetSession {
    store: Box<dyn Storage>,
    settings: Settings,
    month: Month,
    /// Always the expenses of `month`, newest first.
    expenses: Vec<Expense>,
    loading: bool,
    generation: u64,
}

impl BudgetSession {
    /// A session that hasn't loaded anything yet. Call [`initialize`]
    /// before trusting any derived value.
    ///
    /// [`initialize`]: BudgetSession::initialize
    pub(crate) fn new(store: Box<dyn Storage>) -> Self {
        Self {
            store,
            settings: Settings::default(),
            month: Month::current(),
            expenses: Vec::new(),
            loading: true,
            generation: 0,
        }
    }

    /// Load settings and the current month's expenses.
    pub(crate) fn initialize(&mut self) -> Result<()> {
        self.loading = true;
        let stored = self.store.get_all_settings()?;
        self.settings = Settings::from_stored(&stored);
        self.select_month(Month::current())?;
        self.loading = false;
        info!(
            backend = self.store.backend_name(),
            month = %self.month,
            expenses = self.expenses.len(),
            "Session initialized"
        );
        Ok(())
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.loading
    }

    pub(crate) fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn month(&self) -> Month {
        self.month
    }

    pub(crate) fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub(crate) fn find_expense(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    /// The raw persisted value for `key`, bypassing the in-memory settings.
    pub(crate) fn stored_setting(&self, key: &str) -> Result<Option<String>> {
        self.store.get_setting(key)
    }

    /// Write the selected month's expenses to `path`.
    pub(crate) fn export_csv(&self, path: &Path) -> Result<usize> {
        let count = export_to_csv(path, &self.expenses)?;
        info!(month = %self.month, count, path = %path.display(), "Exported expenses");
        Ok(count)
    }

    // ── Month selection ───────────────────────────────────────

    pub(crate) fn set_month(&mut self, month: u32, year: i32) -> Result<()> {
        let selected = Month::new(month, year).ok_or(BudgetError::InvalidMonth { month, year })?;
        self.select_month(selected)
    }

    pub(crate) fn select_month(&mut self, month: Month) -> Result<()> {
        let load = self.begin_month_load(month);
        let expenses = self.store.get_expenses(load.month())?;
        self.finish_month_load(load, expenses);
        Ok(())
    }

    pub(crate) fn next_month(&mut self) -> Result<()> {
        self.select_month(self.month.next())
    }

    pub(crate) fn prev_month(&mut self) -> Result<()> {
        self.select_month(self.month.prev())
    }

    /// Start loading `month`. Any ticket issued earlier is now stale.
    pub(crate) fn begin_month_load(&mut self, month: Month) -> MonthLoad {
        self.generation += 1;
        debug!(month = %month, generation = self.generation, "Month load started");
        MonthLoad {
            generation: self.generation,
            month,
        }
    }

    /// Apply a finished load. Returns `false`, leaving the session as it
    /// was, when a newer load has been started since `load` was issued.
    pub(crate) fn finish_month_load(&mut self, load: MonthLoad, expenses: Vec<Expense>) -> bool {
        if load.generation != self.generation {
            debug!(
                month = %load.month,
                generation = load.generation,
                current = self.generation,
                "Discarding stale month load"
            );
            return false;
        }
        self.month = load.month;
        self.expenses = expenses;
        true
    }

    // ── Expenses ──────────────────────────────────────────────

    /// Record a new expense dated `date` (today when `None`).
    ///
    /// A blank, unparsable or non-positive `amount` is refused with
    /// `Ok(None)` and nothing is stored.
    pub(crate) fn log_expense(
        &mut self,
        amount: &str,
        category: Category,
        note: Option<String>,
        date: Option<NaiveDate>,
    ) -> Result<Option<Expense>> {
        let Some(amount) = parse_amount(amount) else {
            debug!("Refusing expense without a usable amount: {amount:?}");
            return Ok(None);
        };
        let date = date.unwrap_or_else(|| Local::now().date_naive());
        let expense = Expense::new(amount, category, note, date);

        self.store.add_expense(&expense)?;

        if self.month.contains(expense.date) {
            self.expenses.insert(0, expense.clone());
        }
        info!(
            id = %expense.id,
            category = expense.category.as_str(),
            amount = %expense.amount,
            "Logged expense"
        );
        Ok(Some(expense))
    }

    /// Delete an expense. Unknown ids are a no-op.
    pub(crate) fn remove_expense(&mut self, id: &str) -> Result<()> {
        self.store.delete_expense(id)?;
        let before = self.expenses.len();
        self.expenses.retain(|e| e.id != id);
        if self.expenses.len() < before {
            info!(id, "Removed expense");
        }
        Ok(())
    }

    /// Overwrite amount, category, note and date of the expense with the
    /// same id. `id` and `created_at` of the stored entry are kept.
    pub(crate) fn edit_expense(&mut self, edited: Expense) -> Result<()> {
        let Some(existing) = self.find_expense(&edited.id) else {
            return Err(BudgetError::UnknownExpense(edited.id).into());
        };
        if !is_valid_amount(edited.amount) {
            return Err(BudgetError::InvalidAmount(edited.amount).into());
        }
        let merged = Expense {
            id: existing.id.clone(),
            created_at: existing.created_at,
            ..edited
        };

        self.store.update_expense(&merged)?;

        let id = merged.id.clone();
        if self.month.contains(merged.date) {
            if let Some(slot) = self.expenses.iter_mut().find(|e| e.id == merged.id) {
                *slot = merged;
            }
        } else {
            self.expenses.retain(|e| e.id != merged.id);
        }
        info!(id = %id, "Edited expense");
        Ok(())
    }

    // ── Settings ──────────────────────────────────────────────

    pub(crate) fn update_settings(&mut self, update: SettingUpdate) -> Result<()> {
        if let Some(reason) = update.validate() {
            return Err(BudgetError::InvalidSetting(reason).into());
        }
        let value = update.encode()?;
        self.store.set_setting(update.key(), &value)?;
        info!(key = update.key(), value = %value, "Updated setting");
        update.apply(&mut self.settings);
        Ok(())
    }

    /// Change one category's budget. The whole map is persisted.
    pub(crate) fn set_category_budget(&mut self, category: Category, amount: Decimal) -> Result<()> {
        let mut budgets = self.settings.category_budgets.clone();
        budgets.insert(category, amount);
        self.update_settings(SettingUpdate::CategoryBudgets(budgets))
    }

    pub(crate) fn complete_onboarding(&mut self) -> Result<()> {
        self.update_settings(SettingUpdate::OnboardingComplete(true))
    }

    /// The setup flow: income fields, optionally budgets, then the
    /// onboarding flag. Every value is validated before the first write.
    pub(crate) fn complete_onboarding_with(
        &mut self,
        gross_salary: Decimal,
        bonus: Decimal,
        pretax_percent: Decimal,
        budgets: Option<BTreeMap<Category, Decimal>>,
    ) -> Result<()> {
        let mut updates = vec![
            SettingUpdate::GrossSalary(gross_salary),
            SettingUpdate::Bonus(bonus),
            SettingUpdate::PretaxPercent(pretax_percent),
        ];
        if let Some(budgets) = budgets {
            updates.push(SettingUpdate::CategoryBudgets(budgets));
        }
        if let Some(reason) = updates.iter().find_map(SettingUpdate::validate) {
            return Err(BudgetError::InvalidSetting(reason).into());
        }
        for update in updates {
            self.update_settings(update)?;
        }
        self.complete_onboarding()
    }

    // ── Derived views ─────────────────────────────────────────

    pub(crate) fn take_home(&self) -> TakeHomeBreakdown {
        compute_take_home(
            self.settings.gross_salary,
            self.settings.bonus,
            self.settings.pretax_percent,
        )
    }

    pub(crate) fn summary(&self) -> BudgetSummary {
        BudgetSummary::compute(&self.expenses, &self.settings.category_budgets)
    }

    pub(crate) fn allocation(&self) -> Allocation {
        Allocation::compute(
            &self.settings.category_budgets,
            self.take_home().monthly_take_home,
        )
    }

    /// Monthly take-home minus everything spent this month.
    pub(crate) fn remaining_total(&self) -> Decimal {
        self.take_home().monthly_take_home - self.summary().total_spent
    }

    pub(crate) fn snapshot(&self) -> BudgetSnapshot {
        let take_home = self.take_home();
        let summary = self.summary();
        BudgetSnapshot {
            loading: self.is_loading(),
            backend: self.store.backend_name(),
            month: self.month,
            settings: self.settings.clone(),
            splurge: summary.splurge(),
            allocation: Allocation::compute(
                &self.settings.category_budgets,
                take_home.monthly_take_home,
            ),
            remaining_total: take_home.monthly_take_home - summary.total_spent,
            take_home,
            expenses: self.expenses.clone(),
            summary,
        }
    }
}

/// A decimal from user input, tolerating a leading `$` and thousands
/// separators. The sign is not checked.
pub(crate) fn parse_decimal(input: &str) -> Option<Decimal> {
    let trimmed = input.trim().trim_start_matches('$').replace(',', "");
    Decimal::from_str(&trimmed).ok()
}

/// A positive amount no larger than `MAX_AMOUNT` from user input, or `None`.
pub(crate) fn parse_amount(input: &str) -> Option<Decimal> {
    parse_decimal(input).filter(|amount| is_valid_amount(*amount))
}

pub(crate) fn parse_category(input: &str) -> Result<Category, BudgetError> {
    Category::parse(input).ok_or_else(|| BudgetError::UnknownCategory(input.trim().to_string()))
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
