use crate::budget::{GREETING_QUOTES, SLEEPING_QUOTES};
use crate::models::Expense;
use crate::session::{BudgetSession, BudgetSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Dashboard,
    Expenses,
    Budgets,
    TakeHome,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[
            Self::Dashboard,
            Self::Expenses,
            Self::Budgets,
            Self::TakeHome,
        ]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "Dashboard"),
            Self::Expenses => write!(f, "Expenses"),
            Self::Budgets => write!(f, "Budgets"),
            Self::TakeHome => write!(f, "Take-Home"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PendingAction {
    DeleteExpense { id: String, label: String },
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,

    /// Session state as of the last refresh. Screens only read this.
    pub(crate) snapshot: BudgetSnapshot,

    // Expenses
    pub(crate) expense_index: usize,
    pub(crate) expense_scroll: usize,

    // Budgets
    pub(crate) budget_index: usize,
    pub(crate) budget_scroll: usize,

    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    pub(crate) quote_index: usize,
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(session: &BudgetSession) -> Self {
        let snapshot = session.snapshot();
        let status_message = if snapshot.settings.onboarding_complete {
            String::new()
        } else {
            "Welcome! Set your income with :onboard <salary> <bonus> <pretax%>".to_string()
        };

        Self {
            running: true,
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message,
            show_help: false,

            snapshot,

            expense_index: 0,
            expense_scroll: 0,

            budget_index: 0,
            budget_scroll: 0,

            pending_action: None,
            confirm_message: String::new(),

            quote_index: 0,
            visible_rows: 20,
        }
    }

    /// Re-read the session and keep cursors inside the new lists.
    pub(crate) fn refresh(&mut self, session: &BudgetSession) {
        self.snapshot = session.snapshot();

        let len = self.snapshot.expenses.len();
        if self.expense_index >= len {
            self.expense_index = len.saturating_sub(1);
        }
        if self.expense_scroll > self.expense_index {
            self.expense_scroll = self.expense_index;
        }
    }

    pub(crate) fn selected_expense(&self) -> Option<&Expense> {
        self.snapshot.expenses.get(self.expense_index)
    }

    /// Greeting until onboarding is done, asleep on an empty month,
    /// otherwise the budget mood.
    pub(crate) fn mascot_quotes(&self) -> &'static [&'static str] {
        if !self.snapshot.settings.onboarding_complete {
            GREETING_QUOTES
        } else if self.snapshot.expenses.is_empty() {
            SLEEPING_QUOTES
        } else {
            self.snapshot.summary.mood.quotes()
        }
    }

    pub(crate) fn mascot_quote(&self) -> &'static str {
        let quotes = self.mascot_quotes();
        quotes
            .get(self.quote_index % quotes.len().max(1))
            .copied()
            .unwrap_or_default()
    }

    pub(crate) fn next_quote(&mut self) {
        self.quote_index = self.quote_index.wrapping_add(1);
    }

    /// Rows available to a table inside a bordered block with a header.
    pub(crate) fn table_page(&self) -> usize {
        self.visible_rows.saturating_sub(3).max(1)
    }

    /// Rows in the budget list, which shares the screen with the
    /// allocation panel.
    pub(crate) fn budget_page(&self) -> usize {
        self.visible_rows.saturating_sub(6).max(1)
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}
