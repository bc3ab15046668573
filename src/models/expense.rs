use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::Category;

/// Stored date format for `Expense::date`.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Upper bound for any money value taken from input or storage. Keeps
/// totals and tax products far from `Decimal` overflow.
pub(crate) const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// A usable expense amount: positive and no larger than `MAX_AMOUNT`.
pub(crate) fn is_valid_amount(amount: Decimal) -> bool {
    amount > Decimal::ZERO && amount <= MAX_AMOUNT
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Expense {
    pub(crate) id: String,
    pub(crate) amount: Decimal,
    pub(crate) category: Category,
    pub(crate) note: Option<String>,
    pub(crate) date: NaiveDate,
    /// Set once at creation; only used to order same-day expenses.
    pub(crate) created_at: DateTime<Utc>,
}

impl Expense {
    pub(crate) fn new(
        amount: Decimal,
        category: Category,
        note: Option<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            amount,
            category,
            note: note.filter(|n| !n.trim().is_empty()),
            date,
            created_at: Utc::now(),
        }
    }

    pub(crate) fn date_str(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// Fixed-width RFC 3339 so stored timestamps sort lexically.
    pub(crate) fn created_at_str(&self) -> String {
        self.created_at.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Newest date first, then newest creation first.
    pub(crate) fn cmp_recent_first(a: &Expense, b: &Expense) -> std::cmp::Ordering {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    }
}
