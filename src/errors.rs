use thiserror::Error;

/// Rejections raised by the session before anything is persisted.
#[derive(Debug, Error, PartialEq)]
pub(crate) enum BudgetError {
    #[error("invalid month {month}/{year}")]
    InvalidMonth { month: u32, year: i32 },

    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    #[error("amount must be positive and at most {max}, got {0}", max = crate::models::MAX_AMOUNT)]
    InvalidAmount(rust_decimal::Decimal),

    #[error("no expense with id {0}")]
    UnknownExpense(String),

    #[error("unknown category '{0}'")]
    UnknownCategory(String),
}
