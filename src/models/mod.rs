mod category;
mod expense;
mod month;
mod settings;

pub(crate) use category::{Category, CategoryKind};
pub(crate) use expense::{is_valid_amount, Expense, DATE_FORMAT, MAX_AMOUNT};
pub(crate) use month::Month;
pub(crate) use settings::{default_budgets, keys, SettingUpdate, Settings};
