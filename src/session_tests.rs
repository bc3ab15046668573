#![allow(clippy::unwrap_used)]

use chrono::Local;
use rust_decimal_macros::dec;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

use super::*;
use crate::models::keys;
use crate::storage::MemoryStore;

fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn month(m: u32, y: i32) -> Month {
    Month::new(m, y).unwrap()
}

fn session() -> BudgetSession {
    init_test_tracing();
    let mut s = BudgetSession::new(Box::new(MemoryStore::new().unwrap()));
    s.initialize().unwrap();
    s
}

/// Memory store whose calls all fail while `fail` is set.
struct FlakyStore {
    inner: MemoryStore,
    fail: Rc<Cell<bool>>,
}

impl FlakyStore {
    fn check(&self) -> Result<()> {
        if self.fail.get() {
            anyhow::bail!("disk on fire");
        }
        Ok(())
    }
}

impl Storage for FlakyStore {
    fn backend_name(&self) -> &'static str {
        "flaky"
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        self.inner.get_setting(key)
    }

    fn set_setting(&mut self, key: &str, value: &str) -> Result<()> {
        self.check()?;
        self.inner.set_setting(key, value)
    }

    fn get_all_settings(&self) -> Result<HashMap<String, String>> {
        self.check()?;
        self.inner.get_all_settings()
    }

    fn add_expense(&mut self, expense: &Expense) -> Result<()> {
        self.check()?;
        self.inner.add_expense(expense)
    }

    fn get_expenses(&self, month: Month) -> Result<Vec<Expense>> {
        self.check()?;
        self.inner.get_expenses(month)
    }

    fn delete_expense(&mut self, id: &str) -> Result<()> {
        self.check()?;
        self.inner.delete_expense(id)
    }

    fn update_expense(&mut self, expense: &Expense) -> Result<()> {
        self.check()?;
        self.inner.update_expense(expense)
    }
}

fn flaky_session() -> (BudgetSession, Rc<Cell<bool>>) {
    init_test_tracing();
    let fail = Rc::new(Cell::new(false));
    let store = FlakyStore {
        inner: MemoryStore::new().unwrap(),
        fail: Rc::clone(&fail),
    };
    let mut s = BudgetSession::new(Box::new(store));
    s.initialize().unwrap();
    (s, fail)
}

// ── Initialization ────────────────────────────────────────────

#[test]
fn test_loading_until_initialized() {
    let mut s = BudgetSession::new(Box::new(MemoryStore::new().unwrap()));
    assert!(s.is_loading());
    assert!(s.snapshot().loading);
    s.initialize().unwrap();
    assert!(!s.is_loading());
    assert_eq!(s.month(), Month::current());
    assert_eq!(s.settings(), &Settings::default());
    assert_eq!(s.backend_name(), "memory");
}

#[test]
fn test_initialize_reads_stored_settings() {
    let mut store = MemoryStore::new().unwrap();
    store.set_setting(keys::GROSS_SALARY, "100000").unwrap();
    store.set_setting(keys::CATEGORY_BUDGETS, "not json").unwrap();
    let mut s = BudgetSession::new(Box::new(store));
    s.initialize().unwrap();
    assert_eq!(s.settings().gross_salary, dec!(100000));
    assert_eq!(s.settings().category_budgets, crate::models::default_budgets());
}

#[test]
fn test_initialize_failure_stays_loading() {
    let fail = Rc::new(Cell::new(true));
    let store = FlakyStore {
        inner: MemoryStore::new().unwrap(),
        fail: Rc::clone(&fail),
    };
    let mut s = BudgetSession::new(Box::new(store));
    assert!(s.initialize().is_err());
    assert!(s.is_loading());
}

// ── Month selection ───────────────────────────────────────────

#[test]
fn test_set_month_loads_that_month() {
    let mut s = session();
    s.store
        .add_expense(&Expense::new(dec!(5), Category::Food, None, date(2024, 2, 10)))
        .unwrap();
    s.set_month(2, 2024).unwrap();
    assert_eq!(s.month(), month(2, 2024));
    assert_eq!(s.expenses().len(), 1);
    s.set_month(3, 2024).unwrap();
    assert!(s.expenses().is_empty());
}

#[test]
fn test_set_month_rejects_invalid() {
    let mut s = session();
    let before = s.month();
    let err = s.set_month(13, 2024).unwrap_err();
    assert_eq!(
        err.downcast_ref::<BudgetError>(),
        Some(&BudgetError::InvalidMonth {
            month: 13,
            year: 2024
        })
    );
    assert_eq!(s.month(), before);
}

#[test]
fn test_month_navigation_wraps() {
    let mut s = session();
    s.set_month(12, 2024).unwrap();
    s.next_month().unwrap();
    assert_eq!(s.month(), month(1, 2025));
    s.prev_month().unwrap();
    s.prev_month().unwrap();
    assert_eq!(s.month(), month(11, 2024));
}

#[test]
fn test_stale_month_load_is_discarded() {
    let mut s = session();
    let jan = vec![Expense::new(dec!(1), Category::Food, None, date(2024, 1, 3))];
    let feb = vec![Expense::new(dec!(2), Category::Food, None, date(2024, 2, 3))];

    let first = s.begin_month_load(month(1, 2024));
    let second = s.begin_month_load(month(2, 2024));

    assert!(s.finish_month_load(second, feb.clone()));
    assert!(!s.finish_month_load(first, jan));

    assert_eq!(s.month(), month(2, 2024));
    assert_eq!(s.expenses(), feb.as_slice());
}

#[test]
fn test_stale_load_finishing_first_is_discarded() {
    let mut s = session();
    let before = s.month();
    let first = s.begin_month_load(month(1, 2024));
    let second = s.begin_month_load(month(2, 2024));

    assert!(!s.finish_month_load(first, Vec::new()));
    assert_eq!(s.month(), before);
    assert!(s.finish_month_load(second, Vec::new()));
    assert_eq!(s.month(), month(2, 2024));
}

#[test]
fn test_failed_month_load_keeps_selection() {
    let (mut s, fail) = flaky_session();
    let before = s.month();
    fail.set(true);
    assert!(s.set_month(6, 2020).is_err());
    assert_eq!(s.month(), before);
}

// ── log_expense ───────────────────────────────────────────────

#[test]
fn test_log_expense_roundtrip() {
    let mut s = session();
    s.set_month(3, 2024).unwrap();
    let logged = s
        .log_expense("12.50", Category::Food, Some("bagels".into()), Some(date(2024, 3, 5)))
        .unwrap()
        .unwrap();

    assert_eq!(s.expenses()[0].id, logged.id);

    let stored = s.store.get_expenses(month(3, 2024)).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, logged.id);
    assert_eq!(stored[0].amount, dec!(12.50));
    assert_eq!(stored[0].category, Category::Food);
    assert_eq!(stored[0].date, date(2024, 3, 5));
}

#[test]
fn test_log_expense_refuses_missing_amount() {
    let mut s = session();
    for bad in ["", "   ", "abc", "0", "-4"] {
        assert!(s.log_expense(bad, Category::Fun, None, None).unwrap().is_none());
    }
    assert!(s.expenses().is_empty());
    assert!(s.store.get_expenses(s.month()).unwrap().is_empty());
}

#[test]
fn test_log_expense_defaults_to_today() {
    let mut s = session();
    let logged = s.log_expense("3", Category::Gym, None, None).unwrap().unwrap();
    assert_eq!(logged.date, Local::now().date_naive());
    assert_eq!(s.expenses().len(), 1);
}

#[test]
fn test_log_expense_prepends_by_insertion() {
    let mut s = session();
    s.set_month(3, 2024).unwrap();
    let late = s
        .log_expense("1", Category::Food, None, Some(date(2024, 3, 28)))
        .unwrap()
        .unwrap();
    let early = s
        .log_expense("2", Category::Food, None, Some(date(2024, 3, 1)))
        .unwrap()
        .unwrap();
    assert_eq!(s.expenses()[0].id, early.id);
    assert_eq!(s.expenses()[1].id, late.id);
}

#[test]
fn test_log_expense_outside_selected_month_is_stored_only() {
    let mut s = session();
    s.set_month(3, 2024).unwrap();
    s.log_expense("9", Category::Fun, None, Some(date(2024, 4, 2)))
        .unwrap()
        .unwrap();
    assert!(s.expenses().is_empty());
    assert_eq!(s.store.get_expenses(month(4, 2024)).unwrap().len(), 1);
}

#[test]
fn test_parse_amount_strips_symbols() {
    assert_eq!(parse_amount("$1,250.00"), Some(dec!(1250)));
    assert_eq!(parse_amount(" 7 "), Some(dec!(7)));
    assert_eq!(parse_amount("0.00"), None);
    assert_eq!(parse_amount("-5"), None);
    assert_eq!(parse_amount("abc"), None);
}

#[test]
fn test_parse_decimal_keeps_sign() {
    assert_eq!(parse_decimal("-5"), Some(dec!(-5)));
    assert_eq!(parse_decimal("0"), Some(Decimal::ZERO));
    assert_eq!(parse_decimal(""), None);
}

// ── remove_expense ────────────────────────────────────────────

#[test]
fn test_remove_expense_roundtrip() {
    let mut s = session();
    s.set_month(5, 2024).unwrap();
    let e = s
        .log_expense("20", Category::Social, None, Some(date(2024, 5, 5)))
        .unwrap()
        .unwrap();
    s.remove_expense(&e.id).unwrap();
    assert!(s.expenses().is_empty());
    assert!(s.store.get_expenses(month(5, 2024)).unwrap().is_empty());
}

#[test]
fn test_remove_unknown_expense_is_noop() {
    let mut s = session();
    s.set_month(5, 2024).unwrap();
    s.log_expense("20", Category::Social, None, Some(date(2024, 5, 5)))
        .unwrap();
    s.remove_expense("missing").unwrap();
    assert_eq!(s.expenses().len(), 1);
}

// ── edit_expense ──────────────────────────────────────────────

#[test]
fn test_edit_expense_roundtrip_preserves_identity() {
    let mut s = session();
    s.set_month(5, 2024).unwrap();
    let original = s
        .log_expense("20", Category::Social, Some("drinks".into()), Some(date(2024, 5, 5)))
        .unwrap()
        .unwrap();

    let mut edited = original.clone();
    edited.amount = dec!(25);
    edited.category = Category::Fun;
    edited.note = None;
    edited.date = date(2024, 5, 6);
    edited.created_at = chrono::Utc::now() + chrono::Duration::days(3);
    s.edit_expense(edited).unwrap();

    let in_memory = s.find_expense(&original.id).unwrap();
    assert_eq!(in_memory.amount, dec!(25));
    assert_eq!(in_memory.category, Category::Fun);
    assert_eq!(in_memory.created_at, original.created_at);

    let stored = s.store.get_expenses(month(5, 2024)).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, original.id);
    assert_eq!(stored[0].amount, dec!(25));
    assert_eq!(stored[0].date, date(2024, 5, 6));
    assert!(stored[0].note.is_none());
    assert_eq!(stored[0].created_at, original.created_at);
}

#[test]
fn test_edit_unknown_expense_is_error() {
    let mut s = session();
    s.set_month(5, 2024).unwrap();
    let stranger = Expense::new(dec!(1), Category::Food, None, date(2024, 5, 1));
    let err = s.edit_expense(stranger.clone()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<BudgetError>(),
        Some(&BudgetError::UnknownExpense(stranger.id))
    );
    assert!(s.store.get_expenses(month(5, 2024)).unwrap().is_empty());
}

#[test]
fn test_edit_moving_to_other_month_leaves_list() {
    let mut s = session();
    s.set_month(5, 2024).unwrap();
    let e = s
        .log_expense("20", Category::Food, None, Some(date(2024, 5, 5)))
        .unwrap()
        .unwrap();
    let mut moved = e.clone();
    moved.date = date(2024, 6, 1);
    s.edit_expense(moved).unwrap();
    assert!(s.expenses().is_empty());
    assert_eq!(s.store.get_expenses(month(6, 2024)).unwrap().len(), 1);
}

#[test]
fn test_oversized_amounts_are_refused() {
    let mut s = session();
    let huge = "79228162514264337593543950335";
    assert!(s.log_expense(huge, Category::Food, None, None).unwrap().is_none());
    assert!(s.expenses().is_empty());

    s.log_expense("1000000000000", Category::Food, None, None)
        .unwrap()
        .unwrap();
    s.log_expense("1000000000000", Category::Food, None, None)
        .unwrap()
        .unwrap();
    assert_eq!(s.snapshot().summary.total_spent, dec!(2000000000000));
}

#[test]
fn test_edit_expense_rejects_out_of_range_amount() {
    let mut s = session();
    let e = s.log_expense("20", Category::Food, None, None).unwrap().unwrap();

    let mut edited = e.clone();
    edited.amount = dec!(79228162514264337593543950000);
    let err = s.edit_expense(edited).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BudgetError>(),
        Some(BudgetError::InvalidAmount(_))
    ));

    let mut edited = e.clone();
    edited.amount = Decimal::ZERO;
    assert!(s.edit_expense(edited).is_err());

    assert_eq!(s.expenses()[0].amount, dec!(20));
    assert_eq!(s.store.get_expenses(s.month()).unwrap()[0].amount, dec!(20));
}

// ── Settings ──────────────────────────────────────────────────

#[test]
fn test_update_settings_persists_and_applies() {
    let mut s = session();
    s.update_settings(SettingUpdate::GrossSalary(dec!(90000))).unwrap();
    assert_eq!(s.settings().gross_salary, dec!(90000));
    assert_eq!(
        s.store.get_setting(keys::GROSS_SALARY).unwrap().as_deref(),
        Some("90000")
    );
}

#[test]
fn test_update_settings_rejects_invalid() {
    let mut s = session();
    let err = s
        .update_settings(SettingUpdate::PretaxPercent(dec!(150)))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BudgetError>(),
        Some(BudgetError::InvalidSetting(_))
    ));
    assert_eq!(s.settings().pretax_percent, dec!(10));
    assert_eq!(
        s.store.get_setting(keys::PRETAX_PERCENT).unwrap().as_deref(),
        Some("10")
    );
}

#[test]
fn test_oversized_salary_is_rejected() {
    let mut s = session();
    let err = s
        .update_settings(SettingUpdate::GrossSalary(dec!(79228162514264337593543950000)))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BudgetError>(),
        Some(BudgetError::InvalidSetting(_))
    ));
    assert_eq!(
        s.store.get_setting(keys::GROSS_SALARY).unwrap().as_deref(),
        Some("75000")
    );

    s.update_settings(SettingUpdate::GrossSalary(dec!(1000000000000))).unwrap();
    s.update_settings(SettingUpdate::Bonus(dec!(1000000000000))).unwrap();
    let th = s.take_home();
    assert_eq!(th.total_gross, dec!(2000000000000));
    assert!(th.monthly_take_home > Decimal::ZERO);
}

#[test]
fn test_initialize_ignores_oversized_stored_salary() {
    let mut store = MemoryStore::new().unwrap();
    store
        .set_setting(keys::GROSS_SALARY, "79228162514264337593543950000")
        .unwrap();
    let mut s = BudgetSession::new(Box::new(store));
    s.initialize().unwrap();
    assert_eq!(s.settings().gross_salary, dec!(75000));
    assert_eq!(s.snapshot().take_home, s.take_home());
}

#[test]
fn test_set_category_budget_persists_whole_map() {
    let mut s = session();
    s.set_category_budget(Category::Fun, dec!(200)).unwrap();
    assert_eq!(s.settings().budget_for(Category::Fun), dec!(200));

    let raw = s.store.get_setting(keys::CATEGORY_BUDGETS).unwrap().unwrap();
    let stored = HashMap::from([(keys::CATEGORY_BUDGETS.to_string(), raw)]);
    let reloaded = Settings::from_stored(&stored);
    assert_eq!(reloaded.category_budgets.len(), 11);
    assert_eq!(reloaded.budget_for(Category::Fun), dec!(200));
    assert_eq!(reloaded.budget_for(Category::Rent), dec!(3000));
}

#[test]
fn test_complete_onboarding() {
    let mut s = session();
    s.complete_onboarding().unwrap();
    assert!(s.settings().onboarding_complete);
    assert_eq!(
        s.store.get_setting(keys::ONBOARDING_COMPLETE).unwrap().as_deref(),
        Some("true")
    );
}

#[test]
fn test_complete_onboarding_with_validates_first() {
    let mut s = session();
    let err = s
        .complete_onboarding_with(dec!(50000), dec!(0), dec!(101), None)
        .unwrap_err();
    assert!(err.downcast_ref::<BudgetError>().is_some());
    assert_eq!(s.settings(), &Settings::default());
    assert_eq!(
        s.store.get_setting(keys::GROSS_SALARY).unwrap().as_deref(),
        Some("75000")
    );

    s.complete_onboarding_with(dec!(50000), dec!(0), dec!(5), None)
        .unwrap();
    assert_eq!(s.settings().gross_salary, dec!(50000));
    assert_eq!(s.settings().bonus, dec!(0));
    assert_eq!(s.settings().pretax_percent, dec!(5));
    assert!(s.settings().onboarding_complete);
}

// ── Update after persist ──────────────────────────────────────

#[test]
fn test_failed_writes_leave_memory_untouched() {
    let (mut s, fail) = flaky_session();
    s.set_month(5, 2024).unwrap();
    let kept = s
        .log_expense("10", Category::Food, None, Some(date(2024, 5, 5)))
        .unwrap()
        .unwrap();

    fail.set(true);

    assert!(s
        .log_expense("99", Category::Fun, None, Some(date(2024, 5, 6)))
        .is_err());
    assert_eq!(s.expenses().len(), 1);

    assert!(s.remove_expense(&kept.id).is_err());
    assert_eq!(s.expenses().len(), 1);

    let mut edited = kept.clone();
    edited.amount = dec!(11);
    assert!(s.edit_expense(edited).is_err());
    assert_eq!(s.expenses()[0].amount, dec!(10));

    assert!(s.update_settings(SettingUpdate::Bonus(dec!(1))).is_err());
    assert_eq!(s.settings().bonus, dec!(7000));

    assert!(s.complete_onboarding().is_err());
    assert!(!s.settings().onboarding_complete);
}

// ── Derived views ─────────────────────────────────────────────

#[test]
fn test_take_home_from_default_settings() {
    let s = session();
    let b = s.take_home();
    assert_eq!(b.monthly_take_home, dec!(4646.67));
    assert_eq!(b.annual_take_home, dec!(55760));
}

#[test]
fn test_derived_views_follow_mutations() {
    let mut s = session();
    s.set_month(5, 2024).unwrap();
    assert_eq!(s.remaining_total(), dec!(4646.67));

    s.log_expense("3000", Category::Rent, None, Some(date(2024, 5, 1)))
        .unwrap();
    s.log_expense("100", Category::Fun, None, Some(date(2024, 5, 2)))
        .unwrap();

    let summary = s.summary();
    assert_eq!(summary.total_spent, dec!(3100));
    assert_eq!(summary.over_budget_categories, vec![Category::Rent]);
    assert_eq!(summary.warning_categories, vec![Category::Fun]);
    assert_eq!(s.remaining_total(), dec!(1546.67));

    s.update_settings(SettingUpdate::GrossSalary(Decimal::ZERO))
        .unwrap();
    s.update_settings(SettingUpdate::Bonus(Decimal::ZERO)).unwrap();
    assert_eq!(s.take_home().monthly_take_home, Decimal::ZERO);
    assert_eq!(s.remaining_total(), dec!(-3100));
}

#[test]
fn test_snapshot_is_consistent() {
    let mut s = session();
    s.set_month(5, 2024).unwrap();
    s.log_expense("100", Category::Food, None, Some(date(2024, 5, 1)))
        .unwrap();
    s.log_expense("100", Category::Fun, None, Some(date(2024, 5, 1)))
        .unwrap();

    let snap = s.snapshot();
    assert!(!snap.loading);
    assert_eq!(snap.month, month(5, 2024));
    assert_eq!(snap.expenses.len(), 2);
    assert_eq!(snap.take_home, s.take_home());
    assert_eq!(snap.summary, s.summary());
    assert_eq!(snap.allocation, s.allocation());
    assert_eq!(snap.remaining_total, s.remaining_total());
    assert_eq!(snap.splurge.needs_pct, dec!(50));
    assert_eq!(snap.splurge.treats_pct, dec!(15));
}

// ── Input helpers ─────────────────────────────────────────────

#[test]
fn test_parse_category() {
    assert_eq!(parse_category("Food").unwrap(), Category::Food);
    assert_eq!(
        parse_category(" yacht "),
        Err(BudgetError::UnknownCategory("yacht".into()))
    );
}

// ── Export ────────────────────────────────────────────────────

#[test]
fn test_export_csv_writes_selected_month() {
    let mut s = session();
    s.set_month(6, 2024).unwrap();
    s.log_expense("12.5", Category::Food, Some("tacos".into()), Some(date(2024, 6, 3)))
        .unwrap();
    s.log_expense("40", Category::Gym, None, Some(date(2024, 7, 1)))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("june.csv");
    assert_eq!(s.export_csv(&path).unwrap(), 1);

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("2024-06-03,food,12.5,tacos"));
    assert!(!contents.contains("gym"));
}

#[test]
fn test_stored_setting_reads_persisted_value() {
    let mut s = session();
    s.update_settings(SettingUpdate::Bonus(dec!(1234))).unwrap();
    assert_eq!(
        s.stored_setting(keys::BONUS).unwrap().as_deref(),
        Some("1234")
    );
    assert_eq!(s.stored_setting("nope").unwrap(), None);
}
