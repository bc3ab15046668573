#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

use super::*;
use crate::models::default_budgets;

fn expense(amount: Decimal, category: Category) -> Expense {
    Expense::new(
        amount,
        category,
        None,
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
    )
}

// ── category_status ───────────────────────────────────────────

#[test]
fn test_status_neutral_without_budget() {
    assert_eq!(category_status(Decimal::ZERO, Decimal::ZERO), CategoryStatus::Neutral);
    assert_eq!(category_status(dec!(500), Decimal::ZERO), CategoryStatus::Neutral);
}

#[test]
fn test_status_thresholds_are_inclusive() {
    assert_eq!(category_status(dec!(79.99), dec!(100)), CategoryStatus::Good);
    assert_eq!(category_status(dec!(80), dec!(100)), CategoryStatus::Warning);
    assert_eq!(category_status(dec!(99.99), dec!(100)), CategoryStatus::Warning);
    assert_eq!(category_status(dec!(100), dec!(100)), CategoryStatus::Over);
    assert_eq!(category_status(dec!(250), dec!(100)), CategoryStatus::Over);
}

#[test]
fn test_status_nothing_spent_is_good() {
    assert_eq!(category_status(Decimal::ZERO, dec!(50)), CategoryStatus::Good);
}

// ── BudgetSummary ─────────────────────────────────────────────

#[test]
fn test_empty_month() {
    let s = BudgetSummary::compute(&[], &default_budgets());
    assert!(s.spending_by_category.is_empty());
    assert_eq!(s.total_spent, Decimal::ZERO);
    assert_eq!(s.total_budget, dec!(5233));
    assert!(s.over_budget_categories.is_empty());
    assert!(s.warning_categories.is_empty());
    assert_eq!(s.mood, Mood::Happy);
}

#[test]
fn test_spending_by_category_sums() {
    let expenses = vec![
        expense(dec!(12.50), Category::Food),
        expense(dec!(30.25), Category::Food),
        expense(dec!(3000), Category::Rent),
    ];
    let s = BudgetSummary::compute(&expenses, &default_budgets());
    assert_eq!(s.spent_in(Category::Food), dec!(42.75));
    assert_eq!(s.spent_in(Category::Rent), dec!(3000));
    assert_eq!(s.spent_in(Category::Gym), Decimal::ZERO);
    assert_eq!(s.spending_by_category.len(), 2);
    assert_eq!(s.total_spent, dec!(3042.75));
}

#[test]
fn test_over_and_warning_lists_in_catalog_order() {
    let expenses = vec![
        expense(dec!(200), Category::Social), // 150 budget -> over
        expense(dec!(3000), Category::Rent),  // exactly budget -> over
        expense(dec!(100), Category::Fun),    // 120 budget -> warning
        expense(dec!(40), Category::Gym),     // 50 budget -> warning (0.8)
        expense(dec!(10), Category::Food),    // good
    ];
    let s = BudgetSummary::compute(&expenses, &default_budgets());
    assert_eq!(s.over_budget_categories, vec![Category::Rent, Category::Social]);
    assert_eq!(s.warning_categories, vec![Category::Gym, Category::Fun]);
    assert_eq!(s.category_status(Category::Food), CategoryStatus::Good);
}

#[test]
fn test_mood_precedence() {
    let expenses = vec![
        expense(dec!(100), Category::Fun),
        expense(dec!(151), Category::Social),
    ];
    let s = BudgetSummary::compute(&expenses, &default_budgets());
    assert!(!s.warning_categories.is_empty());
    assert_eq!(s.mood, Mood::Alarmed);

    let s = BudgetSummary::compute(&[expense(dec!(100), Category::Fun)], &default_budgets());
    assert_eq!(s.mood, Mood::Nervous);
}

#[test]
fn test_mood_from_lists() {
    assert_eq!(Mood::from_categories(&[], &[]), Mood::Happy);
    assert_eq!(Mood::from_categories(&[], &[Category::Fun]), Mood::Nervous);
    assert_eq!(
        Mood::from_categories(&[Category::Rent], &[Category::Fun]),
        Mood::Alarmed
    );
}

#[test]
fn test_unbudgeted_spending_is_neutral() {
    let budgets = BTreeMap::from([(Category::Food, dec!(100))]);
    let s = BudgetSummary::compute(&[expense(dec!(999), Category::Fun)], &budgets);
    assert_eq!(s.category_status(Category::Fun), CategoryStatus::Neutral);
    assert!(s.over_budget_categories.is_empty());
    assert_eq!(s.mood, Mood::Happy);
}

// ── Splurge meter ─────────────────────────────────────────────

#[test]
fn test_treats_split_from_wants() {
    let expenses = vec![
        expense(dec!(60), Category::Fun),
        expense(dec!(40), Category::Social),
    ];
    let s = BudgetSummary::compute(&expenses, &default_budgets());
    assert_eq!(s.wants_spent_raw, dec!(100));
    assert_eq!(s.treats_spent, dec!(30));
    assert_eq!(s.wants_spent, dec!(70));
}

#[test]
fn test_splurge_parts_sum_to_tracked_total() {
    let expenses = vec![
        expense(dec!(900), Category::Rent),
        expense(dec!(100), Category::Food),
        expense(dec!(33.33), Category::Gym),
        expense(dec!(250), Category::Savings),
    ];
    let s = BudgetSummary::compute(&expenses, &default_budgets());
    assert_eq!(s.needs_spent, dec!(1000));
    assert_eq!(s.savings_spent, dec!(250));
    assert_eq!(
        s.needs_spent + s.wants_spent + s.treats_spent,
        s.needs_spent + s.wants_spent_raw
    );
    assert_eq!(s.total_tracked(), dec!(1033.33));
    assert_eq!(s.total_spent, s.total_tracked() + s.savings_spent);
}

#[test]
fn test_splurge_percentages() {
    let expenses = vec![
        expense(dec!(100), Category::Food),
        expense(dec!(100), Category::Fun),
    ];
    let meter = BudgetSummary::compute(&expenses, &default_budgets()).splurge();
    assert_eq!(meter.needs_pct, dec!(50));
    assert_eq!(meter.wants_pct, dec!(35));
    assert_eq!(meter.treats_pct, dec!(15));
}

#[test]
fn test_splurge_empty_is_zero() {
    let meter = BudgetSummary::compute(&[], &default_budgets()).splurge();
    assert_eq!(meter.needs_pct, Decimal::ZERO);
    assert_eq!(meter.wants_pct, Decimal::ZERO);
    assert_eq!(meter.treats_pct, Decimal::ZERO);
}

// ── Progress ──────────────────────────────────────────────────

#[test]
fn test_category_progress_clamped() {
    let expenses = vec![
        expense(dec!(225), Category::Food),
        expense(dec!(500), Category::Gym),
    ];
    let s = BudgetSummary::compute(&expenses, &default_budgets());
    assert_eq!(s.category_progress(Category::Food), dec!(50));
    assert_eq!(s.category_progress(Category::Gym), dec!(100));
    assert_eq!(s.category_progress(Category::Fun), Decimal::ZERO);

    let no_budget = BudgetSummary::compute(&expenses, &BTreeMap::new());
    assert_eq!(no_budget.category_progress(Category::Food), Decimal::ZERO);
}

// ── Allocation ────────────────────────────────────────────────

#[test]
fn test_allocation_under_take_home() {
    let a = Allocation::compute(&default_budgets(), dec!(10466));
    assert_eq!(a.total_allocated, dec!(5233));
    assert_eq!(a.remaining, dec!(5233));
    assert_eq!(a.allocated_pct, dec!(50));
    assert!(!a.over_allocated);
    assert_eq!(a.share_of_take_home(dec!(1046.6)), dec!(10));
}

#[test]
fn test_allocation_over_take_home() {
    let a = Allocation::compute(&default_budgets(), dec!(4646.67));
    assert!(a.over_allocated);
    assert_eq!(a.allocated_pct, dec!(100));
    assert_eq!(a.remaining, dec!(-586.33));
}

#[test]
fn test_allocation_without_take_home() {
    let a = Allocation::compute(&default_budgets(), Decimal::ZERO);
    assert_eq!(a.allocated_pct, Decimal::ZERO);
    assert_eq!(a.share_of_take_home(dec!(100)), Decimal::ZERO);
    assert!(a.over_allocated);
}
