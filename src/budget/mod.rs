//! Per-category spend, budget health, and the needs/wants/treats split for
//! one month of expenses.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

use crate::models::{Category, CategoryKind, Expense};

/// Spent/budget ratio at which a category starts warning (inclusive).
pub(crate) const WARNING_RATIO: Decimal = dec!(0.8);
/// Share of wants spending shown as treats on the splurge meter.
pub(crate) const TREATS_SHARE: Decimal = dec!(0.30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CategoryStatus {
    /// No budget set.
    Neutral,
    Good,
    Warning,
    Over,
}

impl CategoryStatus {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Good => "good",
            Self::Warning => "warning",
            Self::Over => "over",
        }
    }
}

impl std::fmt::Display for CategoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub(crate) fn category_status(spent: Decimal, budget: Decimal) -> CategoryStatus {
    if budget <= Decimal::ZERO {
        CategoryStatus::Neutral
    } else if spent >= budget {
        CategoryStatus::Over
    } else if spent >= budget * WARNING_RATIO {
        CategoryStatus::Warning
    } else {
        CategoryStatus::Good
    }
}

/// The mascot's reaction to the month so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mood {
    Happy,
    Nervous,
    Alarmed,
}

impl Mood {
    /// Any over-budget category wins over any warning.
    pub(crate) fn from_categories(over: &[Category], warning: &[Category]) -> Self {
        if !over.is_empty() {
            Self::Alarmed
        } else if !warning.is_empty() {
            Self::Nervous
        } else {
            Self::Happy
        }
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Nervous => "nervous",
            Self::Alarmed => "alarmed",
        }
    }

    pub(crate) fn quotes(&self) -> &'static [&'static str] {
        match self {
            Self::Happy => &[
                "You're doing great! 🐾",
                "Saving is fetching! 🦴",
                "Good human! Keep it up!",
                "Woof! That's some smart spending!",
                "Tail wags for budget wins!",
            ],
            Self::Nervous => &[
                "Maybe think twice about that one...",
                "Ruff... that category is getting tight!",
                "I'm getting a little nervous over here...",
                "Social spending is getting close to the limit. Maybe a cozy night in?",
                "Careful there, friend...",
            ],
            Self::Alarmed => &[
                "Don't worry, tomorrow is a new day!",
                "We can adjust the plan together!",
                "Uh oh... let's figure this out!",
                "Over budget, but it's okay. We've got this!",
                "*hides behind couch*",
            ],
        }
    }
}

/// Mascot lines before onboarding is finished.
pub(crate) const GREETING_QUOTES: &[&str] = &[
    "Welcome back! Let's check your budget!",
    "Hey there! Ready to be money-smart?",
    "Woof! Glad to see you!",
];

/// Mascot lines for a month with nothing logged yet.
pub(crate) const SLEEPING_QUOTES: &[&str] = &[
    "Zzz... budget looks good... zzz...",
    "*dreaming of treats*",
    "Zzz... 💤",
];

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Percent shares of tracked spending. All zero when nothing is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SplurgeMeter {
    pub(crate) needs_pct: Decimal,
    pub(crate) wants_pct: Decimal,
    pub(crate) treats_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BudgetSummary {
    /// Only categories with at least one expense appear.
    pub(crate) spending_by_category: BTreeMap<Category, Decimal>,
    pub(crate) budgets: BTreeMap<Category, Decimal>,
    pub(crate) total_budget: Decimal,
    pub(crate) total_spent: Decimal,
    pub(crate) needs_spent: Decimal,
    pub(crate) wants_spent_raw: Decimal,
    pub(crate) treats_spent: Decimal,
    /// Wants with the treats slice carved out.
    pub(crate) wants_spent: Decimal,
    pub(crate) savings_spent: Decimal,
    /// Catalog order.
    pub(crate) over_budget_categories: Vec<Category>,
    /// Catalog order.
    pub(crate) warning_categories: Vec<Category>,
    pub(crate) mood: Mood,
}

impl BudgetSummary {
    /// `expenses` must already be limited to the month being summarised.
    pub(crate) fn compute(expenses: &[Expense], budgets: &BTreeMap<Category, Decimal>) -> Self {
        let mut spending_by_category: BTreeMap<Category, Decimal> = BTreeMap::new();
        for e in expenses {
            *spending_by_category.entry(e.category).or_insert(Decimal::ZERO) += e.amount;
        }

        let total_budget: Decimal = budgets.values().copied().sum();
        let total_spent: Decimal = spending_by_category.values().copied().sum();

        let spent_of_kind = |kind: CategoryKind| -> Decimal {
            spending_by_category
                .iter()
                .filter(|(c, _)| c.kind() == kind)
                .map(|(_, amt)| *amt)
                .sum()
        };
        let needs_spent = spent_of_kind(CategoryKind::Needs);
        let wants_spent_raw = spent_of_kind(CategoryKind::Wants);
        let savings_spent = spent_of_kind(CategoryKind::Savings);
        let treats_spent = (wants_spent_raw * TREATS_SHARE).max(Decimal::ZERO);
        let wants_spent = wants_spent_raw - treats_spent;

        let mut over_budget_categories = Vec::new();
        let mut warning_categories = Vec::new();
        for (category, budget) in budgets {
            let spent = spending_by_category
                .get(category)
                .copied()
                .unwrap_or(Decimal::ZERO);
            match category_status(spent, *budget) {
                CategoryStatus::Over => over_budget_categories.push(*category),
                CategoryStatus::Warning => warning_categories.push(*category),
                CategoryStatus::Good | CategoryStatus::Neutral => {}
            }
        }
        let mood = Mood::from_categories(&over_budget_categories, &warning_categories);

        Self {
            spending_by_category,
            budgets: budgets.clone(),
            total_budget,
            total_spent,
            needs_spent,
            wants_spent_raw,
            treats_spent,
            wants_spent,
            savings_spent,
            over_budget_categories,
            warning_categories,
            mood,
        }
    }

    pub(crate) fn spent_in(&self, category: Category) -> Decimal {
        self.spending_by_category
            .get(&category)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub(crate) fn budget_for(&self, category: Category) -> Decimal {
        self.budgets.get(&category).copied().unwrap_or(Decimal::ZERO)
    }

    pub(crate) fn category_status(&self, category: Category) -> CategoryStatus {
        category_status(self.spent_in(category), self.budget_for(category))
    }

    /// Percent of budget used, clamped to 0-100. Zero without a budget.
    pub(crate) fn category_progress(&self, category: Category) -> Decimal {
        let budget = self.budget_for(category);
        if budget <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (self.spent_in(category) / budget * dec!(100))
            .max(Decimal::ZERO)
            .min(dec!(100))
    }

    /// Denominator of the splurge meter: needs + wants, savings excluded.
    pub(crate) fn total_tracked(&self) -> Decimal {
        self.needs_spent + self.wants_spent + self.treats_spent
    }

    pub(crate) fn splurge(&self) -> SplurgeMeter {
        let total = self.total_tracked();
        let pct = |part: Decimal| {
            if total > Decimal::ZERO {
                part / total * dec!(100)
            } else {
                Decimal::ZERO
            }
        };
        SplurgeMeter {
            needs_pct: pct(self.needs_spent),
            wants_pct: pct(self.wants_spent),
            treats_pct: pct(self.treats_spent),
        }
    }
}

/// How much of the monthly take-home the category budgets claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Allocation {
    pub(crate) monthly_take_home: Decimal,
    pub(crate) total_allocated: Decimal,
    pub(crate) remaining: Decimal,
    /// Capped at 100; zero when there is no take-home.
    pub(crate) allocated_pct: Decimal,
    pub(crate) over_allocated: bool,
}

impl Allocation {
    pub(crate) fn compute(budgets: &BTreeMap<Category, Decimal>, monthly_take_home: Decimal) -> Self {
        let total_allocated: Decimal = budgets.values().copied().sum();
        let allocated_pct = if monthly_take_home > Decimal::ZERO {
            (total_allocated / monthly_take_home * dec!(100)).min(dec!(100))
        } else {
            Decimal::ZERO
        };
        Self {
            monthly_take_home,
            total_allocated,
            remaining: monthly_take_home - total_allocated,
            allocated_pct,
            over_allocated: total_allocated > monthly_take_home,
        }
    }

    /// One budget as a percent of take-home, uncapped.
    pub(crate) fn share_of_take_home(&self, amount: Decimal) -> Decimal {
        if self.monthly_take_home > Decimal::ZERO {
            amount / self.monthly_take_home * dec!(100)
        } else {
            Decimal::ZERO
        }
    }
}

#[cfg(test)]
mod tests;
