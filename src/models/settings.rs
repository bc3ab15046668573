use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use tracing::warn;

use super::{Category, MAX_AMOUNT};

/// Keys in the persisted settings store.
pub(crate) mod keys {
    pub(crate) const GROSS_SALARY: &str = "gross_salary";
    pub(crate) const BONUS: &str = "bonus";
    pub(crate) const PRETAX_PERCENT: &str = "four01k_percent";
    pub(crate) const ONBOARDING_COMPLETE: &str = "onboarding_complete";
    pub(crate) const CATEGORY_BUDGETS: &str = "category_budgets";
}

pub(crate) const DEFAULT_GROSS_SALARY: Decimal = dec!(75000);
pub(crate) const DEFAULT_BONUS: Decimal = dec!(7000);
pub(crate) const DEFAULT_PRETAX_PERCENT: Decimal = dec!(10);

pub(crate) fn default_budgets() -> BTreeMap<Category, Decimal> {
    BTreeMap::from([
        (Category::Rent, dec!(3000)),
        (Category::Food, dec!(450)),
        (Category::Gym, dec!(50)),
        (Category::RothIra, dec!(583)),
        (Category::Fun, dec!(120)),
        (Category::Social, dec!(150)),
        (Category::Utilities, dec!(200)),
        (Category::Transportation, dec!(90)),
        (Category::RentersInsurance, dec!(30)),
        (Category::PersonalCare, dec!(60)),
        (Category::Savings, dec!(500)),
    ])
}

/// User settings. Every field has a fixed default; a missing or
/// unreadable stored value never fails a load.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Settings {
    /// Annual.
    pub(crate) gross_salary: Decimal,
    /// Annual.
    pub(crate) bonus: Decimal,
    /// 0-100.
    pub(crate) pretax_percent: Decimal,
    pub(crate) onboarding_complete: bool,
    /// Monthly budget per category.
    pub(crate) category_budgets: BTreeMap<Category, Decimal>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gross_salary: DEFAULT_GROSS_SALARY,
            bonus: DEFAULT_BONUS,
            pretax_percent: DEFAULT_PRETAX_PERCENT,
            onboarding_complete: false,
            category_budgets: default_budgets(),
        }
    }
}

impl Settings {
    /// Build settings from raw stored strings, keeping the default for any
    /// field that is missing or malformed.
    pub(crate) fn from_stored(stored: &HashMap<String, String>) -> Self {
        let mut settings = Self::default();

        let numeric = [
            decimal_field(stored, keys::GROSS_SALARY).map(SettingUpdate::GrossSalary),
            decimal_field(stored, keys::BONUS).map(SettingUpdate::Bonus),
            decimal_field(stored, keys::PRETAX_PERCENT).map(SettingUpdate::PretaxPercent),
        ];
        for update in numeric.into_iter().flatten() {
            match update.validate() {
                Some(reason) => warn!("Ignoring stored {}: {reason}", update.key()),
                None => update.apply(&mut settings),
            }
        }
        if let Some(raw) = stored.get(keys::ONBOARDING_COMPLETE) {
            settings.onboarding_complete = raw.trim() == "true";
        }
        if let Some(raw) = stored.get(keys::CATEGORY_BUDGETS) {
            match decode_budgets(raw) {
                Ok(budgets) => settings.category_budgets = budgets,
                Err(e) => warn!("Ignoring stored {}: {e:#}", keys::CATEGORY_BUDGETS),
            }
        }

        settings
    }

    /// Stored form of every field, used to seed a fresh store.
    pub(crate) fn to_stored(&self) -> Result<Vec<(&'static str, String)>> {
        Ok(vec![
            (keys::GROSS_SALARY, encode_decimal(self.gross_salary)),
            (keys::BONUS, encode_decimal(self.bonus)),
            (keys::PRETAX_PERCENT, encode_decimal(self.pretax_percent)),
            (
                keys::ONBOARDING_COMPLETE,
                self.onboarding_complete.to_string(),
            ),
            (
                keys::CATEGORY_BUDGETS,
                encode_budgets(&self.category_budgets)?,
            ),
        ])
    }

    pub(crate) fn budget_for(&self, category: Category) -> Decimal {
        self.category_budgets
            .get(&category)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

fn decimal_field(stored: &HashMap<String, String>, key: &str) -> Option<Decimal> {
    let raw = stored.get(key)?;
    match Decimal::from_str(raw.trim()) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Ignoring stored {key} = {raw:?}: {e}");
            None
        }
    }
}

pub(crate) fn encode_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

pub(crate) fn encode_budgets(budgets: &BTreeMap<Category, Decimal>) -> Result<String> {
    let by_key: BTreeMap<&str, Decimal> = budgets
        .iter()
        .map(|(cat, amount)| (cat.as_str(), *amount))
        .collect();
    serde_json::to_string(&by_key).context("Failed to encode category budgets")
}

/// Parse the stored budget JSON. Unknown category keys are skipped; a
/// negative or oversized amount rejects the whole map.
pub(crate) fn decode_budgets(raw: &str) -> Result<BTreeMap<Category, Decimal>> {
    let by_key: BTreeMap<String, Decimal> =
        serde_json::from_str(raw).context("Category budgets are not a JSON object of numbers")?;

    let mut budgets = BTreeMap::new();
    for (key, amount) in by_key {
        let Some(category) = Category::parse(&key) else {
            warn!("Skipping budget for unknown category '{key}'");
            continue;
        };
        if amount < Decimal::ZERO || amount > MAX_AMOUNT {
            anyhow::bail!("Budget for {key} out of range: {amount}");
        }
        budgets.insert(category, amount);
    }
    Ok(budgets)
}

/// A single-field settings change.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SettingUpdate {
    GrossSalary(Decimal),
    Bonus(Decimal),
    PretaxPercent(Decimal),
    OnboardingComplete(bool),
    /// The whole map is persisted as one unit.
    CategoryBudgets(BTreeMap<Category, Decimal>),
}

impl SettingUpdate {
    pub(crate) fn key(&self) -> &'static str {
        match self {
            Self::GrossSalary(_) => keys::GROSS_SALARY,
            Self::Bonus(_) => keys::BONUS,
            Self::PretaxPercent(_) => keys::PRETAX_PERCENT,
            Self::OnboardingComplete(_) => keys::ONBOARDING_COMPLETE,
            Self::CategoryBudgets(_) => keys::CATEGORY_BUDGETS,
        }
    }

    /// Reason the value can't be stored, if any.
    pub(crate) fn validate(&self) -> Option<String> {
        match self {
            Self::GrossSalary(v) | Self::Bonus(v) if *v < Decimal::ZERO => {
                Some(format!("{} must not be negative", self.key()))
            }
            Self::GrossSalary(v) | Self::Bonus(v) if *v > MAX_AMOUNT => {
                Some(format!("{} must be at most {MAX_AMOUNT}, got {v}", self.key()))
            }
            Self::PretaxPercent(v) if *v < Decimal::ZERO || *v > dec!(100) => {
                Some(format!("pretax percent must be between 0 and 100, got {v}"))
            }
            Self::CategoryBudgets(budgets) => budgets
                .iter()
                .find(|(_, amount)| **amount < Decimal::ZERO || **amount > MAX_AMOUNT)
                .map(|(cat, amount)| {
                    format!(
                        "budget for {} must be between 0 and {MAX_AMOUNT}, got {amount}",
                        cat.as_str()
                    )
                }),
            _ => None,
        }
    }

    pub(crate) fn encode(&self) -> Result<String> {
        Ok(match self {
            Self::GrossSalary(v) | Self::Bonus(v) | Self::PretaxPercent(v) => encode_decimal(*v),
            Self::OnboardingComplete(b) => b.to_string(),
            Self::CategoryBudgets(budgets) => encode_budgets(budgets)?,
        })
    }

    pub(crate) fn apply(self, settings: &mut Settings) {
        match self {
            Self::GrossSalary(v) => settings.gross_salary = v,
            Self::Bonus(v) => settings.bonus = v,
            Self::PretaxPercent(v) => settings.pretax_percent = v,
            Self::OnboardingComplete(b) => settings.onboarding_complete = b,
            Self::CategoryBudgets(budgets) => settings.category_budgets = budgets,
        }
    }
}
