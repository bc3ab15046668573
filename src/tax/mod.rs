//! Take-home pay for a single filer: progressive federal brackets, a flat
//! state rate, and FICA.
//!
//! Pure arithmetic on `Decimal`. Inputs are not clamped; callers validate.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// 2024 single-filer standard deduction.
pub(crate) const STANDARD_DEDUCTION: Decimal = dec!(14600);
/// Flat state income tax, applied before the standard deduction.
pub(crate) const STATE_TAX_RATE: Decimal = dec!(0.05);
pub(crate) const SOCIAL_SECURITY_RATE: Decimal = dec!(0.062);
/// 2024 Social Security wage base.
pub(crate) const SOCIAL_SECURITY_WAGE_BASE: Decimal = dec!(168600);
pub(crate) const MEDICARE_RATE: Decimal = dec!(0.0145);

pub(crate) struct Bracket {
    pub(crate) lower: Decimal,
    /// `None` for the top bracket.
    pub(crate) upper: Option<Decimal>,
    pub(crate) rate: Decimal,
}

/// 2024 federal brackets, single filer.
pub(crate) const FEDERAL_BRACKETS: [Bracket; 7] = [
    Bracket {
        lower: dec!(0),
        upper: Some(dec!(11600)),
        rate: dec!(0.10),
    },
    Bracket {
        lower: dec!(11600),
        upper: Some(dec!(47150)),
        rate: dec!(0.12),
    },
    Bracket {
        lower: dec!(47150),
        upper: Some(dec!(100525)),
        rate: dec!(0.22),
    },
    Bracket {
        lower: dec!(100525),
        upper: Some(dec!(191950)),
        rate: dec!(0.24),
    },
    Bracket {
        lower: dec!(191950),
        upper: Some(dec!(243725)),
        rate: dec!(0.32),
    },
    Bracket {
        lower: dec!(243725),
        upper: Some(dec!(609350)),
        rate: dec!(0.35),
    },
    Bracket {
        lower: dec!(609350),
        upper: None,
        rate: dec!(0.37),
    },
];

/// Annual pay breakdown. Every field is rounded to cents on its own.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TakeHomeBreakdown {
    pub(crate) total_gross: Decimal,
    pub(crate) pretax_contribution: Decimal,
    pub(crate) pretax_contribution_monthly: Decimal,
    pub(crate) after_pretax: Decimal,
    pub(crate) federal_taxable_income: Decimal,
    pub(crate) federal_tax: Decimal,
    pub(crate) state_tax: Decimal,
    pub(crate) social_security: Decimal,
    pub(crate) medicare: Decimal,
    pub(crate) fica_total: Decimal,
    pub(crate) total_taxes: Decimal,
    pub(crate) annual_take_home: Decimal,
    pub(crate) monthly_take_home: Decimal,
}

/// Half-up to cents.
pub(crate) fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Tax on `taxable_income` across the progressive bracket table. Each
/// bracket taxes only the slice of income inside `[lower, upper)`.
pub(crate) fn federal_tax(taxable_income: Decimal) -> Decimal {
    let mut tax = Decimal::ZERO;
    for bracket in &FEDERAL_BRACKETS {
        if taxable_income <= bracket.lower {
            break;
        }
        let top = match bracket.upper {
            Some(upper) => taxable_income.min(upper),
            None => taxable_income,
        };
        tax += (top - bracket.lower) * bracket.rate;
    }
    tax
}

pub(crate) fn compute_take_home(
    gross_salary: Decimal,
    bonus: Decimal,
    pretax_percent: Decimal,
) -> TakeHomeBreakdown {
    let total_gross = gross_salary + bonus;

    let pretax_contribution = total_gross * pretax_percent / dec!(100);
    let after_pretax = total_gross - pretax_contribution;

    let federal_taxable_income = (after_pretax - STANDARD_DEDUCTION).max(Decimal::ZERO);
    let federal = federal_tax(federal_taxable_income);

    // State base deliberately skips the federal standard deduction.
    let state = after_pretax * STATE_TAX_RATE;

    // FICA is on gross wages, not reduced by the pretax contribution.
    let social_security = total_gross.min(SOCIAL_SECURITY_WAGE_BASE) * SOCIAL_SECURITY_RATE;
    let medicare = total_gross * MEDICARE_RATE;
    let fica_total = social_security + medicare;

    let total_taxes = federal + state + fica_total;
    let annual_take_home = total_gross - pretax_contribution - total_taxes;

    TakeHomeBreakdown {
        total_gross: round_cents(total_gross),
        pretax_contribution: round_cents(pretax_contribution),
        pretax_contribution_monthly: round_cents(pretax_contribution / dec!(12)),
        after_pretax: round_cents(after_pretax),
        federal_taxable_income: round_cents(federal_taxable_income),
        federal_tax: round_cents(federal),
        state_tax: round_cents(state),
        social_security: round_cents(social_security),
        medicare: round_cents(medicare),
        fica_total: round_cents(fica_total),
        total_taxes: round_cents(total_taxes),
        annual_take_home: round_cents(annual_take_home),
        monthly_take_home: round_cents(annual_take_home / dec!(12)),
    }
}
