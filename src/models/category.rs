/// Which slice of the splurge meter a category's spending lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum CategoryKind {
    Needs,
    Wants,
    Savings,
}

impl CategoryKind {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Needs => "needs",
            Self::Wants => "wants",
            Self::Savings => "savings",
        }
    }
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fixed budgeting buckets. Declaration order is catalog order, and the
/// derived `Ord` relies on it so ordered maps iterate in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Category {
    Rent,
    Food,
    Gym,
    RothIra,
    Fun,
    Social,
    Utilities,
    Transportation,
    RentersInsurance,
    PersonalCare,
    Savings,
}

impl Category {
    /// Persisted key.
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Rent => "rent",
            Self::Food => "food",
            Self::Gym => "gym",
            Self::RothIra => "roth_ira",
            Self::Fun => "fun",
            Self::Social => "social",
            Self::Utilities => "utilities",
            Self::Transportation => "transportation",
            Self::RentersInsurance => "renters_insurance",
            Self::PersonalCare => "personal_care",
            Self::Savings => "savings",
        }
    }

    /// Parse a persisted key or a display label, case-insensitively.
    /// Unknown keys are rejected.
    pub(crate) fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == lower || c.label().to_lowercase() == lower)
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Rent => "Rent",
            Self::Food => "Food",
            Self::Gym => "Gym",
            Self::RothIra => "Roth IRA",
            Self::Fun => "Fun",
            Self::Social => "Social",
            Self::Utilities => "Utilities",
            Self::Transportation => "Transportation",
            Self::RentersInsurance => "Renter's Insurance",
            Self::PersonalCare => "Personal Care",
            Self::Savings => "Savings",
        }
    }

    pub(crate) fn emoji(&self) -> &'static str {
        match self {
            Self::Rent => "🏠",
            Self::Food => "🍕",
            Self::Gym => "💪",
            Self::RothIra => "📈",
            Self::Fun => "🎮",
            Self::Social => "🎉",
            Self::Utilities => "💡",
            Self::Transportation => "🚇",
            Self::RentersInsurance => "🛡️",
            Self::PersonalCare => "✨",
            Self::Savings => "🐖",
        }
    }

    pub(crate) fn kind(&self) -> CategoryKind {
        match self {
            Self::Rent
            | Self::Food
            | Self::Utilities
            | Self::Transportation
            | Self::RentersInsurance
            | Self::PersonalCare => CategoryKind::Needs,
            Self::Gym | Self::Fun | Self::Social => CategoryKind::Wants,
            Self::RothIra | Self::Savings => CategoryKind::Savings,
        }
    }

    /// Fixed costs don't vary month to month.
    pub(crate) fn is_fixed(&self) -> bool {
        matches!(self, Self::Rent)
    }

    pub(crate) fn all() -> &'static [Category] {
        &[
            Self::Rent,
            Self::Food,
            Self::Gym,
            Self::RothIra,
            Self::Fun,
            Self::Social,
            Self::Utilities,
            Self::Transportation,
            Self::RentersInsurance,
            Self::PersonalCare,
            Self::Savings,
        ]
    }

    pub(crate) fn of_kind(kind: CategoryKind) -> impl Iterator<Item = Category> {
        Self::all().iter().copied().filter(move |c| c.kind() == kind)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
