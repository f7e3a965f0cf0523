//! Domain models for FinTrack

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Bucket for expenses that carry no category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A transaction as served by the transactions collaborator
///
/// Negative amounts are expenses. Fields beyond date/amount/category
/// (description, merchant, account) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
}

impl Transaction {
    pub fn new(date: NaiveDate, amount: f64, category: Option<&str>) -> Self {
        Self {
            date,
            amount,
            category: category.map(str::to_string),
        }
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    /// Category used for spend grouping (blank counts as missing)
    pub fn spend_category(&self) -> &str {
        match self.category.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => UNCATEGORIZED,
        }
    }
}

/// A persisted budget limit, as exchanged with the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBudget {
    pub category: String,
    pub monthly_limit: f64,
}

impl CategoryBudget {
    pub fn new(category: impl Into<String>, monthly_limit: f64) -> Self {
        Self {
            category: category.into(),
            monthly_limit,
        }
    }
}

/// An AI-suggested limit for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub category: String,
    #[serde(default)]
    pub historical_avg: f64,
    pub suggested_limit: f64,
    #[serde(default)]
    pub reasoning: String,
}

impl Suggestion {
    pub fn new(category: impl Into<String>, historical_avg: f64, suggested_limit: f64) -> Self {
        Self {
            category: category.into(),
            historical_avg,
            suggested_limit,
            reasoning: String::new(),
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }
}

/// Response of the suggestion-generation call
///
/// Older backends answer with a bare list of suggestions and no income
/// estimate; both shapes decode into this type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSuggestionResponse")]
pub struct SuggestionSet {
    pub estimated_monthly_income: Option<f64>,
    pub suggestions: Vec<Suggestion>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSuggestionResponse {
    Full {
        #[serde(default)]
        estimated_monthly_income: Option<f64>,
        suggestions: Vec<Suggestion>,
    },
    List(Vec<Suggestion>),
}

impl From<RawSuggestionResponse> for SuggestionSet {
    fn from(raw: RawSuggestionResponse) -> Self {
        match raw {
            RawSuggestionResponse::Full {
                estimated_monthly_income,
                suggestions,
            } => Self {
                estimated_monthly_income,
                suggestions,
            },
            RawSuggestionResponse::List(suggestions) => Self {
                estimated_monthly_income: None,
                suggestions,
            },
        }
    }
}

/// The planner's single mutable aggregate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetState {
    /// Category → monthly limit
    pub budgets: BTreeMap<String, f64>,
    pub estimated_income: f64,
}

/// Current-month spend per category
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MonthlySpend(BTreeMap<String, f64>);

impl MonthlySpend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spend for a category (0 if nothing was spent)
    pub fn get(&self, category: &str) -> f64 {
        self.0.get(category).copied().unwrap_or(0.0)
    }

    pub fn add(&mut self, category: &str, amount: f64) {
        *self.0.entry(category.to_string()).or_insert(0.0) += amount;
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const N: usize> From<[(&str, f64); N]> for MonthlySpend {
    fn from(entries: [(&str, f64); N]) -> Self {
        let mut spend = Self::new();
        for (category, amount) in entries {
            spend.add(category, amount);
        }
        spend
    }
}

/// Spend status of one category against its limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendStatus {
    Ok,
    Warning,
    Over,
    /// No limit set
    Unset,
}

impl SpendStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Over => "over",
            Self::Unset => "unset",
        }
    }
}

impl std::fmt::Display for SpendStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryStatus {
    pub status: SpendStatus,
    /// Progress toward the limit, capped at 100
    pub percentage: f64,
}

/// Where the plan stands against income
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceState {
    Balanced,
    /// Income left to assign
    UnderBudget,
    /// More assigned than income
    OverBudget,
    /// No income and nothing assigned
    Unfunded,
}

impl BalanceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::UnderBudget => "under_budget",
            Self::OverBudget => "over_budget",
            Self::Unfunded => "unfunded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReconciliationResult {
    pub total_budgeted: f64,
    pub left_to_budget: f64,
    pub balanced: bool,
}

impl ReconciliationResult {
    pub fn state(&self) -> BalanceState {
        if self.balanced {
            BalanceState::Balanced
        } else if self.left_to_budget < 0.0 {
            BalanceState::OverBudget
        } else if self.left_to_budget > 0.0 {
            BalanceState::UnderBudget
        } else {
            BalanceState::Unfunded
        }
    }
}

/// One line of the budget plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetRow {
    pub category: String,
    pub historical_avg: Option<f64>,
    pub suggested_limit: Option<f64>,
    pub reasoning: Option<String>,
    pub budget: f64,
    pub spent: f64,
    pub status: CategoryStatus,
}

/// Result of persisting one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveOutcome {
    pub category: String,
    pub monthly_limit: f64,
    pub ok: bool,
    pub error: Option<String>,
}

/// Per-category results of a save, in category order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SaveReport {
    pub outcomes: Vec<SaveOutcome>,
}

impl SaveReport {
    /// True only if every upsert succeeded
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.ok)
    }

    pub fn failed(&self) -> impl Iterator<Item = &SaveOutcome> {
        self.outcomes.iter().filter(|o| !o.ok)
    }

    pub fn failed_categories(&self) -> Vec<String> {
        self.failed().map(|o| o.category.clone()).collect()
    }

    pub fn saved_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.ok).count()
    }
}

/// Backend runtime info from `GET /config`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendInfo {
    pub llm_type: String,
}
