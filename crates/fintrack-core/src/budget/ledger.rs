//! Budget ledger - the single owner of `BudgetState`
//!
//! All mutations go through here. Amounts are never rejected: negative,
//! NaN, infinite and unparseable inputs all become 0.

use crate::error::{Error, Result};
use crate::models::{BudgetState, CategoryBudget, Suggestion};

use super::merge::merge_suggestions;

/// Clamp an amount to a valid limit (finite and non-negative)
pub fn coerce_amount(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}

/// Parse user-typed amount text, falling back to 0
///
/// Reads the longest leading decimal number (`"120.5abc"` is 120.5,
/// `"1e3"` is 1000) and ignores the rest. Input with no leading number
/// yields 0.
pub fn parse_amount(input: &str) -> f64 {
    let s = input.trim_start();
    let bytes = s.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        let frac_digits = frac_end - frac_start;
        if digits + frac_digits > 0 {
            end = frac_end;
            digits += frac_digits;
        }
    }

    if digits == 0 {
        return 0.0;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    coerce_amount(s[..end].parse::<f64>().unwrap_or(0.0))
}

fn validate_category(category: &str) -> Result<&str> {
    let category = category.trim();
    if category.is_empty() {
        return Err(Error::InvalidData("Category name cannot be empty".into()));
    }
    Ok(category)
}

/// Mutable budget state plus edit tracking
#[derive(Debug, Clone, Default)]
pub struct BudgetLedger {
    state: BudgetState,
    /// Bumped on every user edit to `budgets`
    revision: u64,
    /// Bumped when the user sets income
    income_revision: u64,
}

impl BudgetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &BudgetState {
        &self.state
    }

    /// Limit for a category (0 if absent)
    pub fn budget(&self, category: &str) -> f64 {
        self.state.budgets.get(category).copied().unwrap_or(0.0)
    }

    pub fn income(&self) -> f64 {
        self.state.estimated_income
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.state.budgets.keys().map(String::as_str)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn income_revision(&self) -> u64 {
        self.income_revision
    }

    /// Replace the limit for `category`
    ///
    /// Returns the value actually stored after coercion.
    pub fn set_budget(&mut self, category: &str, amount: f64) -> Result<f64> {
        let category = validate_category(category)?;
        let limit = coerce_amount(amount);
        self.state.budgets.insert(category.to_string(), limit);
        self.revision += 1;
        Ok(limit)
    }

    /// Replace the limit from form text (`parse_amount` rules)
    pub fn set_budget_input(&mut self, category: &str, input: &str) -> Result<f64> {
        self.set_budget(category, parse_amount(input))
    }

    /// Replace the estimated income (user edit)
    pub fn set_income(&mut self, amount: f64) -> f64 {
        self.state.estimated_income = coerce_amount(amount);
        self.income_revision += 1;
        self.state.estimated_income
    }

    pub fn set_income_input(&mut self, input: &str) -> f64 {
        self.set_income(parse_amount(input))
    }

    /// Apply a backend income estimate (not counted as a user edit)
    pub fn apply_income_estimate(&mut self, amount: f64) {
        self.state.estimated_income = coerce_amount(amount);
    }

    /// Replace all budgets with a persisted snapshot
    ///
    /// Income is left as is. Blank categories are dropped; later duplicates
    /// win.
    pub fn load(&mut self, snapshot: &[CategoryBudget]) {
        self.state.budgets = snapshot
            .iter()
            .filter_map(|b| {
                validate_category(&b.category)
                    .ok()
                    .map(|c| (c.to_string(), coerce_amount(b.monthly_limit)))
            })
            .collect();
    }

    /// Fill unset categories from suggestions
    ///
    /// Not a user edit: `revision` is unchanged, so a saved snapshot still
    /// applies over pre-filled values.
    pub fn merge(&mut self, suggestions: &[Suggestion]) -> usize {
        merge_suggestions(&mut self.state.budgets, suggestions)
    }

    /// Every `(category, limit)` pair, in category order
    pub fn snapshot(&self) -> Vec<CategoryBudget> {
        self.state
            .budgets
            .iter()
            .map(|(category, limit)| CategoryBudget::new(category.clone(), *limit))
            .collect()
    }
}
