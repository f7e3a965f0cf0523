//! Zero-based reconciliation of budgets against income

use crate::models::{BudgetState, ReconciliationResult};

/// Default tolerance for the balanced check, in currency units
pub const DEFAULT_BALANCE_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZeroBasedReconciler {
    /// `|left_to_budget|` must be strictly below this to count as balanced
    pub tolerance: f64,
}

impl Default for ZeroBasedReconciler {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_BALANCE_TOLERANCE,
        }
    }
}

impl ZeroBasedReconciler {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn reconcile(&self, state: &BudgetState) -> ReconciliationResult {
        let total_budgeted: f64 = state
            .budgets
            .values()
            .map(|v| if v.is_finite() { *v } else { 0.0 })
            .sum();

        let left_to_budget = state.estimated_income - total_budgeted;
        let balanced = state.estimated_income > 0.0 && left_to_budget.abs() < self.tolerance;

        ReconciliationResult {
            total_budgeted,
            left_to_budget,
            balanced,
        }
    }
}

/// Reconcile with the default tolerance
pub fn reconcile(state: &BudgetState) -> ReconciliationResult {
    ZeroBasedReconciler::default().reconcile(state)
}
