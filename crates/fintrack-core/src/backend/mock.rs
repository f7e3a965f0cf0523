//! Mock backend for testing
//!
//! Keeps saved budgets in memory and returns configured suggestions and
//! transactions. Clones share state, so a test can keep a handle and
//! inspect what the planner persisted.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::{Error, Result};
use crate::models::{BackendInfo, CategoryBudget, Suggestion, SuggestionSet, Transaction};

use super::BudgetBackend;

#[derive(Default)]
struct MockState {
    saved: BTreeMap<String, f64>,
    suggestions: SuggestionSet,
    transactions: Vec<Transaction>,
    failing_categories: HashSet<String>,
    fail_fetch: bool,
    fail_generate: bool,
    fail_transactions: bool,
    upserts: Vec<CategoryBudget>,
}

/// Mock budget backend for testing
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
    /// Held fetch/generate calls wait for a permit on this gate
    gate: Option<Arc<Notify>>,
}

impl MockBackend {
    /// Create an empty mock backend
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pre-populate saved budgets
    pub fn with_budgets<'a>(self, budgets: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        {
            let mut state = self.lock();
            for (category, limit) in budgets {
                state.saved.insert(category.to_string(), limit);
            }
        }
        self
    }

    pub fn with_suggestions(self, income: Option<f64>, suggestions: Vec<Suggestion>) -> Self {
        self.lock().suggestions = SuggestionSet {
            estimated_monthly_income: income,
            suggestions,
        };
        self
    }

    pub fn with_transactions(self, transactions: Vec<Transaction>) -> Self {
        self.lock().transactions = transactions;
        self
    }

    /// Make upserts for `category` fail
    pub fn failing_category(self, category: &str) -> Self {
        self.lock().failing_categories.insert(category.to_string());
        self
    }

    pub fn failing_fetch(self) -> Self {
        self.lock().fail_fetch = true;
        self
    }

    pub fn failing_generate(self) -> Self {
        self.lock().fail_generate = true;
        self
    }

    pub fn failing_transactions(self) -> Self {
        self.lock().fail_transactions = true;
        self
    }

    /// Hold fetch and generate calls until `gate` is notified
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Let every upsert succeed from now on
    pub fn clear_failures(&self) {
        let mut state = self.lock();
        state.failing_categories.clear();
        state.fail_fetch = false;
        state.fail_generate = false;
        state.fail_transactions = false;
    }

    /// Saved budgets, in category order
    pub fn saved(&self) -> BTreeMap<String, f64> {
        self.lock().saved.clone()
    }

    /// Every upsert received, in arrival order (failed ones included)
    pub fn upserts(&self) -> Vec<CategoryBudget> {
        self.lock().upserts.clone()
    }

    async fn wait_for_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl BudgetBackend for MockBackend {
    async fn fetch_budgets(&self) -> Result<Vec<CategoryBudget>> {
        // Snapshot at request time, then wait
        let result = {
            let state = self.lock();
            if state.fail_fetch {
                Err(Error::Backend("mock fetch failure".into()))
            } else {
                Ok(state
                    .saved
                    .iter()
                    .map(|(c, v)| CategoryBudget::new(c.clone(), *v))
                    .collect())
            }
        };

        self.wait_for_gate().await;
        result
    }

    async fn upsert_budget(&self, budget: &CategoryBudget) -> Result<()> {
        let mut state = self.lock();
        state.upserts.push(budget.clone());

        if state.failing_categories.contains(&budget.category) {
            return Err(Error::Backend(format!(
                "mock upsert failure for {}",
                budget.category
            )));
        }

        state
            .saved
            .insert(budget.category.clone(), budget.monthly_limit);
        Ok(())
    }

    async fn generate_suggestions(&self) -> Result<SuggestionSet> {
        let result = {
            let state = self.lock();
            if state.fail_generate {
                Err(Error::Backend("mock generate failure".into()))
            } else {
                Ok(state.suggestions.clone())
            }
        };

        self.wait_for_gate().await;
        result
    }

    async fn fetch_transactions(&self) -> Result<Vec<Transaction>> {
        let state = self.lock();
        if state.fail_transactions {
            return Err(Error::Backend("mock transactions failure".into()));
        }
        Ok(state.transactions.clone())
    }

    async fn backend_info(&self) -> Result<BackendInfo> {
        Ok(BackendInfo {
            llm_type: "mock".to_string(),
        })
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
