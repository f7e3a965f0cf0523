//! Budget planner
//!
//! `BudgetPlanner` owns the budget ledger and the loaded transactions,
//! and runs the backend operations (fetch saved budgets, fetch
//! transactions, generate suggestions, save) with one in-flight guard per
//! kind. Every backend failure is also published as a `Notice`.
//!
//! State sits behind a `std::sync::Mutex` that is only held for
//! synchronous sections, never across an `.await`. Derived values (spend,
//! reconciliation, rows) are recomputed from the state on demand.
//!
//! # Usage
//!
//! ```rust,ignore
//! let planner = BudgetPlanner::new(BackendClient::from_config(&config.backend)?);
//! let mut events = planner.subscribe();
//!
//! planner.refresh_budgets().await?;
//! planner.refresh_transactions().await?;
//! planner.set_income(4200.0);
//!
//! for row in planner.rows() {
//!     println!("{}: {} / {}", row.category, row.spent, row.budget);
//! }
//! ```

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use futures::future::join_all;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::backend::{BackendClient, BudgetBackend};
use crate::budget::{
    monthly_spend, BudgetLedger, CelebrationTrigger, StatusClassifier, ZeroBasedReconciler,
};
use crate::config::PlannerSettings;
use crate::error::{Error, Result};
use crate::guard::{InFlight, Operation};
use crate::models::{
    BudgetRow, BudgetState, CategoryBudget, MonthlySpend, ReconciliationResult, SaveOutcome,
    SaveReport, Suggestion, Transaction,
};

const EVENT_CAPACITY: usize = 32;

/// Notifications published to subscribers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlannerEvent {
    /// The plan just became balanced
    Celebrate {
        income: f64,
        total_budgeted: f64,
    },
    /// A backend operation failed; local state was left unchanged
    Notice {
        operation: Operation,
        message: String,
    },
}

/// Result of a saved-budgets fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The snapshot replaced the local budgets
    Applied { categories: usize },
    /// A newer fetch or a local edit superseded this response
    Discarded,
}

/// Result of a suggestion request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOutcome {
    /// Suggestions returned by the backend
    pub suggestions: usize,
    /// Categories that were unset and got pre-filled
    pub filled: usize,
    /// Whether the backend's income estimate replaced the local one
    pub income_applied: bool,
}

/// Taken when a fetch is issued
#[derive(Debug, Clone, Copy)]
struct FetchTicket {
    sequence: u64,
    revision: u64,
}

struct PlannerState {
    ledger: BudgetLedger,
    transactions: Vec<Transaction>,
    /// Latest suggestion set, in backend order
    suggestions: Vec<Suggestion>,
    trigger: CelebrationTrigger,
    fetch_sequence: u64,
    /// Fixed "today" for spend aggregation; the local date if unset
    today: Option<NaiveDate>,
}

/// Zero-based budget planner
pub struct BudgetPlanner<B = BackendClient> {
    backend: B,
    state: Mutex<PlannerState>,
    in_flight: InFlight,
    events: broadcast::Sender<PlannerEvent>,
    classifier: StatusClassifier,
    reconciler: ZeroBasedReconciler,
}

impl<B: BudgetBackend> BudgetPlanner<B> {
    /// Create a planner with default thresholds
    pub fn new(backend: B) -> Self {
        Self::with_settings(backend, &PlannerSettings::default())
    }

    pub fn with_settings(backend: B, settings: &PlannerSettings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            backend,
            state: Mutex::new(PlannerState {
                ledger: BudgetLedger::new(),
                transactions: Vec::new(),
                suggestions: Vec::new(),
                trigger: CelebrationTrigger::new(),
                fetch_sequence: 0,
                today: None,
            }),
            in_flight: InFlight::new(),
            events,
            classifier: StatusClassifier::new(settings.warning_ratio),
            reconciler: ZeroBasedReconciler::new(settings.balance_tolerance),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Receive `Celebrate` and `Notice` events from now on
    pub fn subscribe(&self) -> broadcast::Receiver<PlannerEvent> {
        self.events.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, PlannerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: PlannerEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Re-reconcile after a ledger change and fire the trigger on an edge
    fn after_change(&self, state: &mut PlannerState) {
        let result = self.reconciler.reconcile(state.ledger.state());
        if state.trigger.observe(result.balanced) {
            info!(
                income = state.ledger.income(),
                total = result.total_budgeted,
                "Budget balanced"
            );
            self.publish(PlannerEvent::Celebrate {
                income: state.ledger.income(),
                total_budgeted: result.total_budgeted,
            });
        }
    }

    fn report_failure(&self, operation: Operation, error: &Error) {
        warn!(operation = %operation, error = %error, "Backend operation failed");
        self.publish(PlannerEvent::Notice {
            operation,
            message: error.to_string(),
        });
    }

    // ------------------------------------------------------------------
    // Synchronous edits
    // ------------------------------------------------------------------

    /// Set the limit for a category; returns the stored (coerced) value
    pub fn set_budget(&self, category: &str, amount: f64) -> Result<f64> {
        let mut state = self.lock();
        let limit = state.ledger.set_budget(category, amount)?;
        self.after_change(&mut state);
        Ok(limit)
    }

    /// Set the limit from form text, parsed leniently
    pub fn set_budget_input(&self, category: &str, input: &str) -> Result<f64> {
        let mut state = self.lock();
        let limit = state.ledger.set_budget_input(category, input)?;
        self.after_change(&mut state);
        Ok(limit)
    }

    pub fn set_income(&self, amount: f64) -> f64 {
        let mut state = self.lock();
        let income = state.ledger.set_income(amount);
        self.after_change(&mut state);
        income
    }

    pub fn set_income_input(&self, input: &str) -> f64 {
        let mut state = self.lock();
        let income = state.ledger.set_income_input(input);
        self.after_change(&mut state);
        income
    }

    /// Replace the transactions used for spend aggregation
    pub fn set_transactions(&self, transactions: Vec<Transaction>) {
        self.lock().transactions = transactions;
    }

    /// Pin the date that defines the current month
    pub fn set_today(&self, today: NaiveDate) {
        self.lock().today = Some(today);
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    pub fn state(&self) -> BudgetState {
        self.lock().ledger.state().clone()
    }

    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.lock().suggestions.clone()
    }

    pub fn monthly_spend(&self) -> MonthlySpend {
        let state = self.lock();
        monthly_spend(&state.transactions, today_of(&state))
    }

    pub fn reconciliation(&self) -> ReconciliationResult {
        self.reconciler.reconcile(self.lock().ledger.state())
    }

    /// One row per category: suggested categories first (in backend
    /// order), then remaining budget categories alphabetically
    pub fn rows(&self) -> Vec<BudgetRow> {
        let state = self.lock();
        let spend = monthly_spend(&state.transactions, today_of(&state));
        let mut seen = HashSet::new();
        let mut rows = Vec::new();

        for suggestion in &state.suggestions {
            let category = suggestion.category.trim();
            if category.is_empty() || !seen.insert(category.to_string()) {
                continue;
            }
            let budget = state.ledger.budget(category);
            let spent = spend.get(category);
            rows.push(BudgetRow {
                category: category.to_string(),
                historical_avg: Some(suggestion.historical_avg),
                suggested_limit: Some(suggestion.suggested_limit),
                reasoning: Some(suggestion.reasoning.clone()).filter(|r| !r.is_empty()),
                budget,
                spent,
                status: self.classifier.classify(budget, spent),
            });
        }

        for category in state.ledger.categories() {
            if seen.contains(category) {
                continue;
            }
            let budget = state.ledger.budget(category);
            let spent = spend.get(category);
            rows.push(BudgetRow {
                category: category.to_string(),
                historical_avg: None,
                suggested_limit: None,
                reasoning: None,
                budget,
                spent,
                status: self.classifier.classify(budget, spent),
            });
        }

        rows
    }

    pub fn is_busy(&self, operation: Operation) -> bool {
        self.in_flight.is_pending(operation)
    }

    // ------------------------------------------------------------------
    // Backend operations
    // ------------------------------------------------------------------

    /// Replace local budgets with the saved snapshot
    ///
    /// The response is discarded if a newer fetch was issued or the user
    /// edited a budget while it was pending. Suggestions already received
    /// are merged again on top, so saved values win and unset categories
    /// stay pre-filled.
    pub async fn refresh_budgets(&self) -> Result<LoadOutcome> {
        let _guard = self.in_flight.try_acquire(Operation::FetchBudgets)?;

        let ticket = {
            let mut state = self.lock();
            state.fetch_sequence += 1;
            FetchTicket {
                sequence: state.fetch_sequence,
                revision: state.ledger.revision(),
            }
        };

        let snapshot = match self.backend.fetch_budgets().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.report_failure(Operation::FetchBudgets, &e);
                return Err(e);
            }
        };

        let mut state = self.lock();
        if state.fetch_sequence != ticket.sequence || state.ledger.revision() != ticket.revision {
            debug!(
                sequence = ticket.sequence,
                revision = ticket.revision,
                current_revision = state.ledger.revision(),
                "Discarding stale budget snapshot"
            );
            return Ok(LoadOutcome::Discarded);
        }

        let PlannerState {
            ledger,
            suggestions,
            ..
        } = &mut *state;
        ledger.load(&snapshot);
        let filled = ledger.merge(suggestions);
        self.after_change(&mut state);
        debug!(categories = snapshot.len(), filled, "Applied saved budgets");
        Ok(LoadOutcome::Applied {
            categories: snapshot.len(),
        })
    }

    /// Reload transactions from the backend; returns how many were loaded
    pub async fn refresh_transactions(&self) -> Result<usize> {
        let _guard = self.in_flight.try_acquire(Operation::FetchTransactions)?;

        let transactions = match self.backend.fetch_transactions().await {
            Ok(transactions) => transactions,
            Err(e) => {
                self.report_failure(Operation::FetchTransactions, &e);
                return Err(e);
            }
        };
        let count = transactions.len();
        self.set_transactions(transactions);
        Ok(count)
    }

    /// Request suggestions and pre-fill unset categories
    ///
    /// User-set limits are never overwritten. The backend's income estimate
    /// is applied unless income was edited while the request was pending.
    pub async fn generate(&self) -> Result<GenerateOutcome> {
        let _guard = self.in_flight.try_acquire(Operation::Generate)?;
        let income_revision = self.lock().ledger.income_revision();

        let set = match self.backend.generate_suggestions().await {
            Ok(set) => set,
            Err(e) => {
                self.report_failure(Operation::Generate, &e);
                return Err(e);
            }
        };

        let mut state = self.lock();
        let filled = state.ledger.merge(&set.suggestions);

        let income_applied = match set.estimated_monthly_income {
            Some(income) if state.ledger.income_revision() == income_revision => {
                state.ledger.apply_income_estimate(income);
                true
            }
            Some(_) => {
                debug!("Keeping income edited during generation");
                false
            }
            None => false,
        };

        let outcome = GenerateOutcome {
            suggestions: set.suggestions.len(),
            filled,
            income_applied,
        };
        state.suggestions = set.suggestions;
        self.after_change(&mut state);

        info!(
            suggestions = outcome.suggestions,
            filled = outcome.filled,
            income_applied = outcome.income_applied,
            "Merged budget suggestions"
        );
        Ok(outcome)
    }

    /// Persist every category, one upsert each, in parallel
    ///
    /// Only a busy guard fails the call; per-category failures are in the
    /// report.
    pub async fn save(&self) -> Result<SaveReport> {
        let _guard = self.in_flight.try_acquire(Operation::Save)?;
        let snapshot = self.lock().ledger.snapshot();
        Ok(self.persist(snapshot).await)
    }

    /// Re-issue only the categories that failed in `report`
    ///
    /// Current local values are sent, so edits made since the failed save
    /// are included.
    pub async fn retry_failed(&self, report: &SaveReport) -> Result<SaveReport> {
        let _guard = self.in_flight.try_acquire(Operation::Save)?;
        let budgets: Vec<CategoryBudget> = {
            let state = self.lock();
            report
                .failed()
                .map(|o| {
                    let limit = state
                        .ledger
                        .state()
                        .budgets
                        .get(&o.category)
                        .copied()
                        .unwrap_or(o.monthly_limit);
                    CategoryBudget::new(o.category.clone(), limit)
                })
                .collect()
        };
        Ok(self.persist(budgets).await)
    }

    async fn persist(&self, budgets: Vec<CategoryBudget>) -> SaveReport {
        let outcomes = join_all(budgets.iter().map(|b| self.upsert_one(b))).await;
        let report = SaveReport { outcomes };

        if report.is_success() {
            info!(saved = report.saved_count(), "Budgets saved");
        } else {
            let failed = report.failed_categories();
            self.publish(PlannerEvent::Notice {
                operation: Operation::Save,
                message: format!("Failed to save: {}", failed.join(", ")),
            });
        }

        report
    }

    async fn upsert_one(&self, budget: &CategoryBudget) -> SaveOutcome {
        match self.backend.upsert_budget(budget).await {
            Ok(()) => SaveOutcome {
                category: budget.category.clone(),
                monthly_limit: budget.monthly_limit,
                ok: true,
                error: None,
            },
            Err(e) => {
                warn!(category = %budget.category, error = %e, "Failed to save budget");
                SaveOutcome {
                    category: budget.category.clone(),
                    monthly_limit: budget.monthly_limit,
                    ok: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

fn today_of(state: &PlannerState) -> NaiveDate {
    state
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive())
}
