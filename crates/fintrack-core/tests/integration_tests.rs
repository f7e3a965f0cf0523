//! Integration tests for fintrack-core
//!
//! These tests exercise the full load → generate → edit → save workflow
//! against the in-memory backend.

use chrono::NaiveDate;
use fintrack_core::{
    BackendClient, BudgetPlanner, LoadOutcome, MockBackend, Operation, PlannerEvent,
    PlannerSettings, SpendStatus, Suggestion, Transaction,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// March 2026 transactions: two Food expenses, one Transport, one
/// uncategorized, a paycheck, and a February expense that must not count
fn march_transactions() -> Vec<Transaction> {
    vec![
        Transaction::new(date(2026, 3, 2), -120.0, Some("Food")),
        Transaction::new(date(2026, 3, 9), -260.0, Some("Food")),
        Transaction::new(date(2026, 3, 4), -45.5, Some("Transport")),
        Transaction::new(date(2026, 3, 6), -20.0, None),
        Transaction::new(date(2026, 3, 1), 3000.0, Some("Income")),
        Transaction::new(date(2026, 2, 27), -999.0, Some("Food")),
    ]
}

fn suggestions() -> Vec<Suggestion> {
    vec![
        Suggestion::new("Rent", 1500.0, 1500.0).with_reasoning("Fixed"),
        Suggestion::new("Food", 450.0, 500.0).with_reasoning("Variable, trending up"),
        Suggestion::new("Transport", 90.0, 100.0),
    ]
}

fn planner_for(backend: &MockBackend) -> BudgetPlanner {
    let planner = BudgetPlanner::new(BackendClient::from(backend.clone()));
    planner.set_today(date(2026, 3, 18));
    planner
}

// =============================================================================
// Planner Workflow
// =============================================================================

#[tokio::test]
async fn test_full_planning_workflow() {
    let backend = MockBackend::new()
        .with_budgets([("Food", 400.0)])
        .with_suggestions(Some(3000.0), suggestions())
        .with_transactions(march_transactions());
    let planner = planner_for(&backend);
    let mut events = planner.subscribe();

    // Load saved budgets and transactions
    assert_eq!(
        planner.refresh_budgets().await.unwrap(),
        LoadOutcome::Applied { categories: 1 }
    );
    assert_eq!(planner.refresh_transactions().await.unwrap(), 6);

    let spend = planner.monthly_spend();
    assert_eq!(spend.get("Food"), 380.0);
    assert_eq!(spend.get("Transport"), 45.5);
    assert_eq!(spend.get("Uncategorized"), 20.0);
    assert_eq!(spend.get("Income"), 0.0);

    // Generate: Food keeps the saved 400, the rest are pre-filled
    let outcome = planner.generate().await.unwrap();
    assert_eq!(outcome.suggestions, 3);
    assert_eq!(outcome.filled, 2);
    assert!(outcome.income_applied);

    let state = planner.state();
    assert_eq!(state.budgets.get("Food"), Some(&400.0));
    assert_eq!(state.budgets.get("Rent"), Some(&1500.0));
    assert_eq!(state.budgets.get("Transport"), Some(&100.0));
    assert_eq!(state.estimated_income, 3000.0);

    let summary = planner.reconciliation();
    assert_eq!(summary.total_budgeted, 2000.0);
    assert_eq!(summary.left_to_budget, 1000.0);
    assert!(!summary.balanced);

    // Rows follow the suggestion order
    let rows = planner.rows();
    let names: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
    assert_eq!(names, vec!["Rent", "Food", "Transport"]);
    assert_eq!(rows[1].status.status, SpendStatus::Warning);
    assert_eq!(rows[1].status.percentage, 95.0);
    assert_eq!(rows[0].reasoning.as_deref(), Some("Fixed"));

    // Assign the remaining 1000 and the plan balances
    planner.set_budget("Savings", 1000.0).unwrap();
    assert!(planner.reconciliation().balanced);
    assert!(matches!(
        events.try_recv().unwrap(),
        PlannerEvent::Celebrate { .. }
    ));

    let report = planner.save().await.unwrap();
    assert!(report.is_success());
    assert_eq!(report.saved_count(), 4);
    assert_eq!(backend.saved().get("Savings"), Some(&1000.0));
    assert_eq!(backend.saved().get("Food"), Some(&400.0));
}

#[tokio::test]
async fn test_regenerate_keeps_user_values() {
    let backend = MockBackend::new().with_suggestions(None, suggestions());
    let planner = planner_for(&backend);

    planner.generate().await.unwrap();
    planner.set_budget("Food", 250.0).unwrap();

    let outcome = planner.generate().await.unwrap();
    assert_eq!(outcome.filled, 0);
    assert!(!outcome.income_applied);
    assert_eq!(planner.state().budgets.get("Food"), Some(&250.0));
}

#[tokio::test]
async fn test_custom_thresholds() {
    let settings = PlannerSettings {
        warning_ratio: 0.5,
        balance_tolerance: 0.01,
    };
    let backend = MockBackend::new().with_transactions(march_transactions());
    let planner = BudgetPlanner::with_settings(BackendClient::from(backend), &settings);
    planner.set_today(date(2026, 3, 18));
    planner.refresh_transactions().await.unwrap();

    planner.set_income(1000.0);
    planner.set_budget("Transport", 80.0).unwrap();
    planner.set_budget("Rest", 919.5).unwrap();

    let rows = planner.rows();
    let transport = rows.iter().find(|r| r.category == "Transport").unwrap();
    assert_eq!(transport.status.status, SpendStatus::Warning);
    assert!(!planner.reconciliation().balanced);
}

// =============================================================================
// Saving
// =============================================================================

#[tokio::test]
async fn test_save_twice_is_idempotent() {
    let backend = MockBackend::new();
    let planner = planner_for(&backend);
    planner.set_budget("Food", 300.0).unwrap();
    planner.set_budget("Rent", 1500.0).unwrap();

    planner.save().await.unwrap();
    let after_first = backend.saved();
    planner.save().await.unwrap();

    assert_eq!(backend.saved(), after_first);
    assert_eq!(backend.upserts().len(), 4);
}

#[tokio::test]
async fn test_partial_save_and_retry() {
    let backend = MockBackend::new().failing_category("Rent");
    let planner = planner_for(&backend);
    let mut events = planner.subscribe();

    planner.set_budget("Food", 300.0).unwrap();
    planner.set_budget("Rent", 1500.0).unwrap();
    planner.set_budget("Transport", 100.0).unwrap();

    let report = planner.save().await.unwrap();
    assert!(!report.is_success());
    assert_eq!(report.failed_categories(), vec!["Rent".to_string()]);
    assert_eq!(report.saved_count(), 2);
    assert!(!backend.saved().contains_key("Rent"));
    assert!(matches!(
        events.try_recv().unwrap(),
        PlannerEvent::Notice {
            operation: Operation::Save,
            ..
        }
    ));

    // Retry after the backend recovers, with an edit in between
    backend.clear_failures();
    planner.set_budget("Rent", 1450.0).unwrap();
    let upserts_before = backend.upserts().len();

    let retry = planner.retry_failed(&report).await.unwrap();
    assert!(retry.is_success());
    assert_eq!(retry.outcomes.len(), 1);
    assert_eq!(retry.outcomes[0].category, "Rent");
    assert_eq!(backend.upserts().len(), upserts_before + 1);
    assert_eq!(backend.saved().get("Rent"), Some(&1450.0));
}

#[tokio::test]
async fn test_empty_save() {
    let backend = MockBackend::new();
    let planner = planner_for(&backend);

    let report = planner.save().await.unwrap();
    assert!(report.is_success());
    assert!(report.outcomes.is_empty());
}

// =============================================================================
// Edge Cases
// =============================================================================

#[tokio::test]
async fn test_no_transactions_no_budgets() {
    let backend = MockBackend::new();
    let planner = planner_for(&backend);

    planner.refresh_budgets().await.unwrap();
    planner.refresh_transactions().await.unwrap();

    assert!(planner.monthly_spend().is_empty());
    assert!(planner.rows().is_empty());
    let summary = planner.reconciliation();
    assert_eq!(summary.total_budgeted, 0.0);
    assert!(!summary.balanced);
}

#[tokio::test]
async fn test_negative_and_garbage_inputs_coerce() {
    let backend = MockBackend::new();
    let planner = planner_for(&backend);

    assert_eq!(planner.set_budget("Food", -50.0).unwrap(), 0.0);
    assert_eq!(planner.set_budget_input("Rent", "abc").unwrap(), 0.0);
    assert_eq!(planner.set_income_input("-3000"), 0.0);
    assert!(planner.set_budget("", 10.0).is_err());

    let rows = planner.rows();
    assert!(rows.iter().all(|r| r.status.status == SpendStatus::Unset));
}
