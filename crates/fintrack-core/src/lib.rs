//! FinTrack Core Library
//!
//! Zero-based budget reconciliation for the FinTrack dashboard:
//! - Current-month spend aggregation from transactions
//! - Non-clobbering merge of AI-suggested limits into user budgets
//! - Per-category status classification (ok / warning / over)
//! - Zero-based reconciliation of budgets against income
//! - Edge-triggered "balanced" celebration
//! - A planner that runs fetch/generate/save against the dashboard backend
//!   with in-flight guards and stale-response detection

pub mod backend;
pub mod budget;
pub mod config;
pub mod error;
pub mod guard;
pub mod models;
pub mod planner;

/// Test utilities including mock budget backend server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use backend::{BackendClient, BudgetBackend, HttpBackend, MockBackend};
pub use budget::{
    classify, coerce_amount, merge_suggestions, monthly_spend, parse_amount, reconcile,
    BudgetLedger, CelebrationTrigger, StatusClassifier, ZeroBasedReconciler,
};
pub use config::{BackendConfig, PlannerConfig, PlannerSettings};
pub use error::{Error, Result};
pub use guard::{InFlight, InFlightGuard, Operation};
pub use models::*;
pub use planner::{BudgetPlanner, GenerateOutcome, LoadOutcome, PlannerEvent};
