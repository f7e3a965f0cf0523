//! Budget computations
//!
//! Everything in here is synchronous and free of I/O. The planner wires
//! these pieces to the backend.

pub mod aggregate;
pub mod celebrate;
pub mod ledger;
pub mod merge;
pub mod reconcile;
pub mod status;

pub use aggregate::monthly_spend;
pub use celebrate::CelebrationTrigger;
pub use ledger::{coerce_amount, parse_amount, BudgetLedger};
pub use merge::merge_suggestions;
pub use reconcile::{reconcile, ZeroBasedReconciler, DEFAULT_BALANCE_TOLERANCE};
pub use status::{classify, StatusClassifier, DEFAULT_WARNING_RATIO};
