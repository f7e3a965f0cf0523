//! In-flight guards for the planner's asynchronous operations
//!
//! Each operation kind has one flag. Acquiring a guard sets the flag and
//! dropping the guard clears it, so a cancelled (dropped) future releases
//! its slot the same way a completed one does.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use crate::error::{Error, Result};

/// Asynchronous operations that cross the backend boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Fetch saved budgets
    FetchBudgets,
    /// Fetch transactions for spend aggregation
    FetchTransactions,
    /// Generate suggestions
    Generate,
    /// Persist budgets
    Save,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchBudgets => "fetch_budgets",
            Self::FetchTransactions => "fetch_transactions",
            Self::Generate => "generate",
            Self::Save => "save",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One flag per operation kind
#[derive(Debug, Default)]
pub struct InFlight {
    fetch_budgets: AtomicBool,
    fetch_transactions: AtomicBool,
    generate: AtomicBool,
    save: AtomicBool,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self, op: Operation) -> &AtomicBool {
        match op {
            Operation::FetchBudgets => &self.fetch_budgets,
            Operation::FetchTransactions => &self.fetch_transactions,
            Operation::Generate => &self.generate,
            Operation::Save => &self.save,
        }
    }

    /// Claim the slot for `op`, failing with `Error::Busy` if it is taken
    pub fn try_acquire(&self, op: Operation) -> Result<InFlightGuard<'_>> {
        self.flag(op)
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::Busy(op))?;

        Ok(InFlightGuard {
            flag: self.flag(op),
        })
    }

    pub fn is_pending(&self, op: Operation) -> bool {
        self.flag(op).load(Ordering::Acquire)
    }
}

/// Releases its operation slot on drop
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
