//! Per-category spend status

use crate::models::{CategoryStatus, SpendStatus};

/// Default share of the limit above which a category is flagged
pub const DEFAULT_WARNING_RATIO: f64 = 0.75;

/// Classifies spend against a limit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusClassifier {
    pub warning_ratio: f64,
}

impl Default for StatusClassifier {
    fn default() -> Self {
        Self {
            warning_ratio: DEFAULT_WARNING_RATIO,
        }
    }
}

impl StatusClassifier {
    pub fn new(warning_ratio: f64) -> Self {
        Self { warning_ratio }
    }

    /// Status and capped progress percentage for one category
    ///
    /// A zero limit is `Unset` with 0%. Otherwise the percentage is capped
    /// at 100 even when spend exceeds the limit; the overage shows up only
    /// as the `Over` status.
    pub fn classify(&self, limit: f64, spent: f64) -> CategoryStatus {
        if !(limit.is_finite() && limit > 0.0) {
            return CategoryStatus {
                status: SpendStatus::Unset,
                percentage: 0.0,
            };
        }

        let percentage = (spent / limit * 100.0).min(100.0);
        let status = if spent > limit {
            SpendStatus::Over
        } else if spent > self.warning_ratio * limit {
            SpendStatus::Warning
        } else {
            SpendStatus::Ok
        };

        CategoryStatus { status, percentage }
    }
}

/// Classify with the default thresholds
pub fn classify(limit: f64, spent: f64) -> CategoryStatus {
    StatusClassifier::default().classify(limit, spent)
}
