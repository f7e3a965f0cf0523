//! Folding AI suggestions into user budgets

use std::collections::BTreeMap;

use crate::models::Suggestion;

use super::ledger::coerce_amount;

/// Whether a budget entry counts as unset for merging
///
/// Zero is treated as unset, same as an absent entry: the budget form
/// cannot tell an explicit 0 apart from an empty field.
fn is_unset(value: Option<&f64>) -> bool {
    match value {
        None => true,
        Some(v) => !v.is_finite() || *v == 0.0,
    }
}

/// Pre-fill unset categories with suggested limits
///
/// Values the user already set are never touched and no category is ever
/// removed, so applying the same suggestions again changes nothing.
/// Returns the number of categories that were filled.
pub fn merge_suggestions(budgets: &mut BTreeMap<String, f64>, suggestions: &[Suggestion]) -> usize {
    let mut filled = 0;

    for suggestion in suggestions {
        let category = suggestion.category.trim();
        if category.is_empty() {
            continue;
        }

        if is_unset(budgets.get(category)) {
            let limit = coerce_amount(suggestion.suggested_limit);
            let previous = budgets.insert(category.to_string(), limit);
            if previous != Some(limit) {
                filled += 1;
            }
        }
    }

    filled
}
