//! Current-month spend aggregation

use chrono::{Datelike, NaiveDate};

use crate::models::{MonthlySpend, Transaction};

/// Sum expenses in `today`'s calendar month per category
///
/// Only negative amounts count; each contributes its absolute value.
/// Missing or blank categories land in `Uncategorized`. The result depends
/// only on the set of transactions, never on their order.
pub fn monthly_spend(transactions: &[Transaction], today: NaiveDate) -> MonthlySpend {
    let mut spend = MonthlySpend::new();

    for tx in transactions
        .iter()
        .filter(|t| t.date.year() == today.year() && t.date.month() == today.month())
        .filter(|t| t.is_expense())
    {
        spend.add(tx.spend_category(), tx.amount.abs());
    }

    spend
}
