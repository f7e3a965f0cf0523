//! Plan command: budget table and zero-based summary

use anyhow::Result;
use fintrack_core::{BalanceState, BudgetPlanner, SpendStatus};
use serde_json::{json, Value};

use super::{drain_events, load_plan, truncate};

pub async fn cmd_plan(planner: &BudgetPlanner, income: Option<&str>, json: bool) -> Result<()> {
    let mut events = planner.subscribe();

    load_plan(planner).await?;
    if let Some(income) = income {
        planner.set_income_input(income);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&plan_json(planner))?);
    } else {
        print_plan(planner);
    }
    drain_events(&mut events, json);
    Ok(())
}

/// The plan as a JSON document
pub fn plan_json(planner: &BudgetPlanner) -> Value {
    let state = planner.state();
    let summary = planner.reconciliation();
    json!({
        "estimated_income": state.estimated_income,
        "summary": summary,
        "balance": summary.state(),
        "rows": planner.rows(),
    })
}

pub fn print_plan(planner: &BudgetPlanner) {
    let rows = planner.rows();
    let summary = planner.reconciliation();
    let income = planner.state().estimated_income;

    println!();
    println!("📋 Budget Plan");
    println!("   ─────────────────────────────────────────────────────────────────────────");

    if rows.is_empty() {
        println!("   No budgets yet. Run `fintrack generate` or `fintrack set`.");
    } else {
        println!(
            "   {:24} │ {:>10} │ {:>10} │ {:>10} │ {:>5} │ Status",
            "Category", "Suggested", "Budget", "Spent", "Used"
        );
        println!("   ─────────────────────────┼────────────┼────────────┼────────────┼───────┼────────");
        for row in &rows {
            let suggested = row
                .suggested_limit
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "   {:24} │ {:>10} │ {:>10.2} │ {:>10.2} │ {:>4.0}% │ {}",
                truncate(&row.category, 24),
                suggested,
                row.budget,
                row.spent,
                row.status.percentage,
                status_label(row.status.status)
            );
        }
    }

    println!();
    println!("   Income:         ${:>10.2}", income);
    println!("   Budgeted:       ${:>10.2}", summary.total_budgeted);
    println!("   Left to budget: ${:>10.2}", summary.left_to_budget);
    println!();
    match summary.state() {
        BalanceState::Balanced => println!("   ✅ Balanced"),
        BalanceState::UnderBudget => println!(
            "   ⬆️  ${:.2} still needs a job",
            summary.left_to_budget
        ),
        BalanceState::OverBudget => println!(
            "   ❌ Over budget by ${:.2}",
            -summary.left_to_budget
        ),
        BalanceState::Unfunded => println!("   ℹ️  Set an income with --income to start planning"),
    }
    println!();
}

fn status_label(status: SpendStatus) -> &'static str {
    match status {
        SpendStatus::Ok => "ok",
        SpendStatus::Warning => "⚠️ warning",
        SpendStatus::Over => "🔴 over",
        SpendStatus::Unset => "-",
    }
}
