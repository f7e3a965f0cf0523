//! Set command: edit one category and save

use anyhow::Result;
use fintrack_core::BudgetPlanner;
use serde_json::json;

use super::{drain_events, ensure_saved, load_plan, print_save_report};

pub async fn cmd_set(
    planner: &BudgetPlanner,
    category: &str,
    amount: &str,
    income: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut events = planner.subscribe();

    load_plan(planner).await?;
    let limit = planner.set_budget_input(category, amount)?;
    if let Some(income) = income {
        planner.set_income_input(income);
    }

    let report = planner.save().await?;
    let summary = planner.reconciliation();

    if json {
        let doc = json!({
            "category": category.trim(),
            "monthly_limit": limit,
            "summary": summary,
            "save": report,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!();
        println!("✏️  {} → ${:.2}", category.trim(), limit);
        print_save_report(&report);
        println!();
        println!("   Left to budget: ${:.2}", summary.left_to_budget);
    }
    drain_events(&mut events, json);

    ensure_saved(&report)
}
