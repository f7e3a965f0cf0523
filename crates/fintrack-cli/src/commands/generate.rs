//! Generate command: merge backend suggestions into the plan

use anyhow::{Context, Result};
use fintrack_core::BudgetPlanner;
use serde_json::json;

use super::{drain_events, ensure_saved, load_plan, plan_json, print_plan, print_save_report};

pub async fn cmd_generate(
    planner: &BudgetPlanner,
    income: Option<&str>,
    save: bool,
    json: bool,
) -> Result<()> {
    let mut events = planner.subscribe();

    load_plan(planner).await?;
    let outcome = planner
        .generate()
        .await
        .context("Failed to generate suggestions")?;

    // An explicit income wins over the backend's estimate
    if let Some(income) = income {
        planner.set_income_input(income);
    }

    let report = if save {
        Some(planner.save().await?)
    } else {
        None
    };

    if json {
        let doc = json!({
            "suggestions": outcome.suggestions,
            "filled": outcome.filled,
            "income_applied": outcome.income_applied,
            "plan": plan_json(planner),
            "save": report,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!();
        println!(
            "✨ {} suggestions, {} categories pre-filled",
            outcome.suggestions, outcome.filled
        );
        print_plan(planner);
        if let Some(report) = &report {
            print_save_report(report);
        } else {
            println!("   (not saved; rerun with --save to persist)");
        }
    }
    drain_events(&mut events, json);

    match report {
        Some(report) => ensure_saved(&report),
        None => Ok(()),
    }
}
