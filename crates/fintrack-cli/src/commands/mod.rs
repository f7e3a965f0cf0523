//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `plan` - Budget table and zero-based summary
//! - `generate` - Suggestion merge (and optional save)
//! - `set` - Single-category edit and save
//! - `status` - Configuration and backend status
//!
//! Shared helpers (config resolution, planner setup, event and save-report
//! printing) live here.

pub mod generate;
pub mod plan;
pub mod set;
pub mod status;

// Re-export command functions for main.rs
pub use generate::*;
pub use plan::*;
pub use set::*;
pub use status::*;

use std::path::Path;

use anyhow::{Context, Result};
use fintrack_core::{BackendClient, BudgetPlanner, PlannerConfig, PlannerEvent, SaveReport};
use tokio::sync::broadcast;

/// Resolve config layers, then apply the `--backend` flag
pub fn resolve_config(config_path: Option<&Path>, backend: Option<&str>) -> Result<PlannerConfig> {
    let config = PlannerConfig::load(config_path).context("Failed to load configuration")?;
    match backend {
        Some(url) => config
            .with_base_url(url.trim_end_matches('/'))
            .context("Invalid --backend URL"),
        None => Ok(config),
    }
}

/// Create a planner talking to the configured backend
pub fn open_planner(config: &PlannerConfig) -> Result<BudgetPlanner> {
    let client =
        BackendClient::from_config(&config.backend).context("Failed to create backend client")?;
    Ok(BudgetPlanner::with_settings(client, &config.planner))
}

/// Load saved budgets and transactions
pub async fn load_plan(planner: &BudgetPlanner) -> Result<()> {
    planner
        .refresh_budgets()
        .await
        .context("Failed to load saved budgets")?;
    planner
        .refresh_transactions()
        .await
        .context("Failed to load transactions")?;
    Ok(())
}

/// Print any celebration or notice published so far
pub fn drain_events(events: &mut broadcast::Receiver<PlannerEvent>, json: bool) {
    while let Ok(event) = events.try_recv() {
        if json {
            continue;
        }
        match event {
            PlannerEvent::Celebrate { income, .. } => {
                println!("🎉 Every dollar has a job! ${:.2} fully budgeted.", income);
            }
            PlannerEvent::Notice { operation, message } => {
                println!("⚠️  {}: {}", operation, message);
            }
        }
    }
}

pub fn print_save_report(report: &SaveReport) {
    println!();
    println!(
        "💾 Saved {} of {} categories",
        report.saved_count(),
        report.outcomes.len()
    );
    for outcome in &report.outcomes {
        if outcome.ok {
            println!(
                "   ✓ {:24} {:>10.2}",
                truncate(&outcome.category, 24),
                outcome.monthly_limit
            );
        } else {
            println!(
                "   ✗ {:24} {:>10.2}  ({})",
                truncate(&outcome.category, 24),
                outcome.monthly_limit,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}

/// Fail the command if any category did not save
pub fn ensure_saved(report: &SaveReport) -> Result<()> {
    if report.is_success() {
        Ok(())
    } else {
        anyhow::bail!(
            "Failed to save {} (rerun to retry)",
            report.failed_categories().join(", ")
        )
    }
}

/// Truncate a string to max characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
