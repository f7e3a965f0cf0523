//! Status command: resolved configuration and backend reachability

use anyhow::Result;
use fintrack_core::{BudgetBackend, BudgetPlanner, PlannerConfig};
use serde_json::json;

pub async fn cmd_status(config: &PlannerConfig, planner: &BudgetPlanner, json: bool) -> Result<()> {
    let info = planner.backend().backend_info().await;

    if json {
        let doc = json!({
            "config": config,
            "config_source": config.source.as_ref().map(|p| p.display().to_string()),
            "backend": {
                "host": planner.backend().host(),
                "reachable": info.is_ok(),
                "llm_type": info.as_ref().ok().map(|i| i.llm_type.clone()),
            },
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!();
    println!("📊 FinTrack Status");
    println!("   ─────────────────────────────────────────────────────────────");

    match &config.source {
        Some(path) => println!("   Config: {}", path.display()),
        None => println!("   Config: (built-in defaults)"),
    }
    println!("   Backend: {}", planner.backend().host());
    println!("   Timeout: {}s", config.backend.timeout_secs);
    println!(
        "   Warning at: {:.0}% of limit",
        config.planner.warning_ratio * 100.0
    );
    println!(
        "   Balanced within: ${:.2}",
        config.planner.balance_tolerance
    );

    println!();
    match info {
        Ok(info) => println!("   ✅ Backend reachable (LLM: {})", info.llm_type),
        Err(e) => {
            tracing::debug!(error = %e, "Backend info request failed");
            println!("   ❌ Backend unreachable: {}", e);
        }
    }
    println!();
    Ok(())
}
