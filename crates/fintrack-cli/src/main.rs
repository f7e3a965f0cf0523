//! FinTrack CLI - Zero-based budget planner
//!
//! Usage:
//!   fintrack plan --income 4200       Show the plan against this month's spend
//!   fintrack generate --save          Fill unset categories from suggestions
//!   fintrack set Food 450             Set one limit and save
//!   fintrack status                   Show configuration and backend status

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::resolve_config(cli.config.as_deref(), cli.backend.as_deref())?;
    let planner = commands::open_planner(&config)?;

    match cli.command {
        Commands::Plan { income } => {
            commands::cmd_plan(&planner, income.as_deref(), cli.json).await
        }
        Commands::Generate { income, save } => {
            commands::cmd_generate(&planner, income.as_deref(), save, cli.json).await
        }
        Commands::Set {
            category,
            amount,
            income,
        } => {
            commands::cmd_set(&planner, &category, &amount, income.as_deref(), cli.json).await
        }
        Commands::Status => commands::cmd_status(&config, &planner, cli.json).await,
    }
}
