//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// FinTrack - Give every dollar a job
#[derive(Parser)]
#[command(name = "fintrack")]
#[command(about = "Zero-based budget planner for the FinTrack dashboard", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Dashboard backend URL (overrides config)
    #[arg(long, env = "FINTRACK_BACKEND_URL", global = true)]
    pub backend: Option<String>,

    /// Config file (defaults to ~/.local/share/fintrack/config/planner.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show budgets, this month's spend and what is left to budget
    Plan {
        /// Monthly income for this plan (e.g. 4200 or 4200.50)
        #[arg(long)]
        income: Option<String>,
    },

    /// Ask the backend for suggested limits and fill in unset categories
    Generate {
        /// Monthly income, replacing the backend's estimate
        #[arg(long)]
        income: Option<String>,

        /// Save the merged budgets afterwards
        #[arg(long)]
        save: bool,
    },

    /// Set one category's monthly limit and save
    Set {
        /// Category name
        category: String,

        /// Monthly limit (unparseable or negative values become 0)
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Monthly income for the balance check
        #[arg(long)]
        income: Option<String>,
    },

    /// Show configuration and backend status
    Status,
}
