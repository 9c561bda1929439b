#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line host for the parking ticket explorer.
//!
//! ```text
//! ticket_explorer view [--types T]... [--from YYYY-MM] [--to YYYY-MM] [--areas ID,...]
//! ticket_explorer explore [--json]
//! ticket_explorer replay <events.jsonl>
//! ```
//!
//! The dataset location comes from `--config`, else the file named by
//! `TICKET_EXPLORER_CONFIG`, else `ticket_explorer.toml`, else built-in
//! defaults.

mod explore;
mod replay;
mod terminal;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use ticket_explorer_dataset::Dataset;
use ticket_explorer_dataset::config::DatasetConfig;
use ticket_explorer_reconciler::ReconcilerContext;
use ticket_explorer_reconciler_models::AreaSelection;
use ticket_explorer_tickets_models::{DateRange, IssueMonth};

#[derive(Parser)]
#[command(
    name = "ticket_explorer",
    about = "Explore parking tickets by census tract, month, and violation type"
)]
struct Cli {
    /// Dataset config file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full view for one selection as JSON
    View {
        /// Violation types to include (repeatable; default from config)
        #[arg(long = "types")]
        types: Vec<String>,
        /// First month (YYYY-MM)
        #[arg(long)]
        from: Option<IssueMonth>,
        /// Last month (YYYY-MM)
        #[arg(long)]
        to: Option<IssueMonth>,
        /// Comma-separated tract GEOIDs
        #[arg(long, value_delimiter = ',')]
        areas: Vec<String>,
    },
    /// Interactively change the selection and watch the views update
    Explore {
        /// Emit JSON lines instead of the terminal summary
        #[arg(long)]
        json: bool,
    },
    /// Replay serialized selection events, one JSON object per line
    Replay {
        /// Events file (`-` for stdin)
        events: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<DatasetConfig, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => DatasetConfig::load(path)?,
        None => DatasetConfig::from_env()?,
    })
}

/// Range from optional `--from`/`--to` bounds, open ends falling back to the
/// dataset's first or last month.
fn requested_range(
    ctx: &ReconcilerContext,
    from: Option<IssueMonth>,
    to: Option<IssueMonth>,
) -> Option<DateRange> {
    if from.is_none() && to.is_none() {
        return None;
    }
    let full = ctx.full_range();
    let start = from.or_else(|| full.map(|r| r.start()))?;
    let end = to.or_else(|| full.map(|r| r.end()))?;
    Some(DateRange::new(start, end))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref())?;
    let dataset = Dataset::load(&config)?;
    let ctx = Arc::new(ReconcilerContext::new(dataset));

    match cli.command {
        Commands::View {
            types,
            from,
            to,
            areas,
        } => {
            let mut state = ctx.initial_selection(&config.initial_violation_type);
            if !types.is_empty() {
                state.violation_types = types.into_iter().collect();
            }
            let state = state
                .with_date_range(requested_range(&ctx, from, to))
                .with_area_selection(AreaSelection::from_ids(areas));

            let view = ticket_explorer_reconciler::view(&ctx, &state);
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Commands::Explore { json } => {
            explore::run(ctx, &config.initial_violation_type, json)?;
        }
        Commands::Replay { events } => {
            replay::run(&ctx, &config.initial_violation_type, &events)?;
        }
    }

    Ok(())
}
