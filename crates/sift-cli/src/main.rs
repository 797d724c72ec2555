//! Sift CLI - Braindump organizer
//!
//! Usage:
//!   sift capture "need to call the dentist tomorrow"
//!   sift classify "maybe repaint the fence"
//!   sift organize --dry-run
//!   sift stats

mod cli;
mod commands;
mod store;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;
use store::JsonStore;

fn main() -> Result<()> {
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

    let store = match &cli.data {
        Some(path) => JsonStore::new(path),
        None => JsonStore::new(JsonStore::default_path()?),
    };

    match cli.command {
        Commands::Capture { text } => commands::cmd_capture(&store, &text),
        Commands::Classify { text } => commands::cmd_classify(&text),
        Commands::Organize {
            dry_run,
            tasks,
            notes,
        } => commands::cmd_organize(&store, dry_run, &tasks, &notes),
        Commands::Stats => commands::cmd_stats(&store),
        Commands::List { collection } => commands::cmd_list(&store, &collection),
    }
}
