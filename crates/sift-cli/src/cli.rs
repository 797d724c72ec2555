//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Sift - Dump thoughts, get organized tasks and notes
#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Braindump organizer: capture thoughts, sort them into tasks and notes", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data file path (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Capture a thought into the braindump
    Capture {
        /// The text to capture
        text: String,
    },

    /// Preview how a text would be classified (nothing is stored)
    Classify {
        /// The text to classify
        text: String,
    },

    /// Classify the braindump and commit items into tasks and notes
    Organize {
        /// Show suggestions without committing anything
        #[arg(long)]
        dry_run: bool,

        /// Force an item (by id or id prefix) to be committed as a task
        #[arg(long = "task", value_name = "ID")]
        tasks: Vec<String>,

        /// Force an item (by id or id prefix) to be committed as a note
        #[arg(long = "note", value_name = "ID")]
        notes: Vec<String>,
    },

    /// Show the analytics snapshot
    Stats,

    /// List items in a collection
    List {
        /// Collection to list: braindump, tasks, notes
        #[arg(default_value = "braindump")]
        collection: String,
    },
}
