//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Vistier - anonymizing bank statement ingestion
#[derive(Parser)]
#[command(name = "vistier")]
#[command(about = "Ingest bank CSV exports into anonymized transactions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest a bank CSV export (auto-detects the layout)
    Import {
        /// CSV file to ingest
        #[arg(short, long)]
        file: PathBuf,

        /// User identifier the upload belongs to
        #[arg(short, long)]
        user: String,

        /// Label for this source (defaults to "<layout> import")
        #[arg(short, long)]
        label: Option<String>,

        /// Write the anonymized upload as JSON to this path
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List the closed category set
    Categories,

    /// List the supported bank layouts
    Layouts,
}
