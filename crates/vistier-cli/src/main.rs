//! Vistier CLI - anonymizing bank statement ingestion
//!
//! Usage:
//!   vistier import --file extras.csv --user maria   Ingest a CSV export
//!   vistier categories                              List category tokens
//!   vistier layouts                                 List supported banks

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

    match cli.command {
        Commands::Import {
            file,
            user,
            label,
            out,
        } => commands::cmd_import(&file, &user, label.as_deref(), out.as_deref()).await,
        Commands::Categories => commands::cmd_categories(),
        Commands::Layouts => commands::cmd_layouts(),
    }
}
