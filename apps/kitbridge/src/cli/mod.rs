//! # KitBridge CLI Module
//!
//! ## Available Commands
//!
//! - `kits` - List the built-in Kit catalog
//! - `connect` - Register the catalog and show every bridge it produces
//! - `activate` - Attach Kits to a project and fire project creation
//! - `run` - Replay a TOML scenario

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use kitbridge_core::KitbridgeError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// KitBridge - typed Kit orchestration
///
/// Kits declare typed ports; compatible Kits are wired together
/// automatically and everything they produce is captured and searchable.
#[derive(Parser, Debug)]
#[command(name = "kitbridge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Export formats for `run --export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Pretty-printed JSON array of records
    Json,
    /// Checksummed binary stream
    Canonical,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the built-in Kits with their ports and triggers
    Kits,

    /// Register every catalog Kit and auto-connect them
    Connect,

    /// Attach Kits to a project in a fresh engine
    Activate {
        /// Project path
        #[arg(short, long)]
        project: String,

        /// Kit ids to attach (comma-separated, default: whole catalog)
        #[arg(short, long)]
        kits: Option<String>,

        /// Search the captured content afterwards
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Replay a scenario file
    Run {
        /// Path to the scenario (TOML)
        #[arg(short = 'S', long)]
        scenario: PathBuf,

        /// Search the captured content afterwards (repeatable)
        #[arg(short, long)]
        search: Vec<String>,

        /// Write the captured content to this file
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Export format
        #[arg(short = 't', long, value_enum, default_value = "json")]
        format: ExportFormat,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), KitbridgeError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Kits) | None => cmd_kits(json_mode),
        Some(Commands::Connect) => cmd_connect(json_mode),
        Some(Commands::Activate {
            project,
            kits,
            search,
        }) => cmd_activate(json_mode, &project, kits.as_deref(), search.as_deref()),
        Some(Commands::Run {
            scenario,
            search,
            export,
            format,
        }) => cmd_run(json_mode, &scenario, &search, export.as_deref(), format).await,
    }
}
