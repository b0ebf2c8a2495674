//! # Convalida CLI Module
//!
//! Every command operates on a working snapshot file (`--snapshot`, the
//! `[snapshot] path` config key, or `mallas_icoc_snapshot.json`). When the
//! file does not exist the built-in ICOC sample is used.
//!
//! ## Available Commands
//!
//! - `init` - Write the built-in sample to the working snapshot
//! - `status` - Show recognition KPIs
//! - `toggle` - Flip completion marks of origin courses
//! - `reset` - Clear every completion mark
//! - `resolve` - List satisfied, partial and pending destination courses
//! - `progress` - Per-category credit progress
//! - `plan` - Term-grouped listing of one curriculum
//! - `import` - Import a (partial) snapshot file
//! - `export` - Export the working snapshot
//! - `check` - Data-quality audit
//! - `hash` - BLAKE3 digest of the exported snapshot
//! - `server` - Start the HTTP server

mod commands;

use crate::config::Config;
use clap::{Parser, Subcommand};
use convalida_core::{ConvalidaError, PlanSide};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Convalida - curriculum equivalence viewer
///
/// Marks origin courses as completed and shows which destination courses
/// are recognized under the declared equivalence rules.
#[derive(Parser, Debug)]
#[command(name = "convalida")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the working snapshot file
    #[arg(short = 'S', long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the built-in ICOC sample to the working snapshot
    Init {
        /// Overwrite an existing snapshot
        #[arg(short, long)]
        force: bool,
    },

    /// Show recognition KPIs
    Status,

    /// Flip the completion mark of one or more origin courses
    Toggle {
        /// Origin course codes
        #[arg(required = true)]
        codes: Vec<String>,
    },

    /// Clear every completion mark
    Reset,

    /// List satisfied, partial and pending destination courses
    Resolve,

    /// Per-category credit progress of the destination curriculum
    Progress,

    /// Term-grouped listing of one curriculum
    Plan {
        /// Which curriculum: origin or destination
        side: PlanSide,
    },

    /// Import a snapshot file; absent fields keep their current value
    Import {
        /// Input file path
        file: PathBuf,
    },

    /// Export the working snapshot
    Export {
        /// Output file path
        file: PathBuf,
    },

    /// Report data-quality issues in the curricula and rules
    Check,

    /// Compute BLAKE3 digest of the exported snapshot
    Hash,

    /// Start HTTP server
    Server {
        /// Host to bind to (overrides config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli, config: Config) -> Result<(), ConvalidaError> {
    let snapshot = cli.snapshot.unwrap_or(config.snapshot.path);
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Init { force }) => cmd_init(&snapshot, force),
        Some(Commands::Status) | None => cmd_status(&snapshot, json_mode),
        Some(Commands::Toggle { codes }) => cmd_toggle(&snapshot, json_mode, &codes),
        Some(Commands::Reset) => cmd_reset(&snapshot),
        Some(Commands::Resolve) => cmd_resolve(&snapshot, json_mode),
        Some(Commands::Progress) => cmd_progress(&snapshot, json_mode),
        Some(Commands::Plan { side }) => cmd_plan(&snapshot, json_mode, side),
        Some(Commands::Import { file }) => cmd_import(&snapshot, &file),
        Some(Commands::Export { file }) => cmd_export(&snapshot, &file),
        Some(Commands::Check) => cmd_check(&snapshot, json_mode),
        Some(Commands::Hash) => cmd_hash(&snapshot, json_mode),
        Some(Commands::Server { host, port }) => {
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            cmd_server(&snapshot, &host, port).await
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
