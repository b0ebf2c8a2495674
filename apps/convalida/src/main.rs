//! # Convalida - Curriculum Equivalence Viewer
//!
//! The main binary for the convalida curriculum equivalence engine.
//!
//! This application provides:
//! - CLI interface over a working snapshot file
//! - HTTP JSON API (axum-based) for a web front-end
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                apps/convalida (THE BINARY)           │
//! │                                                      │
//! │   ┌─────────────┐            ┌─────────────┐         │
//! │   │    CLI      │            │  HTTP API   │         │
//! │   │   (clap)    │            │   (axum)    │         │
//! │   └──────┬──────┘            └──────┬──────┘         │
//! │          └──────────────┬───────────┘                │
//! │                         ▼                            │
//! │                ┌────────────────┐                    │
//! │                │ convalida-core │                    │
//! │                │  (THE LOGIC)   │                    │
//! │                └────────────────┘                    │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! convalida init
//! convalida toggle CAL-103 DIBUJO-CAD
//! convalida progress
//! convalida server --port 8080
//! ```

use clap::Parser;
use convalida::{
    cli,
    config::{Config, LogConfig, LogFormat},
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log, cli.verbose);

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli, config).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured filter.
fn init_tracing(log: &LogConfig, verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("convalida=debug,convalida_core=debug,tower_http=debug")
        } else {
            EnvFilter::new(&log.filter)
        }
    });

    match log.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

fn print_banner() {
    println!(
        r#"
  convalida v{}
  ICOC 2016 -> ICOC 2026 curriculum equivalence viewer
"#,
        env!("CARGO_PKG_VERSION")
    );
}
