//! # KitBridge
//!
//! The command-line front end of the KitBridge orchestration engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 apps/kitbridge (THE BINARY)             │
//! │                                                         │
//! │  ┌─────────────┐    ┌──────────────┐    ┌───────────┐   │
//! │  │    CLI      │    │   Scenario   │    │  Runner   │   │
//! │  │   (clap)    │    │   (toml)     │    │  (tokio)  │   │
//! │  └──────┬──────┘    └──────┬───────┘    └─────┬─────┘   │
//! │         └──────────────────┼──────────────────┘         │
//! │                            ▼                            │
//! │                   ┌────────────────┐                    │
//! │                   │ kitbridge-core │                    │
//! │                   │  (THE ENGINE)  │                    │
//! │                   └────────────────┘                    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! kitbridge kits
//! kitbridge connect
//! kitbridge activate --project /work/demo --kits code-parser,doc-generator
//! kitbridge run --scenario demo.toml --search readme --export out.kbex
//! ```

mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // KITBRIDGE_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("KITBRIDGE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "kitbridge=debug,kitbridge_core=debug"
    } else {
        "kitbridge=info,kitbridge_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so stdout stays clean for --json-mode
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  KitBridge v{}
  typed kits, auto-wired, searchable output
"#,
        env!("CARGO_PKG_VERSION")
    );
}
