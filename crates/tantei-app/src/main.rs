//! # Tantei - publish and browse trading agents
//!
//! This is the main entry point that wires everything together.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  main.rs (this file) - Dependency Injection & Wiring           │
//! │    │                                                            │
//! │    ├── Loads: AppConfig (file + TANTEI_* env)                  │
//! │    ├── Creates: InMemory* or Mongo* stores (adapter)           │
//! │    ├── Creates: AgentRepository (use case)                     │
//! │    └── Runs: one subcommand, JSON on stdout                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage:
//!   tantei list [--owner <addr>]
//!   tantei show <id>
//!   tantei publish <agent.json>
//!   tantei update <id> <patch.json>
//!   tantei followers <account>

mod commands;
mod config;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::Command;
use config::AppConfig;

#[derive(Parser)]
#[command(name = "tantei")]
#[command(about = "Tantei - publish and browse trading agents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to a JSON config file (defaults to ./tantei.json if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    let repo = commands::build_repository(&config).await?;
    let output = commands::run(&repo, cli.command).await?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
