//! gcron agent binary.
//!
//! # Architecture Overview
//!
//! ```text
//!   gcron agent --config-file=FILE
//!          │
//!          ▼
//!   ┌──────────────┐     ┌──────────────┐     ┌─────────────────────────┐
//!   │   startup    │────▶│    Agent     │────▶│  membership service     │
//!   │ config+merge │     │ start()      │     │  (standalone backend)   │
//!   └──────────────┘     └──────┬───────┘     └───────────┬─────────────┘
//!                               │  event loop ◀── events ─┘
//!                               │
//!   OS signals ──▶ signals ──▶ LifecycleController ──▶ Agent::shutdown()
//!                               │   (3s grace period)
//!                               ▼
//!                          exit code 0 / 1
//! ```

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use gcron::cli::{Cli, Commands};
use gcron::lifecycle::{signals, startup, LifecycleController};
use gcron::membership::StandaloneProvider;
use gcron::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();

    match cli.command {
        Commands::Agent { config_file } => run_agent(config_file.as_deref()).await,
    }
}

async fn run_agent(config_file: Option<&Path>) -> ExitCode {
    tracing::info!("gcron v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match startup::load(config_file) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read configuration");
            eprintln!("==> {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("==> Starting gcron agent...");
    let agent = match startup::start_agent(config, StandaloneProvider).await {
        Ok(agent) => agent,
        Err(e) => {
            tracing::error!(error = %e, "Agent start failed");
            eprintln!("==> {}", e);
            return ExitCode::FAILURE;
        }
    };

    let signals = match signals::listen() {
        Ok(signals) => signals,
        Err(e) => {
            tracing::error!(error = %e, "Failed to install signal handlers");
            eprintln!("==> Failed to install signal handlers: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = LifecycleController::new(agent, signals).run().await;
    tracing::info!(outcome = ?outcome, "Agent exiting");
    outcome.exit_code()
}
