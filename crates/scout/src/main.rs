// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scout - a research assistant that searches the web and remembers what matters.
//!
//! This is the binary entry point.

mod ask;
mod memory;
mod runtime;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use scout_agent::TurnRequest;
use scout_config::ScoutConfig;
use scout_core::ScoutError;

use crate::runtime::Runtime;

/// Scout - a research assistant that searches the web and remembers what matters.
#[derive(Parser, Debug)]
#[command(name = "scout", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Answer one question, printing turn events as JSON lines.
    Ask {
        /// The question to answer.
        message: String,
        /// Never search the web for this turn.
        #[arg(long)]
        no_search: bool,
        /// Neither recall nor store memories for this turn.
        #[arg(long)]
        no_memory: bool,
        /// Continue an existing session.
        #[arg(long)]
        session: Option<String>,
    },
    /// Inspect or reset long-term memory.
    Memory {
        #[command(subcommand)]
        command: MemoryCommand,
    },
}

#[derive(Subcommand, Debug)]
enum MemoryCommand {
    /// Delete every stored memory.
    Clear,
    /// Show the memories most similar to a query.
    Search {
        /// Text to compare memories against.
        query: String,
    },
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("scout={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> ScoutConfig {
    let loaded = match path {
        Some(path) => scout_config::load_and_validate_path(path),
        None => scout_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            scout_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

fn memory_disabled() -> ScoutError {
    ScoutError::Config("memory is disabled (memory.enabled = false)".into())
}

async fn run(cli: Cli, config: ScoutConfig) -> Result<bool, ScoutError> {
    let shutdown = shutdown::install_signal_handler();

    match cli.command {
        Commands::Serve => {
            serve::run_serve(config, shutdown).await?;
            Ok(true)
        }
        Commands::Ask {
            message,
            no_search,
            no_memory,
            session,
        } => {
            let runtime = Runtime::build(&config).await?;
            let request = TurnRequest {
                session_id: session,
                search_enabled: !no_search,
                memory_enabled: !no_memory,
                ..TurnRequest::new(message)
            };
            let mut stdout = std::io::stdout().lock();
            let completed = ask::run_ask(
                &runtime.coordinator,
                request,
                config.gateway.event_buffer,
                &mut stdout,
                &shutdown,
            )
            .await;
            runtime.close().await?;
            completed
        }
        Commands::Memory { command } => {
            let runtime = Runtime::build(&config).await?;
            let store = runtime.coordinator.memory().ok_or_else(memory_disabled)?;
            let mut stdout = std::io::stdout().lock();
            match command {
                MemoryCommand::Clear => memory::run_clear(store, &mut stdout).await?,
                MemoryCommand::Search { query } => {
                    memory::run_search(
                        store,
                        &query,
                        config.memory.retrieval_k,
                        config.memory.min_similarity,
                        &mut stdout,
                    )
                    .await?;
                }
            }
            runtime.close().await?;
            Ok(true)
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());
    init_tracing(&config.agent.log_level);

    match run(cli, config).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("scout: {e}");
            std::process::exit(1);
        }
    }
}
