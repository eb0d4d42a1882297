// Synapse Host - Main Entry Point
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// CLI for the local hands agent. The brain decides, this process gates and runs.
// Usage:
//   synapse-host start [--session-id <ID>]      # Join a session and serve tool calls
//   synapse-host call <tool> [<args-json>]      # Run one tool locally through the gate
//   synapse-host tools [--config]               # List tools (and effective config)
//
// SYNAPSE_URL overrides the session broker base URL.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use synapse_host::{
    client::HostClient,
    config::AgentConfig,
    dispatch::Dispatcher,
    protocol::ResultStatus,
    router::Router,
    session::HttpBroker,
    tools::Workspace,
    ui::{self, TerminalOperator},
};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "synapse-host")]
#[command(version)]
#[command(about = "Synapse: the remote brain, local hands agent")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to the Synapse brain and serve its tool calls
    Start {
        /// Rejoin an existing session instead of creating one
        #[arg(short, long)]
        session_id: Option<String>,
    },

    /// Run one tool in the working directory, gated like a remote call
    Call {
        /// Tool name (git_status, git_diff, read_file, write_file, run_command)
        tool: String,

        /// Arguments as a JSON object
        #[arg(default_value = "{}")]
        arguments: String,
    },

    /// List available tools
    Tools {
        /// Also print the effective configuration as JSON
        #[arg(long)]
        config: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging (safe if already init)
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();

    let cli = Cli::parse();
    let config = AgentConfig::from_env();

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    match cli.command {
        Commands::Start { session_id } => {
            ui::print_welcome();
            let workspace = Workspace::current().context("Failed to resolve working directory")?;
            let broker = HttpBroker::new(config.new_session_url()).context("Failed to build HTTP client")?;
            let router = Router::new(Dispatcher::new(workspace, TerminalOperator::spawn()));
            let mut client = HostClient::new(config, broker, router).with_session_id(session_id);

            let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
            let cancel = CancellationToken::new();
            runtime.spawn(interrupt(cancel.clone()));

            let outcome = runtime.block_on(client.start(&cancel));
            // A pending stdin read must not hold the process open
            runtime.shutdown_background();

            outcome.context("Session failed")?;
            println!("Disconnected.");
        }

        Commands::Call { tool, arguments } => {
            let arguments: serde_json::Value = serde_json::from_str(&arguments)
                .with_context(|| format!("Invalid arguments JSON: {}", arguments))?;
            let workspace = Workspace::current().context("Failed to resolve working directory")?;
            let mut dispatcher = Dispatcher::new(workspace, TerminalOperator::spawn());

            let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
            let output = runtime.block_on(async {
                tokio::select! {
                    output = dispatcher.dispatch(&tool, &arguments) => Some(output),
                    _ = tokio::signal::ctrl_c() => None,
                }
            });
            runtime.shutdown_background();

            let Some(output) = output else {
                eprintln!("Interrupted.");
                std::process::exit(130);
            };
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
            if ResultStatus::of(&output) == ResultStatus::Error {
                std::process::exit(1);
            }
        }

        Commands::Tools { config: show_config } => {
            ui::print_tools();
            if show_config {
                println!();
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

/// Cancel the session on Ctrl-C
async fn interrupt(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            log::info!("Interrupt received");
            cancel.cancel();
        }
        Err(e) => log::error!("Failed to listen for Ctrl-C: {}", e),
    }
}
