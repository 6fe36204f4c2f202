//! Nueva Transport CLI
//!
//! Command-line interface for the audio transport coordinator.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nueva_transport::cli::commands::{self, SimulateOptions};
use nueva_transport::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Nueva Transport v{}", env!("CARGO_PKG_VERSION"));

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Some(cmd) => handle_command(cmd, config),
        None => {
            println!("Nueva Transport v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands, config: nueva_transport::TransportConfig) -> anyhow::Result<()> {
    match cmd {
        Commands::Inspect {
            tracks,
            selected_only,
            rate,
            project_rate,
        } => commands::inspect(&tracks, selected_only, rate, project_rate, config),
        Commands::Simulate {
            tracks,
            mode,
            alt,
            from,
            to,
            gaps,
            blocks,
            run_for,
            length,
            project_rate,
        } => {
            let options = SimulateOptions {
                mode,
                alt,
                from,
                to,
                gaps,
                blocks,
                run_for,
                length,
                project_rate,
            };
            commands::simulate(&tracks, &options, config)
        }
    }
}
