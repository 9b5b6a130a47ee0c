//! `oceanctl` binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ocean_api::ApiClient;
use ocean_cli::cli::{Cli, Commands, ComputeCommands};
use ocean_cli::commands::{AppsCommand, DropletCommand, SnapshotCommand};
use ocean_cli::confirm::StdinConfirm;
use ocean_cli::output::OutputFormat;
use ocean_cli::{CliError, ConfigFile, Settings};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose || cli.trace { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(io::stderr)
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let file = ConfigFile::load(cli.config.as_deref())?;
    let settings = Settings::resolve(&cli, &file)?;
    debug!(api_url = %settings.api_url, "settings resolved");

    let client = ApiClient::new(settings.client_config())?;
    let format = OutputFormat::new(settings.output);
    let confirm = StdinConfirm;
    let mut stdout = io::stdout().lock();

    match &cli.command {
        Commands::Compute {
            command: ComputeCommands::Droplet { command },
        } => {
            let cmd = DropletCommand::new(&client, &confirm);
            cmd.execute(&mut stdout, &format, command).await?;
        }
        Commands::Compute {
            command: ComputeCommands::Snapshot { command },
        } => {
            let cmd = SnapshotCommand::new(&client, &confirm);
            cmd.execute(&mut stdout, &format, command).await?;
        }
        Commands::Apps { command } => {
            let cmd = AppsCommand::new(&client, &confirm);
            cmd.execute(&mut stdout, &format, command).await?;
        }
    }

    Ok(())
}
