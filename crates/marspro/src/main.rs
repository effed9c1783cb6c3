mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use marspro_core::Hub;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need the service
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "marspro", &mut std::io::stdout());
            Ok(())
        }

        Command::Login => {
            let (hub_config, profile) = config::build_hub_config(&cli.global)?;
            let hub = Hub::new(hub_config)?;
            commands::login::handle(&hub, &cli.global)
                .await
                .map_err(|e| e.for_profile(&profile))
        }

        // Long-running: keeps its own poll cadence
        Command::Watch(args) => {
            let (mut hub_config, profile) = config::build_hub_config(&cli.global)?;
            if let Some(interval) = args.interval {
                hub_config.refresh_interval_secs = interval;
            }
            let hub = Hub::new(hub_config)?;
            commands::watch::handle(&hub, &cli.global)
                .await
                .map_err(|e| e.for_profile(&profile))
        }

        // Everything else: connect, run once, disconnect
        cmd => {
            let (hub_config, profile) = config::build_hub_config(&cli.global)?;
            let global = &cli.global;

            tracing::debug!(command = ?cmd, profile = %profile, "dispatching command");
            Hub::oneshot(hub_config, |hub| async move {
                Ok(commands::dispatch(cmd, &hub, global).await)
            })
            .await
            .map_err(|e| CliError::from(e).for_profile(&profile))?
        }
    }
}
