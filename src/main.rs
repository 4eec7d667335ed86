mod cli;
mod commands;
mod output;

use std::io;
use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;

use cli::{Cli, Commands, TriggerCommands};
use linear_connector::config::Config;
use linear_connector::LicenseNotice;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    let verbose = cli.verbose;
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");

        // Show error chain if verbose flag was passed
        if verbose {
            for cause in e.chain().skip(1) {
                eprintln!("Caused by: {cause}");
            }
        }

        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let format = cli.output_format();

    match cli.command {
        // Commands that don't require config/client
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "linear-connector", &mut io::stdout());
        }
        Commands::Init => {
            commands::init::run().await?;
        }
        Commands::Trigger {
            action: TriggerCommands::Deliver(args),
        } => {
            commands::trigger::deliver(args, format)?;
        }
        Commands::Trigger {
            action: TriggerCommands::Sign { body, secret },
        } => {
            commands::trigger::sign(&body, &secret)?;
        }
        // Commands that require config and client
        command => {
            let config = Config::load()?;
            let client = config.client(Arc::new(LicenseNotice::new()))?;

            match command {
                Commands::Exec(args) => {
                    commands::exec::run(&client, args, format).await?;
                }
                Commands::Trigger { action } => match action {
                    TriggerCommands::Status { url } => {
                        commands::trigger::status(&client, &url, format).await?;
                    }
                    TriggerCommands::Activate(args) => {
                        commands::trigger::activate(&client, args, format).await?;
                    }
                    TriggerCommands::Deactivate { url } => {
                        commands::trigger::deactivate(&client, &url, format).await?;
                    }
                    TriggerCommands::Deliver(_) | TriggerCommands::Sign { .. } => {
                        // Already handled above
                    }
                },
                Commands::Completions { .. } | Commands::Init => {
                    // Already handled above
                }
            }
        }
    }

    Ok(())
}
