mod cli;
mod commands;
mod output;

use anyhow::{Result, anyhow};
use clap::Parser;
use lambdeploy_server::config::loader::{DEFAULT_CONFIG_FILE, load_config};

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            print_error(&format!("Failed to load .env file: {e}"));
        }
    }

    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            print_error(&format!("{e:#}"));
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<bool> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let cfg = load_config(config_path).map_err(|e| anyhow!("Configuration error: {e}"))?;
    lambdeploy_server::observability::install(&cfg.logging.level);

    match &cli.command {
        Commands::Invoke(args) => {
            commands::invoke::run(
                &cfg,
                args.file.as_deref(),
                args.action.map(Into::into),
                args.authorization.as_deref(),
            )
            .await
        }
        Commands::CheckConfig => {
            commands::check_config::run(&cfg, config_path.unwrap_or(DEFAULT_CONFIG_FILE))?;
            Ok(true)
        }
    }
}
