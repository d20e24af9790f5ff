use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use lambdeploy_server::Action;

#[derive(Parser)]
#[command(name = "lambdeploy")]
#[command(about = "Deploy or stop a packaged lambda and its API endpoint")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (overrides LAMBDEPLOY_CONFIG env var; default lambdeploy.toml)
    #[arg(short, long, global = true, env = "LAMBDEPLOY_CONFIG")]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one invocation and print the response
    Invoke(InvokeArgs),
    /// Load and validate configuration, then print it with secrets masked
    CheckConfig,
}

#[derive(clap::Args)]
pub struct InvokeArgs {
    /// Payload file; reads stdin when omitted or `-`
    #[arg(short, long)]
    pub file: Option<PathBuf>,
    /// Override the payload's action
    #[arg(short, long)]
    pub action: Option<ActionArg>,
    /// Authorization header value to send to the management API instead of
    /// the configured credentials
    #[arg(long, env = "META_AUTHORIZATION")]
    pub authorization: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ActionArg {
    Deploy,
    Stop,
}

impl From<ActionArg> for Action {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Deploy => Action::Deploy,
            ActionArg::Stop => Action::Stop,
        }
    }
}
