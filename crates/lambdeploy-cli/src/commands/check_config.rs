use anyhow::Result;
use colored::Colorize;
use lambdeploy_server::DeployerConfig;

use crate::output::{print_success, print_warning};

pub fn run(config: &DeployerConfig, source: &str) -> Result<()> {
    println!("{}: {}", "Config".cyan(), source);
    println!("{}", toml::to_string_pretty(&config.masked())?);

    for (value, name) in [
        (&config.meta.url, "meta.url (META_URL)"),
        (&config.target.org, "target.org (TARGET_ORG)"),
        (
            &config.target.lambda_provider_id,
            "target.lambda_provider_id (LAMBDA_PROVIDER_ID)",
        ),
    ] {
        if lambdeploy_server::config::non_empty(value).is_none() {
            print_warning(&format!("{name} is not set; invocations will fail"));
        }
    }
    if config.gitlab_enabled() {
        print_success("GitLab callback enabled");
    }
    print_success("Configuration is valid");
    Ok(())
}
