mod backtest;
mod compile;
mod live;
mod object;

use std::time::Duration;

use qcloud_core::{ApiClient, CancellationToken, ClientConfig};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli, cancel: CancellationToken) -> Result<Value, CliError> {
    let client = build_client(cli)?;

    match &cli.command {
        Command::Compile(args) => compile::run(args, &client, cancel).await,
        Command::Backtest(command) => backtest::run(command, &client, cancel).await,
        Command::Live(command) => live::run(command, &client).await,
        Command::Object(command) => object::run(command, &client).await,
    }
}

fn build_client(cli: &Cli) -> Result<ApiClient, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.clone());
    }
    if let Some(seconds) = cli.timeout_secs {
        config = config.with_request_timeout(Duration::from_secs(seconds));
    }
    Ok(ApiClient::new(config)?)
}
