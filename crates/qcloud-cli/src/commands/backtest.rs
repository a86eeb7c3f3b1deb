use std::time::Duration;

use qcloud_core::{
    ApiClient, BacktestId, BacktestParameters, CancellationToken, Coordinator, PollPolicy,
    RunRequest,
};
use serde_json::{json, Value};

use crate::cli::{BacktestCommand, BacktestRef, ChartArgs, RunArgs};
use crate::error::CliError;

pub async fn run(
    command: &BacktestCommand,
    client: &ApiClient,
    cancel: CancellationToken,
) -> Result<Value, CliError> {
    match command {
        BacktestCommand::Run(args) => run_full(args, client, cancel).await,
        BacktestCommand::Read(target) => {
            let envelope = client
                .backtests()
                .read_envelope(target.project_id, &backtest_id(target))
                .await?;
            Ok(envelope.into_value())
        }
        BacktestCommand::List(args) => {
            let list = client
                .backtests()
                .list(args.project_id, !args.no_statistics)
                .await?;
            Ok(serde_json::to_value(list)?)
        }
        BacktestCommand::Delete(target) => {
            let envelope = client
                .backtests()
                .delete(target.project_id, &backtest_id(target))
                .await?;
            Ok(envelope.into_value())
        }
        BacktestCommand::Orders(target) => {
            let orders = client
                .backtests()
                .orders()
                .read_all(target.project_id, &backtest_id(target))
                .await?;
            Ok(json!({ "length": orders.len(), "orders": orders }))
        }
        BacktestCommand::Chart(args) => chart(args, client).await,
    }
}

async fn run_full(
    args: &RunArgs,
    client: &ApiClient,
    cancel: CancellationToken,
) -> Result<Value, CliError> {
    let backtest_poll = match args.backtest_timeout_secs {
        Some(seconds) => PollPolicy::backtest().with_timeout(Duration::from_secs(seconds)),
        None => PollPolicy::backtest(),
    };
    let mut request = RunRequest::new(args.project_id, args.name.clone(), args.output_dir.clone())
        .with_parameters(parse_params(&args.params)?)
        .with_compile_poll(
            PollPolicy::compile().with_timeout(Duration::from_secs(args.compile_timeout_secs)),
        )
        .with_backtest_poll(backtest_poll);
    if args.keep {
        request = request.keep_remote();
    }

    let outcome = Coordinator::new(client.clone())
        .with_cancellation(cancel)
        .run_backtest(&request)
        .await?;
    let backtest = &outcome.result.backtest;

    Ok(json!({
        "compileId": outcome.compile_id,
        "backtestId": outcome.backtest_id,
        "status": backtest.status.as_str(),
        "error": backtest.error,
        "resultPath": outcome.result_path.display().to_string(),
        "deleted": outcome.deleted,
        "statistics": backtest.statistics,
    }))
}

async fn chart(args: &ChartArgs, client: &ApiClient) -> Result<Value, CliError> {
    let chart = client
        .backtests()
        .chart()
        .read_all(
            args.project_id,
            &BacktestId::from(args.backtest_id.as_str()),
            &args.name,
            args.count,
            args.start,
            args.end,
        )
        .await?;
    Ok(serde_json::to_value(chart)?)
}

fn backtest_id(target: &BacktestRef) -> BacktestId {
    BacktestId::from(target.backtest_id.as_str())
}

/// Parses `key=value` pairs; values that read as JSON keep their type, anything else is a string.
fn parse_params(raw: &[String]) -> Result<BacktestParameters, CliError> {
    raw.iter()
        .map(|pair| {
            let (key, value) = pair
                .split_once('=')
                .filter(|(key, _)| !key.trim().is_empty())
                .ok_or_else(|| CliError::Argument(format!("expected KEY=VALUE, got '{pair}'")))?;
            let value = serde_json::from_str::<Value>(value)
                .unwrap_or_else(|_| Value::String(value.to_string()));
            Ok((key.trim().to_string(), value))
        })
        .collect()
}
