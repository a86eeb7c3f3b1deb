mod cli;
mod commands;
mod error;
mod output;

use std::future::Future;
use std::process::ExitCode;

use clap::Parser;
use qcloud_core::{ApiError, CancellationToken};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    let value = until_cancelled(&cancel, commands::run(&cli, cancel.clone())).await?;
    output::render(&value, cli.pretty)?;
    Ok(())
}

/// Ends the command as soon as the token is cancelled.
async fn until_cancelled<T, F>(cancel: &CancellationToken, command: F) -> Result<T, CliError>
where
    F: Future<Output = Result<T, CliError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ApiError::Cancelled { operation: "command" }.into()),
        outcome = command => outcome,
    }
}

/// Logs go to stderr so stdout stays pure JSON.
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn interrupt_ends_a_pending_command_with_exit_code_7() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let error = until_cancelled(&cancel, std::future::pending::<Result<(), CliError>>())
            .await
            .expect_err("must be cancelled");
        assert_eq!(error.exit_code(), 7);
    }

    #[tokio::test]
    async fn finished_command_passes_through() {
        let cancel = CancellationToken::new();
        let value = until_cancelled(&cancel, async { Ok::<_, CliError>(42) })
            .await
            .expect("command result");
        assert_eq!(value, 42);
    }
}
