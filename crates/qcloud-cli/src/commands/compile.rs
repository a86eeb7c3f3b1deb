use qcloud_core::{ApiClient, CancellationToken, CompileReadResponse, Coordinator, PollPolicy};
use serde_json::Value;
use tracing::info;

use crate::cli::CompileArgs;
use crate::error::CliError;

pub async fn run(
    args: &CompileArgs,
    client: &ApiClient,
    cancel: CancellationToken,
) -> Result<Value, CliError> {
    let created = client.compile().create(args.project_id).await?;
    info!(compile_id = %created.compile_id, "compile job created");

    let read = if created.state.is_terminal() {
        CompileReadResponse::from(created)
    } else {
        Coordinator::new(client.clone())
            .with_cancellation(cancel)
            .wait_for_compile(args.project_id, &created.compile_id, PollPolicy::compile())
            .await?
    };
    Ok(serde_json::to_value(read)?)
}
