use qcloud_core::ApiClient;
use serde_json::Value;

use crate::cli::ObjectCommand;
use crate::error::CliError;

pub async fn run(command: &ObjectCommand, client: &ApiClient) -> Result<Value, CliError> {
    match command {
        ObjectCommand::Get(args) => {
            let response = client
                .object()
                .get(&args.organization_id, &args.keys, args.job_id.as_deref())
                .await?;
            Ok(serde_json::to_value(response)?)
        }
    }
}
