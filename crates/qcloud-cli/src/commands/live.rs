use qcloud_core::ApiClient;
use serde_json::{json, Value};

use crate::cli::LiveCommand;
use crate::error::CliError;

pub async fn run(command: &LiveCommand, client: &ApiClient) -> Result<Value, CliError> {
    match command {
        LiveCommand::Orders(args) => {
            let orders = client.live().orders().read_all(args.project_id).await?;
            Ok(json!({ "length": orders.len(), "orders": orders }))
        }
    }
}
