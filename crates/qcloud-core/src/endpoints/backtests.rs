use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::{BacktestOrdersEndpoint, ChartEndpoint};
use crate::client::ApiClient;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::models::{BacktestId, BacktestListResponse, BacktestResponse, CompileId, ProjectId};
use crate::transport::RequestDescriptor;

/// Algorithm parameters sent with `/backtests/create`, keyed by parameter name.
pub type BacktestParameters = BTreeMap<String, Value>;

pub struct BacktestsEndpoint<'a> {
    client: &'a ApiClient,
}

impl<'a> BacktestsEndpoint<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Launches a backtest from a successful compile.
    ///
    /// Parameters travel as a nested `parameters` object and are omitted when empty.
    pub async fn create(
        &self,
        project_id: ProjectId,
        compile_id: &CompileId,
        name: &str,
        parameters: &BacktestParameters,
    ) -> Result<BacktestResponse> {
        let mut descriptor = RequestDescriptor::post("/backtests/create")
            .with_param("projectId", project_id)
            .with_param("compileId", compile_id.as_str())
            .with_param("backtestName", name);
        if !parameters.is_empty() {
            let nested = parameters
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect::<Map<String, Value>>();
            descriptor = descriptor.with_param("parameters", Value::Object(nested));
        }
        self.client.request(descriptor).await
    }

    pub async fn read(
        &self,
        project_id: ProjectId,
        backtest_id: &BacktestId,
    ) -> Result<BacktestResponse> {
        self.client.request(read_descriptor(project_id, backtest_id)).await
    }

    /// Same call as [`Self::read`] but keeps the full server payload.
    pub async fn read_envelope(
        &self,
        project_id: ProjectId,
        backtest_id: &BacktestId,
    ) -> Result<Envelope> {
        self.client
            .request_raw(read_descriptor(project_id, backtest_id))
            .await
    }

    pub async fn list(
        &self,
        project_id: ProjectId,
        include_statistics: bool,
    ) -> Result<BacktestListResponse> {
        self.client
            .request(
                RequestDescriptor::get("/backtests/list")
                    .with_param("projectId", project_id)
                    .with_param("includeStatistics", include_statistics),
            )
            .await
    }

    pub async fn delete(&self, project_id: ProjectId, backtest_id: &BacktestId) -> Result<Envelope> {
        self.client
            .request_raw(
                RequestDescriptor::delete("/backtests/delete")
                    .with_param("projectId", project_id)
                    .with_param("backtestId", backtest_id.as_str()),
            )
            .await
    }

    pub fn orders(&self) -> BacktestOrdersEndpoint<'a> {
        BacktestOrdersEndpoint::new(self.client)
    }

    pub fn chart(&self) -> ChartEndpoint<'a> {
        ChartEndpoint::new(self.client)
    }
}

fn read_descriptor(project_id: ProjectId, backtest_id: &BacktestId) -> RequestDescriptor {
    RequestDescriptor::get("/backtests/read")
        .with_param("projectId", project_id)
        .with_param("backtestId", backtest_id.as_str())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::test_support::scripted_client;
    use super::*;
    use crate::http_client::HttpMethod;
    use crate::models::BacktestStatus;

    #[tokio::test]
    async fn create_nests_parameters() {
        let (client, http) = scripted_client();
        http.push_json(json!({
            "success": true,
            "backtest": { "backtestId": "bt-1", "status": "In Queue..." }
        }));

        let mut parameters = BacktestParameters::new();
        parameters.insert("ema_fast".into(), json!(10));
        parameters.insert("ticker".into(), json!("SPY"));

        let created = client
            .backtests()
            .create(7, &"abc123".into(), "ema cross", &parameters)
            .await
            .expect("create");
        assert_eq!(created.backtest.status, BacktestStatus::InQueue);
        assert_eq!(
            http.request_bodies()[0],
            json!({
                "projectId": 7,
                "compileId": "abc123",
                "backtestName": "ema cross",
                "parameters": { "ema_fast": 10, "ticker": "SPY" }
            })
        );
    }

    #[tokio::test]
    async fn create_without_parameters_omits_the_object() {
        let (client, http) = scripted_client();
        http.push_json(json!({
            "success": true,
            "backtest": { "backtestId": "bt-1", "status": "In Queue..." }
        }));

        client
            .backtests()
            .create(7, &"abc123".into(), "plain", &BacktestParameters::new())
            .await
            .expect("create");
        assert!(http.request_bodies()[0].get("parameters").is_none());
    }

    #[tokio::test]
    async fn read_envelope_keeps_unknown_fields() {
        let (client, http) = scripted_client();
        http.push_json(json!({
            "success": true,
            "backtest": { "backtestId": "bt-1", "status": "Completed.", "completed": true },
            "extra": { "kept": true }
        }));

        let envelope = client
            .backtests()
            .read_envelope(7, &"bt-1".into())
            .await
            .expect("read");
        assert_eq!(envelope.get("extra"), Some(&json!({ "kept": true })));
        let typed: BacktestResponse = client
            .decode("/backtests/read", &envelope)
            .await
            .expect("decode");
        assert!(typed.backtest.completed);
    }

    #[tokio::test]
    async fn list_and_delete_use_expected_verbs() {
        let (client, http) = scripted_client();
        http.push_json(json!({ "success": true, "backtests": [], "count": 0 }));
        http.push_json(json!({ "success": true }));

        let list = client.backtests().list(7, false).await.expect("list");
        assert_eq!(list.count, 0);
        client
            .backtests()
            .delete(7, &"bt-1".into())
            .await
            .expect("delete");

        let requests = http.requests();
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert!(requests[0].url.ends_with("/backtests/list"));
        assert_eq!(requests[1].method, HttpMethod::Delete);
        assert!(requests[1].url.ends_with("/backtests/delete"));
        assert_eq!(
            http.request_bodies(),
            vec![
                json!({ "projectId": 7, "includeStatistics": false }),
                json!({ "projectId": 7, "backtestId": "bt-1" }),
            ]
        );
    }
}
