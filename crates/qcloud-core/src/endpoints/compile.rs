use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{CompileCreateResponse, CompileId, CompileReadResponse, ProjectId};
use crate::transport::RequestDescriptor;

pub struct CompileEndpoint<'a> {
    client: &'a ApiClient,
}

impl<'a> CompileEndpoint<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Starts a compile job for the project.
    pub async fn create(&self, project_id: ProjectId) -> Result<CompileCreateResponse> {
        self.client
            .request(RequestDescriptor::post("/compile/create").with_param("projectId", project_id))
            .await
    }

    pub async fn read(
        &self,
        project_id: ProjectId,
        compile_id: &CompileId,
    ) -> Result<CompileReadResponse> {
        self.client
            .request(
                RequestDescriptor::get("/compile/read")
                    .with_param("projectId", project_id)
                    .with_param("compileId", compile_id.as_str()),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::test_support::scripted_client;
    use crate::http_client::HttpMethod;
    use crate::models::CompileState;

    #[tokio::test]
    async fn create_posts_project_id() {
        let (client, http) = scripted_client();
        http.push_json(json!({
            "success": true,
            "compileId": "abc123",
            "state": "InQueue",
            "projectId": 7,
            "signature": "sig",
            "signatureOrder": ["main.py"],
            "logs": []
        }));

        let created = client.compile().create(7).await.expect("create");
        assert_eq!(created.compile_id.as_str(), "abc123");
        assert_eq!(created.state, CompileState::InQueue);

        let requests = http.requests();
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].url, "https://api.test/v2/compile/create");
        assert_eq!(http.request_bodies()[0], json!({ "projectId": 7 }));
    }

    #[tokio::test]
    async fn read_sends_both_identifiers() {
        let (client, http) = scripted_client();
        http.push_json(json!({
            "success": true,
            "compileId": "abc123",
            "state": "BuildError",
            "logs": ["main.py:3 SyntaxError"]
        }));

        let read = client
            .compile()
            .read(7, &"abc123".into())
            .await
            .expect("read");
        assert_eq!(read.state, CompileState::BuildError);
        assert_eq!(read.logs.len(), 1);
        assert_eq!(
            http.request_bodies()[0],
            json!({ "projectId": 7, "compileId": "abc123" })
        );
    }
}
