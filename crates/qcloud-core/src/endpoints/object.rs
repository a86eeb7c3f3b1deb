use crate::client::ApiClient;
use crate::error::Result;
use crate::models::ObjectStoreResponse;
use crate::transport::RequestDescriptor;
use crate::ValidationError;

pub struct ObjectEndpoint<'a> {
    client: &'a ApiClient,
}

impl<'a> ObjectEndpoint<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Requests a download job for object-store keys, or polls an existing job.
    ///
    /// Keys win over `job_id` when both are given.
    pub async fn get(
        &self,
        organization_id: &str,
        keys: &[String],
        job_id: Option<&str>,
    ) -> Result<ObjectStoreResponse> {
        let descriptor =
            RequestDescriptor::get("/object/get").with_param("organizationId", organization_id);
        let descriptor = match (keys.is_empty(), job_id) {
            (false, _) => descriptor.with_param("keys", keys.to_vec()),
            (true, Some(job_id)) if !job_id.is_empty() => descriptor.with_param("jobId", job_id),
            _ => return Err(ValidationError::MissingObjectSelector.into()),
        };
        self.client.request(descriptor).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::test_support::scripted_client;
    use crate::error::ApiErrorKind;

    #[tokio::test]
    async fn keys_take_precedence_over_job() {
        let (client, http) = scripted_client();
        http.push_json(json!({ "success": true, "jobId": "job-1", "url": null }));

        let response = client
            .object()
            .get("org-1", &["models/a.bin".to_string()], Some("job-0"))
            .await
            .expect("get");
        assert_eq!(response.job_id.as_deref(), Some("job-1"));
        assert!(!response.is_ready());
        assert_eq!(
            http.request_bodies()[0],
            json!({ "organizationId": "org-1", "keys": ["models/a.bin"] })
        );
    }

    #[tokio::test]
    async fn job_id_alone_polls_the_job() {
        let (client, http) = scripted_client();
        http.push_json(json!({ "success": true, "jobId": "job-1", "url": "https://files.test/a.zip" }));

        let response = client
            .object()
            .get("org-1", &[], Some("job-1"))
            .await
            .expect("get");
        assert!(response.is_ready());
        assert_eq!(
            http.request_bodies()[0],
            json!({ "organizationId": "org-1", "jobId": "job-1" })
        );
    }

    #[tokio::test]
    async fn missing_selector_is_misuse() {
        let (client, http) = scripted_client();
        let error = client
            .object()
            .get("org-1", &[], None)
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), ApiErrorKind::Misuse);
        assert_eq!(http.request_count(), 0);
    }
}
