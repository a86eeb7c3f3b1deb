use serde::{Deserialize, Serialize};

/// `/object/get` payload: a download job and, once ready, its URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStoreResponse {
    pub job_id: Option<String>,
    pub url: Option<String>,
}

impl ObjectStoreResponse {
    pub fn is_ready(&self) -> bool {
        self.url.as_deref().is_some_and(|url| !url.is_empty())
    }
}
