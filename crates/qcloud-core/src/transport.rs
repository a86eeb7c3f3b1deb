//! Signed single-call transport with the loading-placeholder resend loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{Map, Value};
use tracing::debug;

use crate::envelope::Envelope;
use crate::error::{ApiError, Result};
use crate::http_client::{HttpClient, HttpMethod, HttpRequest};
use crate::polling::LoadingRetry;
use crate::signer::RequestSigner;

/// Self-describing call: replaying it needs no other client state.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub path: String,
    pub body: Map<String, Value>,
    pub query: Vec<(String, String)>,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: Map::new(),
            query: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.insert(key.into(), value.into());
        self
    }

    /// Adds the parameter only when a value is present.
    pub fn with_optional_param<V: Into<Value>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with_param(key, value),
            None => self,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    fn url(&self, base_url: &str) -> String {
        let mut url = format!("{base_url}{}", self.path);
        if !self.query.is_empty() {
            let query = self
                .query
                .iter()
                .map(|(key, value)| {
                    format!(
                        "{}={}",
                        urlencoding::encode(key),
                        urlencoding::encode(value)
                    )
                })
                .collect::<Vec<_>>()
                .join("&");
            url.push('?');
            url.push_str(&query);
        }
        url
    }
}

/// Status line plus decoded body of the final exchange for one descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub envelope: Envelope,
    /// Number of physical sends, loading resends included.
    pub attempts: u32,
}

/// Sends descriptors through an [`HttpClient`], signing every physical send.
#[derive(Clone)]
pub struct Transport {
    http: Arc<dyn HttpClient>,
    signer: RequestSigner,
    base_url: String,
    request_timeout: Duration,
    loading_retry: LoadingRetry,
}

impl Transport {
    pub fn new(
        http: Arc<dyn HttpClient>,
        signer: RequestSigner,
        base_url: impl Into<String>,
        request_timeout: Duration,
        loading_retry: LoadingRetry,
    ) -> Self {
        Self {
            http,
            signer,
            base_url: base_url.into(),
            request_timeout,
            loading_retry,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn send(&self, descriptor: &RequestDescriptor) -> Result<RawResponse> {
        let url = descriptor.url(&self.base_url);
        let body = serde_json::to_string(&descriptor.body).map_err(|source| {
            ApiError::transport(None, format!("failed to encode request body: {source}"))
        })?;

        let started = Instant::now();
        let mut attempts = 0_u32;
        loop {
            attempts += 1;
            debug!(method = %descriptor.method, path = %descriptor.path, attempt = attempts, "sending request");

            let (status, envelope) = self.send_once(descriptor, &url, &body).await?;
            if !envelope.is_loading() || self.loading_retry.expired(started) {
                return Ok(RawResponse {
                    status,
                    envelope,
                    attempts,
                });
            }

            debug!(
                path = %descriptor.path,
                attempt = attempts,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "result still loading; resending"
            );
            tokio::time::sleep(self.loading_retry.interval).await;
        }
    }

    async fn send_once(
        &self,
        descriptor: &RequestDescriptor,
        url: &str,
        body: &str,
    ) -> Result<(u16, Envelope)> {
        let request = HttpRequest::new(descriptor.method, url)
            .with_json_body(body)
            .with_signature(&self.signer.sign_now())
            .with_timeout_ms(self.request_timeout.as_millis() as u64);

        let response = self.http.execute(request).await.map_err(|error| {
            ApiError::transport(None, error.message().to_owned())
        })?;

        if matches!(response.status, 401 | 403) {
            return Err(ApiError::authentication(format!(
                "{} {} returned status {}",
                descriptor.method, descriptor.path, response.status
            )));
        }
        if !response.is_success() {
            return Err(ApiError::transport(
                Some(response.status),
                format!("{} {} failed", descriptor.method, descriptor.path),
            ));
        }

        let value: Value = serde_json::from_str(&response.body).map_err(|source| {
            ApiError::Deserialization {
                message: format!("response body is not JSON: {source}"),
                payload: Value::String(response.body.clone()),
                diagnostics: None,
            }
        })?;

        Ok((response.status, Envelope::new(value)))
    }
}
