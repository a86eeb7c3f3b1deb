use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::classify::ResponseClassifier;
use crate::config::ClientConfig;
use crate::endpoints::{BacktestsEndpoint, CompileEndpoint, LiveEndpoint, ObjectEndpoint};
use crate::envelope::Envelope;
use crate::error::Result;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::signer::RequestSigner;
use crate::transport::{RequestDescriptor, Transport};
use crate::ValidationError;

/// Explicitly constructed API client.
///
/// Holds only immutable state (credential, base url, policies), so clones are
/// cheap and independent workflows can share one instance.
#[derive(Clone)]
pub struct ApiClient {
    transport: Transport,
    classifier: ResponseClassifier,
}

impl ApiClient {
    /// Client backed by the production reqwest transport.
    pub fn new(config: ClientConfig) -> std::result::Result<Self, ValidationError> {
        Self::with_http_client(config, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_http_client(
        config: ClientConfig,
        http: Arc<dyn HttpClient>,
    ) -> std::result::Result<Self, ValidationError> {
        config.validate()?;
        let ClientConfig {
            base_url,
            credential,
            request_timeout,
            loading_retry,
            diagnostics_path,
        } = config;

        Ok(Self {
            transport: Transport::new(
                http,
                RequestSigner::new(credential),
                base_url,
                request_timeout,
                loading_retry,
            ),
            classifier: ResponseClassifier::new(diagnostics_path),
        })
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Sends the descriptor and decodes the successful envelope into `T`.
    pub async fn request<T: DeserializeOwned>(&self, descriptor: RequestDescriptor) -> Result<T> {
        let outcome = match self.transport.send(&descriptor).await {
            Ok(response) => self.classifier.classify(&descriptor.path, response.envelope),
            Err(error) => Err(error),
        };
        self.with_diagnostics(outcome).await
    }

    /// Sends the descriptor and returns the successful envelope untouched.
    pub async fn request_raw(&self, descriptor: RequestDescriptor) -> Result<Envelope> {
        let outcome = match self.transport.send(&descriptor).await {
            Ok(response) => self.classifier.classify_raw(&descriptor.path, response.envelope),
            Err(error) => Err(error),
        };
        self.with_diagnostics(outcome).await
    }

    /// Typed decode of an envelope previously returned by [`Self::request_raw`].
    pub async fn decode<T: DeserializeOwned>(&self, path: &str, envelope: &Envelope) -> Result<T> {
        let outcome = self.classifier.decode(path, envelope);
        self.with_diagnostics(outcome).await
    }

    async fn with_diagnostics<T>(&self, outcome: Result<T>) -> Result<T> {
        match outcome {
            Ok(value) => Ok(value),
            Err(error) => Err(self.classifier.attach_diagnostics(error).await),
        }
    }

    pub fn compile(&self) -> CompileEndpoint<'_> {
        CompileEndpoint::new(self)
    }

    pub fn backtests(&self) -> BacktestsEndpoint<'_> {
        BacktestsEndpoint::new(self)
    }

    pub fn live(&self) -> LiveEndpoint<'_> {
        LiveEndpoint::new(self)
    }

    pub fn object(&self) -> ObjectEndpoint<'_> {
        ObjectEndpoint::new(self)
    }
}
