//! Client configuration and credentials.

use std::fmt::{Debug, Formatter};
use std::path::PathBuf;
use std::time::Duration;

use crate::polling::LoadingRetry;
use crate::ValidationError;

pub const DEFAULT_BASE_URL: &str = "https://www.quantconnect.com/api/v2";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_DIAGNOSTICS_FILE: &str = "errors.json";

pub const ENV_BASE_URL: &str = "QC_BASE_URL";
pub const ENV_USER_ID: &str = "QC_USER_ID";
pub const ENV_API_TOKEN: &str = "QC_API_TOKEN";
pub const ENV_REQUEST_TIMEOUT: &str = "QC_REQUEST_TIMEOUT_SECS";

/// Account id and API token pair. Immutable once constructed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    account_id: String,
    secret_token: String,
}

impl Credential {
    pub fn new(
        account_id: impl Into<String>,
        secret_token: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let account_id = account_id.into().trim().to_owned();
        let secret_token = secret_token.into().trim().to_owned();
        if account_id.is_empty() {
            return Err(ValidationError::EmptyAccountId);
        }
        if secret_token.is_empty() {
            return Err(ValidationError::EmptySecretToken);
        }

        Ok(Self {
            account_id,
            secret_token,
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub(crate) fn secret_token(&self) -> &str {
        &self.secret_token
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("account_id", &self.account_id)
            .field("secret_token", &"<redacted>")
            .finish()
    }
}

/// Everything an [`ApiClient`](crate::ApiClient) needs besides its transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub credential: Credential,
    pub request_timeout: Duration,
    pub loading_retry: LoadingRetry,
    /// Where raw payloads are dumped when decoding fails; `None` disables the dump.
    pub diagnostics_path: Option<PathBuf>,
}

impl ClientConfig {
    pub fn new(credential: Credential) -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            credential,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            loading_retry: LoadingRetry::for_request_timeout(DEFAULT_REQUEST_TIMEOUT),
            diagnostics_path: Some(PathBuf::from(DEFAULT_DIAGNOSTICS_FILE)),
        }
    }

    /// Read credentials and overrides from `QC_*` environment variables.
    pub fn from_env() -> Result<Self, ValidationError> {
        let account_id = std::env::var(ENV_USER_ID).unwrap_or_default();
        let secret_token = std::env::var(ENV_API_TOKEN).unwrap_or_default();
        let mut config = Self::new(Credential::new(account_id, secret_token)?);

        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            config = config.with_base_url(base_url);
        }
        if let Some(secs) = std::env::var(ENV_REQUEST_TIMEOUT)
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
        {
            config = config.with_request_timeout(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Sets the per-call timeout and re-derives the loading deadline from it.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self.loading_retry = LoadingRetry {
            deadline: timeout.saturating_mul(2),
            ..self.loading_retry
        };
        self
    }

    pub fn with_loading_retry(mut self, loading_retry: LoadingRetry) -> Self {
        self.loading_retry = loading_retry;
        self
    }

    pub fn with_diagnostics_path(mut self, path: Option<PathBuf>) -> Self {
        self.diagnostics_path = path;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ValidationError::InvalidBaseUrl {
                value: self.base_url.clone(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ValidationError::ZeroDuration {
                field: "request_timeout",
            });
        }
        Ok(())
    }
}
