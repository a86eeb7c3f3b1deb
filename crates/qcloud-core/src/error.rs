use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Precondition and configuration errors raised before any network call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("account id cannot be empty")]
    EmptyAccountId,
    #[error("secret token cannot be empty")]
    EmptySecretToken,
    #[error("base url must start with http:// or https://: '{value}'")]
    InvalidBaseUrl { value: String },
    #[error("field '{field}' must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("page size {size} must be between 1 and {max}")]
    InvalidPageSize { size: usize, max: usize },
    #[error("page window [{start}, {end}) spans more than {max} records")]
    PageWindowTooLarge { start: usize, end: usize, max: usize },
    #[error("page window end {end} is before start {start}")]
    InvertedPageWindow { start: usize, end: usize },

    #[error("object store request needs at least one key or a job id")]
    MissingObjectSelector,
    #[error("chart point count must be greater than zero")]
    ZeroChartCount,
    #[error("chart range end {end} is before start {start}")]
    InvertedChartRange { start: i64, end: i64 },

    #[error("test name cannot be empty")]
    EmptyTestName,
    #[error("test name '{value}' cannot contain path separators")]
    InvalidTestName { value: String },
    #[error("invalid timestamp '{value}', expected RFC3339 or 'YYYY-MM-DD HH:MM:SS'")]
    InvalidTimestamp { value: String },
}

/// Coarse classification of [`ApiError`], mirrored by CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Authentication,
    Transport,
    RemoteOperation,
    Deserialization,
    Misuse,
    Timeout,
    BuildFailed,
    Cancelled,
    Io,
}

/// Top-level error for every client operation.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication rejected: {message}")]
    Authentication { message: String },

    #[error("transport error{}: {message}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Transport {
        status: Option<u16>,
        message: String,
    },

    #[error("remote operation failed: {message}")]
    Remote {
        message: String,
        errors: Vec<String>,
    },

    #[error("response did not match the expected shape: {message}")]
    Deserialization {
        message: String,
        payload: Value,
        diagnostics: Option<PathBuf>,
    },

    #[error(transparent)]
    Misuse(#[from] ValidationError),

    #[error("{operation} for '{handle}' did not settle within {elapsed:?}")]
    Timeout {
        operation: &'static str,
        handle: String,
        elapsed: Duration,
    },

    #[error("compile '{compile_id}' finished with BuildError")]
    BuildFailed {
        compile_id: String,
        logs: Vec<String>,
    },

    #[error("{operation} was cancelled")]
    Cancelled { operation: &'static str },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> ApiErrorKind {
        match self {
            Self::Authentication { .. } => ApiErrorKind::Authentication,
            Self::Transport { .. } => ApiErrorKind::Transport,
            Self::Remote { .. } => ApiErrorKind::RemoteOperation,
            Self::Deserialization { .. } => ApiErrorKind::Deserialization,
            Self::Misuse(_) => ApiErrorKind::Misuse,
            Self::Timeout { .. } => ApiErrorKind::Timeout,
            Self::BuildFailed { .. } => ApiErrorKind::BuildFailed,
            Self::Cancelled { .. } => ApiErrorKind::Cancelled,
            Self::Io(_) => ApiErrorKind::Io,
        }
    }

    /// Full remote error list, empty for non-remote failures.
    pub fn remote_errors(&self) -> &[String] {
        match self {
            Self::Remote { errors, .. } => errors,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_message_includes_status_when_known() {
        let error = ApiError::transport(Some(502), "bad gateway");
        assert_eq!(error.to_string(), "transport error (status 502): bad gateway");
        assert_eq!(error.kind(), ApiErrorKind::Transport);

        let error = ApiError::transport(None, "request timeout");
        assert_eq!(error.to_string(), "transport error: request timeout");
    }

    #[test]
    fn validation_errors_classify_as_misuse() {
        let error = ApiError::from(ValidationError::MissingObjectSelector);
        assert_eq!(error.kind(), ApiErrorKind::Misuse);
        assert!(error.remote_errors().is_empty());
    }
}
