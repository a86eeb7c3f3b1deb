use qcloud_core::{ApiError, ApiErrorKind};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Validation(#[from] qcloud_core::ValidationError),

    #[error("invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Api(error) => match error.kind() {
                ApiErrorKind::Misuse => 2,
                ApiErrorKind::Authentication => 3,
                ApiErrorKind::RemoteOperation => 4,
                ApiErrorKind::Deserialization => 5,
                ApiErrorKind::Transport => 6,
                ApiErrorKind::Timeout | ApiErrorKind::Cancelled => 7,
                ApiErrorKind::BuildFailed => 8,
                ApiErrorKind::Io => 10,
            },
            Self::Validation(_) | Self::Argument(_) => 2,
            Self::Serialization(_) => 5,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_kinds_map_to_distinct_codes() {
        assert_eq!(CliError::from(ApiError::authentication("bad hash")).exit_code(), 3);
        assert_eq!(CliError::from(ApiError::transport(Some(503), "down")).exit_code(), 6);
        assert_eq!(
            CliError::from(ApiError::Cancelled { operation: "backtest wait" }).exit_code(),
            7
        );
        assert_eq!(
            CliError::from(ApiError::BuildFailed {
                compile_id: "abc".into(),
                logs: Vec::new()
            })
            .exit_code(),
            8
        );
        assert_eq!(CliError::Argument("x".into()).exit_code(), 2);
    }
}
