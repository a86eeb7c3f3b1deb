//! Maps a decoded envelope to a typed result or a typed failure.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{error, warn};

use crate::envelope::Envelope;
use crate::error::{ApiError, Result};

const AUTH_MARKERS: [&str; 3] = ["hash", "authenticat", "authoriz"];
const CLOCK_SKEW_MARKERS: [&str; 2] = ["expired", "too old"];

/// Stateless classifier; the only configuration is where to dump bad payloads.
#[derive(Debug, Clone, Default)]
pub struct ResponseClassifier {
    diagnostics_path: Option<PathBuf>,
}

impl ResponseClassifier {
    pub fn new(diagnostics_path: Option<PathBuf>) -> Self {
        Self { diagnostics_path }
    }

    pub fn diagnostics_path(&self) -> Option<&Path> {
        self.diagnostics_path.as_deref()
    }

    /// Pass-through: returns the envelope unchanged unless it reports failure.
    pub fn classify_raw(&self, path: &str, envelope: Envelope) -> Result<Envelope> {
        self.ensure_success(path, &envelope)?;
        Ok(envelope)
    }

    /// Success check followed by a typed decode.
    pub fn classify<T: DeserializeOwned>(&self, path: &str, envelope: Envelope) -> Result<T> {
        self.ensure_success(path, &envelope)?;
        self.decode(path, &envelope)
    }

    /// Typed decode of an envelope already known to be successful.
    ///
    /// The returned deserialization error has no diagnostics file yet; see
    /// [`Self::attach_diagnostics`].
    pub fn decode<T: DeserializeOwned>(&self, path: &str, envelope: &Envelope) -> Result<T> {
        T::deserialize(envelope.as_value()).map_err(|source| {
            error!(path, error = %source, "response payload did not match the expected shape");
            ApiError::Deserialization {
                message: source.to_string(),
                payload: envelope.as_value().clone(),
                diagnostics: None,
            }
        })
    }

    /// Dumps the payload of a deserialization error to the diagnostics file.
    ///
    /// Covers both shape mismatches and bodies that were not JSON at all.
    /// Other errors pass through untouched.
    pub async fn attach_diagnostics(&self, error: ApiError) -> ApiError {
        match error {
            ApiError::Deserialization {
                message,
                payload,
                diagnostics: None,
            } => {
                let diagnostics = self.write_diagnostics(&payload).await;
                ApiError::Deserialization {
                    message,
                    payload,
                    diagnostics,
                }
            }
            other => other,
        }
    }

    fn ensure_success(&self, path: &str, envelope: &Envelope) -> Result<()> {
        if envelope.success() {
            return Ok(());
        }

        let errors = envelope.errors();
        let message = envelope.first_error();
        warn!(path, errors = ?errors, "remote operation reported failure");

        if errors.iter().any(|error| looks_like_auth_rejection(error)) {
            return Err(ApiError::authentication(message));
        }
        Err(ApiError::Remote { message, errors })
    }

    async fn write_diagnostics(&self, payload: &Value) -> Option<PathBuf> {
        let path = self.diagnostics_path.as_ref()?;
        let rendered =
            serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());

        match tokio::fs::write(path, rendered).await {
            Ok(()) => {
                warn!(path = %path.display(), "raw payload saved for inspection");
                Some(path.clone())
            }
            Err(io_error) => {
                warn!(path = %path.display(), error = %io_error, "failed to write diagnostics file");
                None
            }
        }
    }
}

/// Signature and clock-skew rejections come back as ordinary remote errors.
///
/// A bare mention of "timestamp" is not enough: range validation messages use
/// the word too. It counts only next to an expiry phrase.
pub fn looks_like_auth_rejection(message: &str) -> bool {
    let lowered = message.to_ascii_lowercase();
    if AUTH_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        return true;
    }
    lowered.contains("timestamp")
        && CLOCK_SKEW_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;
    use crate::error::ApiErrorKind;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        compile_id: String,
        count: u32,
        success: bool,
    }

    #[test]
    fn decodes_matching_payload_losslessly() {
        let classifier = ResponseClassifier::new(None);
        let payload = json!({ "compileId": "abc", "count": 3, "success": true });

        let decoded: Sample = classifier
            .classify("/compile/read", Envelope::new(payload.clone()))
            .expect("payload should decode");
        assert_eq!(
            decoded,
            Sample {
                compile_id: String::from("abc"),
                count: 3,
                success: true
            }
        );
        assert_eq!(serde_json::to_value(&decoded).expect("encode"), payload);
    }

    #[test]
    fn failure_envelope_carries_first_error_and_full_list() {
        let classifier = ResponseClassifier::new(None);
        let error = classifier
            .classify::<Sample>(
                "/backtests/read",
                Envelope::new(json!({ "success": false, "errors": ["x", "y"] })),
            )
            .expect_err("must fail");

        assert_eq!(error.kind(), ApiErrorKind::RemoteOperation);
        assert!(error.to_string().contains('x'));
        assert_eq!(error.remote_errors(), ["x", "y"]);
    }

    #[test]
    fn failure_without_errors_uses_unknown_marker() {
        let classifier = ResponseClassifier::new(None);
        let error = classifier
            .classify_raw("/backtests/delete", Envelope::new(json!({ "success": false })))
            .expect_err("must fail");
        assert!(error.to_string().contains("unknown error"));
    }

    #[test]
    fn hash_rejection_is_an_authentication_error() {
        let classifier = ResponseClassifier::new(None);
        let error = classifier
            .classify_raw(
                "/compile/create",
                Envelope::new(json!({ "success": false, "errors": ["Hash doesn't match."] })),
            )
            .expect_err("must fail");
        assert_eq!(error.kind(), ApiErrorKind::Authentication);
    }

    #[test]
    fn raw_mode_passes_envelope_through_unchanged() {
        let classifier = ResponseClassifier::new(None);
        let envelope = Envelope::new(json!({ "success": true, "extra": [1, 2] }));
        let returned = classifier
            .classify_raw("/backtests/delete", envelope.clone())
            .expect("success");
        assert_eq!(returned, envelope);
    }

    #[test]
    fn timestamp_in_range_errors_is_not_an_auth_rejection() {
        assert!(!looks_like_auth_rejection(
            "Chart start timestamp must be before the end timestamp"
        ));
        assert!(looks_like_auth_rejection("Timestamp expired, please resync your clock"));
        assert!(looks_like_auth_rejection("Authorization failed"));
    }

    #[tokio::test]
    async fn shape_mismatch_writes_diagnostics_and_keeps_payload() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("errors.json");
        let classifier = ResponseClassifier::new(Some(path.clone()));
        let payload = json!({ "success": true, "compileId": 42 });

        let error = classifier
            .classify::<Sample>("/compile/read", Envelope::new(payload.clone()))
            .expect_err("must fail");
        let error = classifier.attach_diagnostics(error).await;

        match error {
            ApiError::Deserialization {
                payload: kept,
                diagnostics,
                ..
            } => {
                assert_eq!(kept, payload);
                assert_eq!(diagnostics.as_deref(), Some(path.as_path()));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let written = std::fs::read_to_string(&path).expect("diagnostics file");
        let reparsed: serde_json::Value = serde_json::from_str(&written).expect("json");
        assert_eq!(reparsed, payload);
    }

    #[tokio::test]
    async fn non_deserialization_errors_are_left_alone() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("errors.json");
        let classifier = ResponseClassifier::new(Some(path.clone()));

        let error = classifier
            .attach_diagnostics(ApiError::transport(Some(502), "bad gateway"))
            .await;
        assert_eq!(error.kind(), ApiErrorKind::Transport);
        assert!(!path.exists());
    }
}
