use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ids::{CompileId, ProjectId};

/// Lifecycle of a compile job. `InQueue` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompileState {
    InQueue,
    BuildSuccess,
    BuildError,
}

impl CompileState {
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::InQueue)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InQueue => "InQueue",
            Self::BuildSuccess => "BuildSuccess",
            Self::BuildError => "BuildError",
        }
    }
}

/// `/compile/read` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileReadResponse {
    pub compile_id: CompileId,
    pub state: CompileState,
    #[serde(default)]
    pub logs: Vec<String>,
}

/// `/compile/create` payload: the read shape plus project signature data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileCreateResponse {
    pub compile_id: CompileId,
    pub state: CompileState,
    #[serde(default)]
    pub logs: Vec<String>,
    pub project_id: Option<ProjectId>,
    pub signature: Option<String>,
    #[serde(default)]
    pub signature_order: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<Value>,
}

impl From<CompileCreateResponse> for CompileReadResponse {
    fn from(value: CompileCreateResponse) -> Self {
        Self {
            compile_id: value.compile_id,
            state: value.state,
            logs: value.logs,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_create_payload_and_narrows_to_read() {
        let payload = json!({
            "compileId": "abc123",
            "state": "InQueue",
            "projectId": 42,
            "signature": "sig",
            "signatureOrder": ["a.py"],
            "parameters": [],
            "success": true
        });
        let created: CompileCreateResponse = serde_json::from_value(payload).expect("decode");
        assert_eq!(created.project_id, Some(42));

        let read = CompileReadResponse::from(created);
        assert_eq!(read.compile_id.as_str(), "abc123");
        assert!(!read.state.is_terminal());
    }

    #[test]
    fn terminal_states() {
        assert!(CompileState::BuildSuccess.is_terminal());
        assert!(CompileState::BuildError.is_terminal());
        assert_eq!(CompileState::BuildError.as_str(), "BuildError");
    }
}
