use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

macro_rules! job_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

job_handle!(
    /// Opaque handle of a server-side compile job.
    CompileId
);

job_handle!(
    /// Opaque handle of a server-side backtest job.
    BacktestId
);

/// Numeric project identifier.
pub type ProjectId = u64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_serialize_as_plain_strings() {
        let id = BacktestId::from("bt-1");
        assert_eq!(serde_json::to_value(&id).expect("encode"), serde_json::json!("bt-1"));

        let parsed: CompileId = serde_json::from_str("\"abc123-4f\"").expect("decode");
        assert_eq!(parsed.as_str(), "abc123-4f");
        assert_eq!(parsed.to_string(), "abc123-4f");
    }
}
