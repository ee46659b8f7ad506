use serde::{Deserialize, Serialize};

pub mod buildstate_v1;
pub mod patterns_v1;

pub use buildstate_v1::BuildstateV1;
pub use patterns_v1::PatternStoreV1;

/// Tool information for wire-level schemas (schema-exact).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfoV1 {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

/// Errors emitted while converting internal models to wire models.
#[derive(Debug, Clone)]
pub enum WireError {
    MissingToolVersion { context: &'static str },
}

impl std::fmt::Display for WireError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireError::MissingToolVersion { context } => {
                write!(f, "missing tool version for {}", context)
            }
        }
    }
}

impl std::error::Error for WireError {}
