use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::buildstate::{Pattern, ToolInfo};

/// The global (cross-project) pattern store.
///
/// Lives in the user data directory, not in any project. Reads are
/// tolerant, same as [`crate::buildstate::Buildstate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternStore {
    /// Schema identifier, e.g. "scf.patterns.v1".
    pub schema: String,

    pub tool: ToolInfo,

    #[serde(default)]
    pub patterns: Vec<Pattern>,

    pub updated_at: DateTime<Utc>,
}

impl PatternStore {
    pub fn new(tool: ToolInfo, now: DateTime<Utc>) -> Self {
        Self {
            schema: crate::schema::SCF_PATTERNS_V1.to_string(),
            tool,
            patterns: vec![],
            updated_at: now,
        }
    }

    pub fn has_pattern_named(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.name == name)
    }
}
