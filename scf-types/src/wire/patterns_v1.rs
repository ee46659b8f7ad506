use serde::{Deserialize, Serialize};

use crate::buildstate::{Pattern, ToolInfo};
use crate::patterns::PatternStore;
use crate::wire::{ToolInfoV1, WireError};
use chrono::{DateTime, Utc};

/// Schema-exact wire representation of scf.patterns.v1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternStoreV1 {
    pub schema: String,
    pub tool: ToolInfoV1,

    #[serde(default)]
    pub patterns: Vec<Pattern>,

    pub updated_at: DateTime<Utc>,
}

impl TryFrom<&PatternStore> for PatternStoreV1 {
    type Error = WireError;

    fn try_from(store: &PatternStore) -> Result<Self, Self::Error> {
        let version = store
            .tool
            .version
            .clone()
            .ok_or(WireError::MissingToolVersion { context: "patterns" })?;

        Ok(Self {
            schema: store.schema.clone(),
            tool: ToolInfoV1 {
                name: store.tool.name.clone(),
                version,
                commit: store.tool.commit.clone(),
            },
            patterns: store.patterns.clone(),
            updated_at: store.updated_at,
        })
    }
}

impl From<PatternStoreV1> for PatternStore {
    fn from(store: PatternStoreV1) -> Self {
        PatternStore {
            schema: store.schema,
            tool: ToolInfo {
                name: store.tool.name,
                version: Some(store.tool.version),
                commit: store.tool.commit,
            },
            patterns: store.patterns,
            updated_at: store.updated_at,
        }
    }
}
