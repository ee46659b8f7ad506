use serde::{Deserialize, Serialize};

use crate::buildstate::{
    Buildstate, Decision, Focus, Integrity, Pattern, ProjectInfo, Session, Task, ToolInfo,
};
use crate::wire::{ToolInfoV1, WireError};

/// Schema-exact wire representation of scf.buildstate.v1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildstateV1 {
    pub schema: String,
    pub tool: ToolInfoV1,
    pub project: ProjectInfo,

    #[serde(default)]
    pub focus: Focus,

    #[serde(default)]
    pub tasks: Vec<Task>,

    #[serde(default)]
    pub decisions: Vec<Decision>,

    #[serde(default)]
    pub patterns: Vec<Pattern>,

    #[serde(default)]
    pub sessions: Vec<Session>,

    #[serde(default)]
    pub integrity: Integrity,
}

impl TryFrom<&Buildstate> for BuildstateV1 {
    type Error = WireError;

    fn try_from(bs: &Buildstate) -> Result<Self, Self::Error> {
        let version = bs.tool.version.clone().ok_or(WireError::MissingToolVersion {
            context: "buildstate",
        })?;

        Ok(Self {
            schema: bs.schema.clone(),
            tool: ToolInfoV1 {
                name: bs.tool.name.clone(),
                version,
                commit: bs.tool.commit.clone(),
            },
            project: bs.project.clone(),
            focus: bs.focus.clone(),
            tasks: bs.tasks.clone(),
            decisions: bs.decisions.clone(),
            patterns: bs.patterns.clone(),
            sessions: bs.sessions.clone(),
            integrity: bs.integrity.clone(),
        })
    }
}

impl From<BuildstateV1> for Buildstate {
    fn from(bs: BuildstateV1) -> Self {
        Buildstate {
            schema: bs.schema,
            tool: ToolInfo {
                name: bs.tool.name,
                version: Some(bs.tool.version),
                commit: bs.tool.commit,
            },
            project: bs.project,
            focus: bs.focus,
            tasks: bs.tasks,
            decisions: bs.decisions,
            patterns: bs.patterns,
            sessions: bs.sessions,
            integrity: bs.integrity,
        }
    }
}
