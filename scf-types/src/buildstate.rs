use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The buildstate file carried between agent sessions.
///
/// scf tries hard to be *tolerant* when reading buildstates:
/// - Unknown fields are ignored.
/// - Optional fields may be absent.
///
/// Writers should produce schema-exact output (see [`crate::wire`]); the
/// reader's job is to stay useful with buildstates "as found".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Buildstate {
    /// Schema identifier, e.g. "scf.buildstate.v1".
    pub schema: String,

    pub tool: ToolInfo,

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

impl Buildstate {
    pub fn new(tool: ToolInfo, project: ProjectInfo, now: DateTime<Utc>) -> Self {
        Self {
            schema: crate::schema::SCF_BUILDSTATE_V1.to_string(),
            tool,
            project,
            focus: Focus::default(),
            tasks: vec![],
            decisions: vec![],
            patterns: vec![],
            sessions: vec![],
            integrity: Integrity {
                markdown_sha256: None,
                updated_at: now,
            },
        }
    }

    /// The currently open session, if any. At most one session may be open.
    pub fn open_session(&self) -> Option<&Session> {
        self.sessions.iter().find(|s| s.ended_at.is_none())
    }

    pub fn open_session_mut(&mut self) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.ended_at.is_none())
    }

    pub fn open_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.status == TaskStatus::Open)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,

    #[serde(default)]
    pub kind: ProjectKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Project root as recorded at init time.
    pub root: String,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    Rust,
    Node,
    Python,
    Go,
    #[default]
    Unknown,
}

impl ProjectKind {
    pub fn label(self) -> &'static str {
        match self {
            ProjectKind::Rust => "rust",
            ProjectKind::Node => "node",
            ProjectKind::Python => "python",
            ProjectKind::Go => "go",
            ProjectKind::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Focus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Session during which the task was completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Open,
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub id: Uuid,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,

    pub decided_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    pub id: Uuid,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Project kinds this pattern is known to apply to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kinds: Vec<ProjectKind>,

    #[serde(default)]
    pub origin: PatternOrigin,

    #[serde(default)]
    pub times_applied: u64,

    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternOrigin {
    /// Recorded in this project.
    #[default]
    Local,
    /// Copied into the global store from a project.
    Promoted,
    /// Copied from the global store at init time.
    Seeded,
}

impl PatternOrigin {
    pub fn label(self) -> &'static str {
        match self {
            PatternOrigin::Local => "local",
            PatternOrigin::Promoted => "promoted",
            PatternOrigin::Seeded => "seeded",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<String>,
}

/// Bookkeeping that keeps buildstate.json and buildstate.md in step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Integrity {
    /// sha256 of buildstate.md as last rendered by scf.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown_sha256: Option<String>,

    pub updated_at: DateTime<Utc>,
}

impl Default for Integrity {
    fn default() -> Self {
        Self {
            markdown_sha256: None,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }
}
