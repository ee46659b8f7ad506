use chrono::{DateTime, Utc};
use scf_types::buildstate::{Buildstate, Decision, Pattern, Task, TaskStatus};
use tracing::debug;
use uuid::Uuid;

use crate::CoreError;
use crate::ids::{entry_id, match_reference};

/// Record a task. Re-recording an open task with the same title returns
/// the existing id instead of duplicating it.
pub fn add_task(
    bs: &mut Buildstate,
    title: &str,
    notes: Option<String>,
    now: DateTime<Utc>,
) -> Uuid {
    if let Some(existing) = bs
        .tasks
        .iter()
        .find(|t| t.status == TaskStatus::Open && t.title == title)
    {
        debug!(task = %existing.id, "task already open");
        return existing.id;
    }

    let id = entry_id("task", title, now);
    bs.tasks.push(Task {
        id,
        title: title.to_string(),
        status: TaskStatus::Open,
        notes,
        created_at: now,
        completed_at: None,
        session_id: None,
    });
    debug!(task = %id, "added task");
    id
}

/// Complete a task by id prefix or exact title.
///
/// Completing an already-done task is a no-op. The open session, if any,
/// is recorded on the task.
pub fn complete_task(
    bs: &mut Buildstate,
    reference: &str,
    now: DateTime<Utc>,
) -> Result<Uuid, CoreError> {
    let idx = match_reference(
        reference,
        bs.tasks.iter().map(|t| (t.id, t.title.clone())),
    )?;

    let session_id = bs.open_session().map(|s| s.id);
    let task = &mut bs.tasks[idx];
    if task.status == TaskStatus::Done {
        return Ok(task.id);
    }

    task.status = TaskStatus::Done;
    task.completed_at = Some(now);
    task.session_id = session_id;
    debug!(task = %task.id, "completed task");
    Ok(task.id)
}

/// Record a decision with an optional rationale.
///
/// Re-recording the same title in the same instant yields the same
/// deterministic id; the existing entry is returned instead of a twin.
pub fn add_decision(
    bs: &mut Buildstate,
    title: &str,
    rationale: Option<String>,
    now: DateTime<Utc>,
) -> Uuid {
    let id = entry_id("decision", title, now);
    if let Some(existing) = bs.decisions.iter().find(|d| d.id == id) {
        debug!(decision = %existing.id, "decision already recorded");
        return existing.id;
    }
    let session_id = bs.open_session().map(|s| s.id);
    bs.decisions.push(Decision {
        id,
        title: title.to_string(),
        rationale,
        decided_at: now,
        session_id,
    });
    debug!(decision = %id, "recorded decision");
    id
}

/// Record a local pattern. Re-recording a pattern with the same name bumps
/// its application counter instead of duplicating it.
pub fn add_pattern(
    bs: &mut Buildstate,
    name: &str,
    description: Option<String>,
    now: DateTime<Utc>,
) -> Uuid {
    if let Some(existing) = bs.patterns.iter_mut().find(|p| p.name == name) {
        existing.times_applied += 1;
        debug!(pattern = %existing.id, "pattern re-applied");
        return existing.id;
    }

    let id = entry_id("pattern", name, now);
    let kind = bs.project.kind;
    bs.patterns.push(Pattern {
        id,
        name: name.to_string(),
        description,
        kinds: vec![kind],
        origin: Default::default(),
        times_applied: 1,
        recorded_at: now,
    });
    debug!(pattern = %id, "recorded pattern");
    id
}

pub fn set_focus(bs: &mut Buildstate, focus: &str) {
    bs.focus.current = Some(focus.to_string());
}

/// Queue a next step, dropping exact duplicates.
pub fn push_next_step(bs: &mut Buildstate, step: &str) {
    if bs.focus.next_steps.iter().any(|s| s == step) {
        return;
    }
    bs.focus.next_steps.push(step.to_string());
}
