use scf_types::buildstate::{Buildstate, TaskStatus};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct RetentionCaps {
    /// Keep at most this many ended sessions.
    pub max_sessions: Option<u64>,
    /// Keep at most this many done tasks.
    pub max_done_tasks: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionTrim {
    pub sessions_trimmed: u64,
    pub tasks_trimmed: u64,
}

/// Trim oldest-first beyond the caps. Open sessions and open tasks are
/// never trimmed.
pub fn apply_retention(bs: &mut Buildstate, caps: &RetentionCaps) -> RetentionTrim {
    let mut trim = RetentionTrim::default();

    if let Some(max) = caps.max_sessions {
        let ended = bs.sessions.iter().filter(|s| s.ended_at.is_some()).count() as u64;
        if ended > max {
            let mut excess = ended - max;
            bs.sessions.retain(|s| {
                if s.ended_at.is_some() && excess > 0 {
                    excess -= 1;
                    trim.sessions_trimmed += 1;
                    false
                } else {
                    true
                }
            });
        }
    }

    if let Some(max) = caps.max_done_tasks {
        let done = bs
            .tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Done)
            .count() as u64;
        if done > max {
            let mut excess = done - max;
            bs.tasks.retain(|t| {
                if t.status == TaskStatus::Done && excess > 0 {
                    excess -= 1;
                    trim.tasks_trimmed += 1;
                    false
                } else {
                    true
                }
            });
        }
    }

    if trim != RetentionTrim::default() {
        debug!(
            sessions = trim.sessions_trimmed,
            tasks = trim.tasks_trimmed,
            "applied retention"
        );
    }
    trim
}
