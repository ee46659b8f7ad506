//! Rendering helpers (markdown) for human-readable buildstate artifacts.

use scf_types::buildstate::{Buildstate, TaskStatus};

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// How many recent sessions to show.
    pub recent_sessions: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { recent_sessions: 5 }
    }
}

pub fn render_buildstate_md(bs: &Buildstate, opts: &RenderOptions) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", bs.project.name));
    out.push_str(&format!("- Kind: `{}`\n", bs.project.kind.label()));
    if let Some(desc) = &bs.project.description {
        out.push_str(&format!("- Description: {}\n", desc));
    }
    out.push_str(&format!(
        "- Updated: {}\n\n",
        bs.integrity.updated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    out.push_str("## Focus\n\n");
    match &bs.focus.current {
        Some(current) => out.push_str(&format!("{}\n", current)),
        None => out.push_str("_No current focus._\n"),
    }
    out.push('\n');

    out.push_str("## Next steps\n\n");
    if bs.focus.next_steps.is_empty() {
        out.push_str("_No next steps queued._\n");
    } else {
        for step in &bs.focus.next_steps {
            out.push_str(&format!("- {}\n", step));
        }
    }
    out.push('\n');

    out.push_str("## Open tasks\n\n");
    let open: Vec<_> = bs.open_tasks().collect();
    if open.is_empty() {
        out.push_str("_No open tasks._\n");
    } else {
        for task in open {
            out.push_str(&format!("- [ ] {}", task.title));
            if let Some(notes) = &task.notes {
                out.push_str(&format!(" - {}", notes));
            }
            out.push('\n');
        }
    }
    out.push('\n');

    out.push_str("## Recent sessions\n\n");
    if bs.sessions.is_empty() {
        out.push_str("_No sessions recorded._\n");
    } else {
        for session in bs.sessions.iter().rev().take(opts.recent_sessions) {
            let when = session.started_at.format("%Y-%m-%d %H:%M");
            match &session.ended_at {
                Some(_) => {
                    let summary = session.summary.as_deref().unwrap_or("(no summary)");
                    out.push_str(&format!("### {} - {}\n\n", when, summary));
                    let done: Vec<_> = bs
                        .tasks
                        .iter()
                        .filter(|t| {
                            t.status == TaskStatus::Done && t.session_id == Some(session.id)
                        })
                        .collect();
                    for task in done {
                        out.push_str(&format!("- [x] {}\n", task.title));
                    }
                    for highlight in &session.highlights {
                        out.push_str(&format!("- {}\n", highlight));
                    }
                }
                None => {
                    out.push_str(&format!("### {} - in progress\n", when));
                }
            }
            out.push('\n');
        }
    }

    out.push_str("## Decisions\n\n");
    if bs.decisions.is_empty() {
        out.push_str("_No decisions recorded._\n");
    } else {
        for decision in &bs.decisions {
            out.push_str(&format!(
                "- **{}** ({})",
                decision.title,
                decision.decided_at.format("%Y-%m-%d")
            ));
            if let Some(rationale) = &decision.rationale {
                out.push_str(&format!(": {}", rationale));
            }
            out.push('\n');
        }
    }
    out.push('\n');

    out.push_str("## Patterns\n\n");
    if bs.patterns.is_empty() {
        out.push_str("_No patterns recorded._\n");
    } else {
        for pattern in &bs.patterns {
            out.push_str(&format!(
                "- `{}` ({}, applied {}x)",
                pattern.name,
                pattern.origin.label(),
                pattern.times_applied
            ));
            if let Some(desc) = &pattern.description {
                out.push_str(&format!(": {}", desc));
            }
            out.push('\n');
        }
    }
    out.push('\n');

    out.push_str(&format!(
        "---\n_Generated by {}. Edit buildstate.json, not this file._\n",
        bs.tool.name
    ));

    out
}
