use chrono::{DateTime, Utc};
use scf_types::buildstate::{Buildstate, Session};
use tracing::debug;
use uuid::Uuid;

use crate::CoreError;

/// Open a new session. At most one session may be open at a time.
pub fn start_session(bs: &mut Buildstate, now: DateTime<Utc>) -> Result<Uuid, CoreError> {
    if let Some(open) = bs.open_session() {
        return Err(CoreError::SessionAlreadyOpen {
            started_at: open.started_at,
        });
    }

    let id = Uuid::new_v4();
    bs.sessions.push(Session {
        id,
        started_at: now,
        ended_at: None,
        summary: None,
        highlights: vec![],
    });
    debug!(session = %id, "started session");
    Ok(id)
}

/// Close the open session, recording an optional summary and highlights.
pub fn end_session(
    bs: &mut Buildstate,
    now: DateTime<Utc>,
    summary: Option<String>,
    highlights: Vec<String>,
) -> Result<Uuid, CoreError> {
    let session = bs.open_session_mut().ok_or(CoreError::NoOpenSession)?;
    session.ended_at = Some(now);
    session.summary = summary;
    session.highlights = highlights;
    let id = session.id;
    debug!(session = %id, "ended session");
    Ok(id)
}
