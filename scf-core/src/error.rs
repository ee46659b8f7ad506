use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("a session is already open (started {started_at})")]
    SessionAlreadyOpen { started_at: DateTime<Utc> },

    #[error("no open session")]
    NoOpenSession,

    #[error("nothing matches '{reference}'")]
    NoMatch { reference: String },

    #[error("'{reference}' is ambiguous ({count} matches)")]
    Ambiguous { reference: String, count: usize },
}
