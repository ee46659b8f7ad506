use chrono::{DateTime, Utc};
use scf_types::buildstate::Buildstate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    Fresh,
    Stale { days: i64 },
}

/// A buildstate untouched for longer than the threshold is stale; its
/// context likely no longer matches the project.
pub fn staleness(bs: &Buildstate, now: DateTime<Utc>, threshold_days: u32) -> Staleness {
    let age = now.signed_duration_since(bs.integrity.updated_at);
    let days = age.num_days();
    if days > i64::from(threshold_days) {
        Staleness::Stale { days }
    } else {
        Staleness::Fresh
    }
}
