use chrono::{DateTime, Utc};
use uuid::Uuid;

// Deterministic ID: v5(namespace, stable_key_bytes)
const NAMESPACE: Uuid = Uuid::from_bytes([
    0x7c, 0x1e, 0xa9, 0x02, 0x4f, 0x11, 0x4a, 0x7d, 0x9b, 0x3e, 0x5a, 0x08, 0x66, 0x21, 0x0d,
    0x44,
]);

/// Deterministic entry id over kind, title, and creation time.
///
/// Recording the same fact twice in the same instant yields the same id,
/// which makes re-recording idempotent at the callers' dedup layer.
pub fn entry_id(kind: &str, title: &str, created_at: DateTime<Utc>) -> Uuid {
    let stable_key = format!("{}|{}|{}", kind, title, created_at.to_rfc3339());
    Uuid::new_v5(&NAMESPACE, stable_key.as_bytes())
}

/// Match a reference (full id, id prefix, or exact label) against entries.
///
/// Returns the index of the single match. Id-prefix matching requires at
/// least 4 characters so a one-letter reference cannot silently pick an id.
pub(crate) fn match_reference(
    reference: &str,
    entries: impl Iterator<Item = (Uuid, String)>,
) -> Result<usize, crate::CoreError> {
    let mut matches: Vec<usize> = Vec::new();

    for (idx, (id, label)) in entries.enumerate() {
        let id_str = id.to_string();
        let id_hit = id_str == reference || (reference.len() >= 4 && id_str.starts_with(reference));
        if id_hit || label == reference {
            matches.push(idx);
        }
    }

    match matches.len() {
        0 => Err(crate::CoreError::NoMatch {
            reference: reference.to_string(),
        }),
        1 => Ok(matches[0]),
        count => Err(crate::CoreError::Ambiguous {
            reference: reference.to_string(),
            count,
        }),
    }
}
