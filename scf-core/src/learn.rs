//! Cross-project pattern learning.
//!
//! Patterns recorded in one project can be promoted into a global store
//! and seeded into the next project of a matching kind. "Learning" here is
//! bookkeeping: origin tracking and application counters, nothing more.

use chrono::{DateTime, Utc};
use scf_types::buildstate::{Buildstate, Pattern, PatternOrigin, ProjectKind};
use scf_types::patterns::PatternStore;
use tracing::debug;
use uuid::Uuid;

use crate::CoreError;
use crate::ids::match_reference;

/// Copy a project pattern into the global store.
///
/// Promoting a pattern whose name already exists globally merges the
/// application counters instead of duplicating the entry.
pub fn promote_pattern(
    bs: &Buildstate,
    store: &mut PatternStore,
    reference: &str,
    now: DateTime<Utc>,
) -> Result<Uuid, CoreError> {
    let idx = match_reference(
        reference,
        bs.patterns.iter().map(|p| (p.id, p.name.clone())),
    )?;
    let pattern = &bs.patterns[idx];

    if let Some(existing) = store.patterns.iter_mut().find(|p| p.name == pattern.name) {
        existing.times_applied += pattern.times_applied;
        for kind in &pattern.kinds {
            if !existing.kinds.contains(kind) {
                existing.kinds.push(*kind);
            }
        }
        store.updated_at = now;
        debug!(pattern = %existing.id, "merged into global store");
        return Ok(existing.id);
    }

    let mut promoted = pattern.clone();
    promoted.origin = PatternOrigin::Promoted;
    promoted.recorded_at = now;
    let id = promoted.id;
    store.patterns.push(promoted);
    store.updated_at = now;
    debug!(pattern = %id, "promoted to global store");
    Ok(id)
}

/// Globally stored patterns applicable to a project kind, name-sorted.
///
/// Patterns with no recorded kinds are kind-agnostic and always match.
pub fn suggest_patterns(store: &PatternStore, kind: ProjectKind) -> Vec<&Pattern> {
    let mut out: Vec<&Pattern> = store
        .patterns
        .iter()
        .filter(|p| p.kinds.is_empty() || p.kinds.contains(&kind))
        .collect();
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

/// Seed a buildstate with matching global patterns.
///
/// Each seeded copy bumps the store-side application counter; that is the
/// signal that a pattern keeps earning its place. Returns how many
/// patterns were seeded.
pub fn seed_patterns(bs: &mut Buildstate, store: &mut PatternStore, now: DateTime<Utc>) -> usize {
    let kind = bs.project.kind;
    let names: Vec<String> = suggest_patterns(store, kind)
        .into_iter()
        .filter(|p| !bs.patterns.iter().any(|local| local.name == p.name))
        .map(|p| p.name.clone())
        .collect();

    for name in &names {
        let Some(global) = store.patterns.iter_mut().find(|p| &p.name == name) else {
            continue;
        };
        global.times_applied += 1;

        let mut seeded = global.clone();
        seeded.origin = PatternOrigin::Seeded;
        seeded.recorded_at = now;
        bs.patterns.push(seeded);
    }

    if !names.is_empty() {
        store.updated_at = now;
        debug!(count = names.len(), "seeded patterns");
    }
    names.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use scf_types::buildstate::{ProjectInfo, ToolInfo};

    fn tool() -> ToolInfo {
        ToolInfo {
            name: "scf".to_string(),
            version: Some("0.1.0".to_string()),
            commit: None,
        }
    }

    fn sample(kind: ProjectKind) -> Buildstate {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
        Buildstate::new(
            tool(),
            ProjectInfo {
                name: "demo".to_string(),
                kind,
                description: None,
                root: "/work/demo".to_string(),
                created_at: now,
            },
            now,
        )
    }

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, h, 0, 0).unwrap()
    }

    #[test]
    fn promote_then_seed_into_new_project() {
        let mut source = sample(ProjectKind::Rust);
        let mut store = PatternStore::new(tool(), t(9));

        crate::add_pattern(&mut source, "thin adapters", None, t(9));
        promote_pattern(&source, &mut store, "thin adapters", t(10)).expect("promote");
        assert_eq!(store.patterns.len(), 1);
        assert_eq!(store.patterns[0].origin, PatternOrigin::Promoted);

        let mut target = sample(ProjectKind::Rust);
        let seeded = seed_patterns(&mut target, &mut store, t(11));
        assert_eq!(seeded, 1);
        assert_eq!(target.patterns[0].origin, PatternOrigin::Seeded);
        assert_eq!(target.patterns[0].name, "thin adapters");
        // Seeding counts as an application on the global side.
        assert_eq!(store.patterns[0].times_applied, 2);
    }

    #[test]
    fn promote_merges_counters_by_name() {
        let mut a = sample(ProjectKind::Rust);
        let mut b = sample(ProjectKind::Node);
        let mut store = PatternStore::new(tool(), t(9));

        crate::add_pattern(&mut a, "thin adapters", None, t(9));
        crate::add_pattern(&mut b, "thin adapters", None, t(9));
        crate::add_pattern(&mut b, "thin adapters", None, t(10)); // times_applied = 2

        promote_pattern(&a, &mut store, "thin adapters", t(11)).expect("promote a");
        promote_pattern(&b, &mut store, "thin adapters", t(12)).expect("promote b");

        assert_eq!(store.patterns.len(), 1);
        assert_eq!(store.patterns[0].times_applied, 3);
        assert!(store.patterns[0].kinds.contains(&ProjectKind::Rust));
        assert!(store.patterns[0].kinds.contains(&ProjectKind::Node));
    }

    #[test]
    fn suggestions_filter_by_kind_and_sort_by_name() {
        let mut rust_proj = sample(ProjectKind::Rust);
        let mut node_proj = sample(ProjectKind::Node);
        let mut store = PatternStore::new(tool(), t(9));

        crate::add_pattern(&mut rust_proj, "zero copy parsing", None, t(9));
        crate::add_pattern(&mut rust_proj, "thin adapters", None, t(9));
        crate::add_pattern(&mut node_proj, "bundle splitting", None, t(9));

        promote_pattern(&rust_proj, &mut store, "zero copy parsing", t(10)).expect("promote");
        promote_pattern(&rust_proj, &mut store, "thin adapters", t(10)).expect("promote");
        promote_pattern(&node_proj, &mut store, "bundle splitting", t(10)).expect("promote");

        let suggested = suggest_patterns(&store, ProjectKind::Rust);
        let names: Vec<&str> = suggested.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["thin adapters", "zero copy parsing"]);
    }

    #[test]
    fn seed_skips_patterns_already_present_locally() {
        let mut target = sample(ProjectKind::Rust);
        let mut store = PatternStore::new(tool(), t(9));

        let mut source = sample(ProjectKind::Rust);
        crate::add_pattern(&mut source, "thin adapters", None, t(9));
        promote_pattern(&source, &mut store, "thin adapters", t(10)).expect("promote");

        crate::add_pattern(&mut target, "thin adapters", None, t(11));
        let seeded = seed_patterns(&mut target, &mut store, t(12));
        assert_eq!(seeded, 0);
        assert_eq!(target.patterns.len(), 1);
    }
}
