use chrono::{TimeZone, Utc};
use scf_types::buildstate::{Buildstate, PatternOrigin, ProjectKind, TaskStatus};
use scf_types::wire::BuildstateV1;

#[test]
fn enums_serialize_snake_case() {
    let open = serde_json::to_value(TaskStatus::Open).expect("serialize");
    let done = serde_json::to_value(TaskStatus::Done).expect("serialize");
    assert_eq!(open, serde_json::json!("open"));
    assert_eq!(done, serde_json::json!("done"));

    let rust = serde_json::to_value(ProjectKind::Rust).expect("serialize");
    let unknown = serde_json::to_value(ProjectKind::Unknown).expect("serialize");
    assert_eq!(rust, serde_json::json!("rust"));
    assert_eq!(unknown, serde_json::json!("unknown"));

    let seeded = serde_json::to_value(PatternOrigin::Seeded).expect("serialize");
    assert_eq!(seeded, serde_json::json!("seeded"));
}

#[test]
fn buildstate_parse_is_tolerant_of_unknown_and_missing_fields() {
    // Minimal document with an extra field a future writer might add.
    let doc = serde_json::json!({
        "schema": "scf.buildstate.v1",
        "tool": { "name": "scf" },
        "project": {
            "name": "demo",
            "root": "/work/demo",
            "created_at": "2026-01-05T09:00:00Z"
        },
        "some_future_section": { "x": 1 }
    });

    let bs: Buildstate = serde_json::from_value(doc).expect("tolerant parse");
    assert_eq!(bs.project.name, "demo");
    assert_eq!(bs.project.kind, ProjectKind::Unknown);
    assert!(bs.tool.version.is_none());
    assert!(bs.tasks.is_empty());
    assert!(bs.sessions.is_empty());
    // Missing integrity falls back to the epoch sentinel.
    assert!(bs.integrity.markdown_sha256.is_none());
}

#[test]
fn buildstate_omits_empty_optional_sections() {
    let now = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
    let bs = Buildstate::new(
        scf_types::buildstate::ToolInfo {
            name: "scf".to_string(),
            version: Some("0.1.0".to_string()),
            commit: None,
        },
        scf_types::buildstate::ProjectInfo {
            name: "demo".to_string(),
            kind: ProjectKind::Rust,
            description: None,
            root: "/work/demo".to_string(),
            created_at: now,
        },
        now,
    );

    let value = serde_json::to_value(&bs).expect("serialize");
    let focus = value.get("focus").expect("focus present");
    assert!(focus.get("current").is_none());
    assert!(focus.get("next_steps").is_none());
    assert!(value["project"].get("description").is_none());
}

#[test]
fn wire_conversion_requires_tool_version() {
    let now = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
    let mut bs = Buildstate::new(
        scf_types::buildstate::ToolInfo {
            name: "scf".to_string(),
            version: Some("0.1.0".to_string()),
            commit: None,
        },
        scf_types::buildstate::ProjectInfo {
            name: "demo".to_string(),
            kind: ProjectKind::Rust,
            description: None,
            root: "/work/demo".to_string(),
            created_at: now,
        },
        now,
    );

    let wire = BuildstateV1::try_from(&bs).expect("convert");
    assert_eq!(wire.tool.version, "0.1.0");

    bs.tool.version = None;
    let err = BuildstateV1::try_from(&bs).expect_err("missing version");
    assert!(err.to_string().contains("missing tool version"));
}

#[test]
fn wire_roundtrip_preserves_sessions() {
    let now = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
    let mut bs = Buildstate::new(
        scf_types::buildstate::ToolInfo {
            name: "scf".to_string(),
            version: Some("0.1.0".to_string()),
            commit: None,
        },
        scf_types::buildstate::ProjectInfo {
            name: "demo".to_string(),
            kind: ProjectKind::Rust,
            description: None,
            root: "/work/demo".to_string(),
            created_at: now,
        },
        now,
    );
    bs.sessions.push(scf_types::buildstate::Session {
        id: uuid::Uuid::new_v4(),
        started_at: now,
        ended_at: None,
        summary: None,
        highlights: vec!["wired up storage".to_string()],
    });

    let wire = BuildstateV1::try_from(&bs).expect("convert");
    let back: Buildstate = wire.into();
    assert_eq!(back.sessions.len(), 1);
    assert_eq!(back.sessions[0].highlights, bs.sessions[0].highlights);
}
