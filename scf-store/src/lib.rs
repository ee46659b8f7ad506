//! Buildstate persistence.
//!
//! Responsibilities:
//! - Load `buildstate.json` tolerantly, with a typed error taxonomy.
//! - Save atomically (temp file + rename) with an optional backup copy.
//! - Keep `buildstate.md` in step via a recorded sha256.
//! - Discover buildstates across a directory of projects.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use fs_err as fs;
use scf_types::buildstate::Buildstate;
use scf_types::wire::BuildstateV1;
use sha2::{Digest, Sha256};
use std::io::Write;
use thiserror::Error;
use tracing::debug;

mod discover;

pub use discover::{DiscoveredBuildstate, discover_buildstates};

pub const BUILDSTATE_JSON: &str = "buildstate.json";
pub const BUILDSTATE_MD: &str = "buildstate.md";
pub const BACKUP_SUFFIX: &str = ".scf.bak";

#[derive(Debug, Error, Clone)]
pub enum StoreError {
    #[error("no buildstate at {path}")]
    NotFound { path: Utf8PathBuf },

    #[error("io error at {path}: {message}")]
    Io { path: Utf8PathBuf, message: String },

    #[error("json parse error at {path}: {message}")]
    Json { path: Utf8PathBuf, message: String },
}

pub fn buildstate_path(dir: &Utf8Path) -> Utf8PathBuf {
    dir.join(BUILDSTATE_JSON)
}

pub fn markdown_path(dir: &Utf8Path) -> Utf8PathBuf {
    dir.join(BUILDSTATE_MD)
}

/// Load `<dir>/buildstate.json`. Unknown fields are ignored by the types
/// layer; missing optional sections come back defaulted.
pub fn load_buildstate(dir: &Utf8Path) -> Result<Buildstate, StoreError> {
    let path = buildstate_path(dir);
    if !path.exists() {
        return Err(StoreError::NotFound { path });
    }

    let contents = fs::read_to_string(&path).map_err(|e| StoreError::Io {
        path: path.clone(),
        message: e.to_string(),
    })?;

    serde_json::from_str(&contents).map_err(|e| StoreError::Json {
        path,
        message: e.to_string(),
    })
}

#[derive(Debug, Clone)]
pub struct SaveOptions {
    /// Copy the previous buildstate.json to buildstate.json.scf.bak first.
    pub backup: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self { backup: true }
    }
}

/// Save `<dir>/buildstate.json` atomically, bumping `integrity.updated_at`.
///
/// The write goes through the schema-exact wire model, so a buildstate
/// without a tool version is rejected before anything touches disk.
pub fn save_buildstate(
    dir: &Utf8Path,
    bs: &mut Buildstate,
    now: DateTime<Utc>,
    opts: &SaveOptions,
) -> anyhow::Result<Utf8PathBuf> {
    bs.integrity.updated_at = now;

    let wire = BuildstateV1::try_from(&*bs).context("buildstate not wire-complete")?;
    let json = serde_json::to_string_pretty(&wire).context("serialize buildstate")?;

    let path = buildstate_path(dir);
    if opts.backup && path.exists() {
        let backup = Utf8PathBuf::from(format!("{}{}", path, BACKUP_SUFFIX));
        fs::copy(&path, &backup).with_context(|| format!("backup {}", backup))?;
        debug!(path = %backup, "wrote backup");
    }

    write_atomic(&path, json.as_bytes())?;
    debug!(path = %path, "saved buildstate");
    Ok(path)
}

/// Write `<dir>/buildstate.md` and record its sha256 in the buildstate.
///
/// Callers must save the buildstate afterwards or the recorded hash is lost.
pub fn write_markdown(
    dir: &Utf8Path,
    bs: &mut Buildstate,
    rendered: &str,
) -> anyhow::Result<Utf8PathBuf> {
    let path = markdown_path(dir);
    write_atomic(&path, rendered.as_bytes())?;
    bs.integrity.markdown_sha256 = Some(sha256_hex(rendered.as_bytes()));
    debug!(path = %path, "rendered markdown");
    Ok(path)
}

/// How `<dir>/buildstate.md` compares to what scf last rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkdownState {
    /// On-disk markdown matches the recorded hash.
    Clean,
    /// A hash is recorded but the file is gone.
    Missing,
    /// The file exists but no longer matches the recorded hash (hand edit).
    Drifted,
    /// No hash recorded yet (file may or may not exist).
    Untracked,
}

impl MarkdownState {
    pub fn label(&self) -> &'static str {
        match self {
            MarkdownState::Clean => "clean",
            MarkdownState::Missing => "missing",
            MarkdownState::Drifted => "drifted",
            MarkdownState::Untracked => "untracked",
        }
    }
}

pub fn markdown_drift(dir: &Utf8Path, bs: &Buildstate) -> anyhow::Result<MarkdownState> {
    let Some(recorded) = &bs.integrity.markdown_sha256 else {
        return Ok(MarkdownState::Untracked);
    };

    let path = markdown_path(dir);
    if !path.exists() {
        return Ok(MarkdownState::Missing);
    }

    let bytes = fs::read(&path).with_context(|| format!("read {}", path))?;
    if &sha256_hex(&bytes) == recorded {
        Ok(MarkdownState::Clean)
    } else {
        Ok(MarkdownState::Drifted)
    }
}

/// Load a global pattern store, or start a fresh one if the file does not
/// exist yet.
pub fn load_or_new_pattern_store(
    path: &Utf8Path,
    tool: scf_types::buildstate::ToolInfo,
    now: DateTime<Utc>,
) -> Result<scf_types::patterns::PatternStore, StoreError> {
    if !path.exists() {
        return Ok(scf_types::patterns::PatternStore::new(tool, now));
    }

    let contents = fs::read_to_string(path).map_err(|e| StoreError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    serde_json::from_str(&contents).map_err(|e| StoreError::Json {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

pub fn save_pattern_store(
    path: &Utf8Path,
    store: &mut scf_types::patterns::PatternStore,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    store.updated_at = now;
    let wire = scf_types::wire::PatternStoreV1::try_from(&*store)
        .context("pattern store not wire-complete")?;
    let json = serde_json::to_string_pretty(&wire).context("serialize pattern store")?;
    write_atomic(path, json.as_bytes())?;
    debug!(path = %path, "saved pattern store");
    Ok(())
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn write_atomic(path: &Utf8Path, bytes: &[u8]) -> anyhow::Result<()> {
    let dir = path
        .parent()
        .with_context(|| format!("no parent directory for {}", path))?;
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir))?;

    // Temp file in the same directory so the rename stays on one filesystem.
    let mut tmp = tempfile::NamedTempFile::new_in(dir.as_std_path())
        .with_context(|| format!("create temp file in {}", dir))?;
    tmp.write_all(bytes)
        .with_context(|| format!("write temp file for {}", path))?;
    tmp.persist(path.as_std_path())
        .with_context(|| format!("persist {}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use scf_types::buildstate::{ProjectInfo, ProjectKind, ToolInfo};

    fn sample(now: DateTime<Utc>) -> Buildstate {
        Buildstate::new(
            ToolInfo {
                name: "scf".to_string(),
                version: Some("0.1.0".to_string()),
                commit: None,
            },
            ProjectInfo {
                name: "demo".to_string(),
                kind: ProjectKind::Rust,
                description: None,
                root: "/work/demo".to_string(),
                created_at: now,
            },
            now,
        )
    }

    fn temp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
        let td = tempfile::tempdir().expect("tempdir");
        let dir = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).expect("utf8");
        (td, dir)
    }

    #[test]
    fn load_missing_is_not_found() {
        let (_td, dir) = temp_dir();
        let err = load_buildstate(&dir).expect_err("missing");
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn load_garbage_is_json_error() {
        let (_td, dir) = temp_dir();
        fs::write(buildstate_path(&dir), "not json").expect("write");
        let err = load_buildstate(&dir).expect_err("garbage");
        assert!(matches!(err, StoreError::Json { .. }));
    }

    #[test]
    fn save_then_load_roundtrips_and_bumps_updated_at() {
        let (_td, dir) = temp_dir();
        let t0 = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2026, 1, 6, 9, 0, 0).unwrap();

        let mut bs = sample(t0);
        save_buildstate(&dir, &mut bs, t1, &SaveOptions::default()).expect("save");
        assert_eq!(bs.integrity.updated_at, t1);

        let loaded = load_buildstate(&dir).expect("load");
        assert_eq!(loaded.project.name, "demo");
        assert_eq!(loaded.integrity.updated_at, t1);
    }

    #[test]
    fn save_without_tool_version_fails_before_writing() {
        let (_td, dir) = temp_dir();
        let t0 = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
        let mut bs = sample(t0);
        bs.tool.version = None;

        let err = save_buildstate(&dir, &mut bs, t0, &SaveOptions::default())
            .expect_err("wire-incomplete");
        assert!(err.to_string().contains("wire-complete"));
        assert!(!buildstate_path(&dir).exists());
    }

    #[test]
    fn second_save_leaves_backup() {
        let (_td, dir) = temp_dir();
        let t0 = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
        let mut bs = sample(t0);

        save_buildstate(&dir, &mut bs, t0, &SaveOptions::default()).expect("first save");
        bs.focus.current = Some("storage layer".to_string());
        save_buildstate(&dir, &mut bs, t0, &SaveOptions::default()).expect("second save");

        let backup = Utf8PathBuf::from(format!("{}{}", buildstate_path(&dir), BACKUP_SUFFIX));
        assert!(backup.exists());

        // Backup holds the pre-edit state.
        let prev: Buildstate =
            serde_json::from_str(&fs::read_to_string(&backup).expect("read backup"))
                .expect("parse backup");
        assert!(prev.focus.current.is_none());
    }

    #[test]
    fn markdown_drift_states() {
        let (_td, dir) = temp_dir();
        let t0 = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
        let mut bs = sample(t0);

        assert_eq!(
            markdown_drift(&dir, &bs).expect("drift"),
            MarkdownState::Untracked
        );

        write_markdown(&dir, &mut bs, "# demo\n").expect("write md");
        assert_eq!(
            markdown_drift(&dir, &bs).expect("drift"),
            MarkdownState::Clean
        );

        fs::write(markdown_path(&dir), "# demo\nhand edit\n").expect("hand edit");
        assert_eq!(
            markdown_drift(&dir, &bs).expect("drift"),
            MarkdownState::Drifted
        );

        fs::remove_file(markdown_path(&dir)).expect("remove");
        assert_eq!(
            markdown_drift(&dir, &bs).expect("drift"),
            MarkdownState::Missing
        );
    }
}
