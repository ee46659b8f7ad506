use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use glob::glob;
use scf_types::buildstate::Buildstate;
use tracing::debug;

use crate::{StoreError, load_buildstate};

#[derive(Debug, Clone)]
pub struct DiscoveredBuildstate {
    pub path: Utf8PathBuf,
    /// Directory name holding the buildstate (best effort).
    pub project_dir: String,
    pub buildstate: Result<Buildstate, StoreError>,
}

/// Scan `<root>/buildstate.json` and `<root>/*/buildstate.json`.
///
/// Unparseable buildstates are reported per entry instead of failing the
/// whole scan. Order is deterministic (path-sorted).
pub fn discover_buildstates(root: &Utf8Path) -> anyhow::Result<Vec<DiscoveredBuildstate>> {
    let mut dirs: Vec<Utf8PathBuf> = Vec::new();

    if crate::buildstate_path(root).exists() {
        dirs.push(root.to_path_buf());
    }

    let pattern = root.join("*").join(crate::BUILDSTATE_JSON);
    debug!(pattern = %pattern, "scanning for buildstates");

    for entry in glob(pattern.as_str()).context("glob */buildstate.json")? {
        let path = entry
            .map_err(|e| anyhow::anyhow!("glob error: {e}"))?
            .to_string_lossy()
            .to_string();
        let utf8_path = Utf8PathBuf::from(path);
        if let Some(parent) = utf8_path.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    let mut out: Vec<DiscoveredBuildstate> = dirs
        .into_iter()
        .map(|dir| {
            let project_dir = dir.file_name().unwrap_or("unknown").to_string();
            DiscoveredBuildstate {
                path: crate::buildstate_path(&dir),
                project_dir,
                buildstate: load_buildstate(&dir),
            }
        })
        .collect();

    out.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(out)
}
