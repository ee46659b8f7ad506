//! Project kind detection for `scf init`.
//!
//! Probes run in a fixed priority order so detection is deterministic for
//! a given directory. Name extraction is best effort; parse failures fall
//! back to the directory name rather than failing init.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use scf_types::buildstate::ProjectKind;
use tracing::debug;

/// Read-only project access.
///
/// scf-detect uses this so it can be tested against an in-memory
/// implementation.
pub trait ProjectView {
    fn root(&self) -> &Utf8Path;

    fn read_to_string(&self, rel: &Utf8Path) -> anyhow::Result<String>;

    fn exists(&self, rel: &Utf8Path) -> bool;
}

/// File-system backed `ProjectView`.
#[derive(Debug, Clone)]
pub struct FsProjectView {
    root: Utf8PathBuf,
}

impl FsProjectView {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    fn abs(&self, rel: &Utf8Path) -> Utf8PathBuf {
        if rel.is_absolute() {
            rel.to_path_buf()
        } else {
            self.root.join(rel)
        }
    }
}

impl ProjectView for FsProjectView {
    fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn read_to_string(&self, rel: &Utf8Path) -> anyhow::Result<String> {
        let abs = self.abs(rel);
        fs::read_to_string(&abs).with_context(|| format!("read {}", abs))
    }

    fn exists(&self, rel: &Utf8Path) -> bool {
        self.abs(rel).exists()
    }
}

#[derive(Debug, Clone)]
pub struct Detection {
    pub kind: ProjectKind,
    pub name: String,
}

/// Detect project kind and name.
///
/// Probe order: Cargo.toml, package.json, pyproject.toml / setup.py,
/// go.mod. First hit wins.
pub fn detect_project(view: &dyn ProjectView) -> Detection {
    let fallback_name = view
        .root()
        .file_name()
        .unwrap_or("project")
        .to_string();

    for probe in PROBES {
        if let Some(detection) = (probe.run)(view, &fallback_name) {
            debug!(kind = detection.kind.label(), name = %detection.name, "detected project");
            return detection;
        }
    }

    Detection {
        kind: ProjectKind::Unknown,
        name: fallback_name,
    }
}

struct Probe {
    run: fn(&dyn ProjectView, &str) -> Option<Detection>,
}

const PROBES: &[Probe] = &[
    Probe { run: probe_rust },
    Probe { run: probe_node },
    Probe { run: probe_python },
    Probe { run: probe_go },
];

fn probe_rust(view: &dyn ProjectView, fallback: &str) -> Option<Detection> {
    let manifest = Utf8Path::new("Cargo.toml");
    if !view.exists(manifest) {
        return None;
    }

    let name = view
        .read_to_string(manifest)
        .ok()
        .and_then(|s| s.parse::<toml::Table>().ok())
        .and_then(|v| {
            v.get("package")?
                .get("name")?
                .as_str()
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| fallback.to_string());

    Some(Detection {
        kind: ProjectKind::Rust,
        name,
    })
}

fn probe_node(view: &dyn ProjectView, fallback: &str) -> Option<Detection> {
    let manifest = Utf8Path::new("package.json");
    if !view.exists(manifest) {
        return None;
    }

    let name = view
        .read_to_string(manifest)
        .ok()
        .and_then(|s| serde_json::from_str::<serde_json::Value>(&s).ok())
        .and_then(|v| v.get("name")?.as_str().map(|s| s.to_string()))
        .unwrap_or_else(|| fallback.to_string());

    Some(Detection {
        kind: ProjectKind::Node,
        name,
    })
}

fn probe_python(view: &dyn ProjectView, fallback: &str) -> Option<Detection> {
    let pyproject = Utf8Path::new("pyproject.toml");
    if view.exists(pyproject) {
        let name = view
            .read_to_string(pyproject)
            .ok()
            .and_then(|s| s.parse::<toml::Table>().ok())
            .and_then(|v| {
                v.get("project")?
                    .get("name")?
                    .as_str()
                    .map(|s| s.to_string())
            })
            .unwrap_or_else(|| fallback.to_string());

        return Some(Detection {
            kind: ProjectKind::Python,
            name,
        });
    }

    if view.exists(Utf8Path::new("setup.py")) {
        return Some(Detection {
            kind: ProjectKind::Python,
            name: fallback.to_string(),
        });
    }

    None
}

fn probe_go(view: &dyn ProjectView, fallback: &str) -> Option<Detection> {
    let manifest = Utf8Path::new("go.mod");
    if !view.exists(manifest) {
        return None;
    }

    let name = view
        .read_to_string(manifest)
        .ok()
        .and_then(|s| {
            s.lines().find_map(|line| {
                let module = line.trim().strip_prefix("module ")?;
                module.trim().rsplit('/').next().map(|s| s.to_string())
            })
        })
        .unwrap_or_else(|| fallback.to_string());

    Some(Detection {
        kind: ProjectKind::Go,
        name,
    })
}
