//! Configuration file loading for scf.
//!
//! Discovers and loads `scf.toml` from the project root. CLI flags take
//! precedence over config file settings.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use scf_core::RetentionCaps;
use scf_render::RenderOptions;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "scf.toml";

/// Top-level configuration from scf.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScfConfig {
    pub retention: RetentionConfig,
    pub render: RenderConfig,
    pub init: InitConfig,
    pub backups: BackupsConfig,

    /// Days without an update before a buildstate counts as stale.
    pub staleness_days: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Keep at most this many ended sessions.
    pub max_sessions: Option<u64>,

    /// Keep at most this many done tasks.
    pub max_done_tasks: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Recent sessions shown in buildstate.md.
    pub recent_sessions: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { recent_sessions: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InitConfig {
    /// Seed patterns from the global store at init time.
    pub seed_patterns: bool,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            seed_patterns: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackupsConfig {
    /// Whether to keep a backup copy before overwriting buildstate.json.
    pub enabled: bool,
}

impl Default for BackupsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

const DEFAULT_STALENESS_DAYS: u32 = 14;

/// Discover the scf.toml config file in the project root.
pub fn discover_config(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<ScfConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<ScfConfig> {
    let config: ScfConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from the project root, or return default if not found.
pub fn load_or_default(root: &Utf8Path) -> anyhow::Result<ScfConfig> {
    match discover_config(root) {
        Some(path) => load_config(&path),
        None => Ok(ScfConfig::default()),
    }
}

/// Merged configuration combining config file and CLI arguments.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub caps: RetentionCaps,
    pub render: RenderOptions,
    pub seed_patterns: bool,
    pub staleness_days: u32,
    pub backup: bool,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: ScfConfig,
}

impl ConfigMerger {
    pub fn new(config: ScfConfig) -> Self {
        Self { config }
    }

    /// Merge with init command CLI arguments.
    ///
    /// `--no-seed` overrides the config file when set.
    pub fn merge_init_args(self, cli_no_seed: bool) -> MergedConfig {
        let mut merged = self.merged();
        if cli_no_seed {
            merged.seed_patterns = false;
        }
        merged
    }

    pub fn merged(self) -> MergedConfig {
        MergedConfig {
            caps: RetentionCaps {
                max_sessions: self.config.retention.max_sessions,
                max_done_tasks: self.config.retention.max_done_tasks,
            },
            render: RenderOptions {
                recent_sessions: self.config.render.recent_sessions,
            },
            seed_patterns: self.config.init.seed_patterns,
            staleness_days: self.config.staleness_days.unwrap_or(DEFAULT_STALENESS_DAYS),
            backup: self.config.backups.enabled,
        }
    }
}
