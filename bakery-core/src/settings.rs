//! Bakery settings.
//!
//! # Storage layout
//!
//! ```text
//! ~/.bakery/
//!   settings.yaml   (written by `bakery init`)
//! ```
//!
//! # API pattern
//!
//! Every filesystem function has two forms:
//! - `fn_at(home: &Path, …)` — explicit home; used in tests with `TempDir`
//! - `fn(…)` — derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, SettingsError};

/// Subdirectory of the baked site holding chart exports.
pub const EXPORTS_DIR: &str = "exports";

/// References baked per call to the bake collaborator.
pub const DEFAULT_BATCH_SIZE: usize = 5;

pub const DEFAULT_ARTIFACT_EXTENSION: &str = "svg";

/// External program invoked to bake one batch of references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BakerCommand {
    pub program: PathBuf,
    /// Arguments placed before the bakery-supplied ones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

/// Run configuration for indexing and baking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Root of the baked site; exports live in `<baked_site_dir>/exports`.
    pub baked_site_dir: PathBuf,
    /// Public base address of the baked site.
    pub baked_base_url: String,
    #[serde(default = "default_extension")]
    pub artifact_extension: String,
    #[serde(default)]
    pub optimize_svg_exports: bool,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Chart catalog consulted for ids and versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baker: Option<BakerCommand>,
}

fn default_extension() -> String {
    DEFAULT_ARTIFACT_EXTENSION.to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl Settings {
    pub fn new(baked_site_dir: impl Into<PathBuf>, baked_base_url: impl Into<String>) -> Self {
        Self {
            baked_site_dir: baked_site_dir.into(),
            baked_base_url: baked_base_url.into(),
            artifact_extension: default_extension(),
            optimize_svg_exports: false,
            batch_size: DEFAULT_BATCH_SIZE,
            catalog: None,
            baker: None,
        }
    }

    /// `<baked_site_dir>/exports`
    pub fn exports_dir(&self) -> PathBuf {
        self.baked_site_dir.join(EXPORTS_DIR)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.batch_size == 0 {
            return Err(SettingsError::Invalid("batch_size must be at least 1".into()));
        }
        if self.baked_base_url.trim().is_empty() {
            return Err(SettingsError::Invalid("baked_base_url is empty".into()));
        }
        if self.artifact_extension.trim_start_matches('.').is_empty() {
            return Err(SettingsError::Invalid("artifact_extension is empty".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<home>/.bakery/settings.yaml` — pure, no I/O.
pub fn settings_path_at(home: &Path) -> PathBuf {
    home.join(".bakery").join("settings.yaml")
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load settings from `<home>/.bakery/settings.yaml`.
///
/// Returns `SettingsError::NotFound` if absent,
/// `SettingsError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(home: &Path) -> Result<Settings, SettingsError> {
    let path = settings_path_at(home);
    if !path.exists() {
        return Err(SettingsError::NotFound { path });
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| SettingsError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Settings, SettingsError> {
    load_at(&home()?)
}

/// Save settings atomically: write `<path>.tmp`, then rename over `<path>`.
pub fn save_at(home: &Path, settings: &Settings) -> Result<PathBuf, SettingsError> {
    let path = settings_path_at(home);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    let yaml = serde_yaml::to_string(settings)?;
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(&path, e));
    }
    Ok(path)
}

/// `save_at` convenience wrapper.
pub fn save(settings: &Settings) -> Result<PathBuf, SettingsError> {
    save_at(&home()?, settings)
}

fn home() -> Result<PathBuf, SettingsError> {
    dirs::home_dir().ok_or(SettingsError::HomeNotFound)
}
