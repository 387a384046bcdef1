//! Version oracle — the authoritative source of chart ids and versions.
//!
//! [`VersionOracle`] is the seam to the chart store. [`MemoryOracle`] holds
//! the answers in maps; [`CatalogOracle`] fills one from a YAML or JSON
//! catalog file:
//!
//! ```yaml
//! charts:
//!   - slug: soil-lifespans
//!     id: 42
//!     version: 3
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use bakery_core::ChartId;

use crate::error::OracleError;

/// Read-only queries against the authoritative chart store.
pub trait VersionOracle {
    /// Every known slug with its chart id.
    fn map_slugs_to_ids(&self) -> Result<HashMap<String, ChartId>, OracleError>;

    /// Current version of a chart; `None` when the store has no version row.
    fn get_version(&self, id: ChartId) -> Result<Option<u64>, OracleError>;
}

/// In-memory oracle.
#[derive(Debug, Clone, Default)]
pub struct MemoryOracle {
    slugs: HashMap<String, ChartId>,
    versions: HashMap<ChartId, u64>,
}

impl MemoryOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chart with a known version.
    pub fn with_chart(mut self, slug: &str, id: u64, version: u64) -> Self {
        let id = ChartId(id);
        self.slugs.insert(slug.to_string(), id);
        self.versions.insert(id, version);
        self
    }

    /// Register a slug whose chart has no version row.
    pub fn with_slug(mut self, slug: &str, id: u64) -> Self {
        self.slugs.insert(slug.to_string(), ChartId(id));
        self
    }

    pub fn set_version(&mut self, id: u64, version: u64) {
        self.versions.insert(ChartId(id), version);
    }
}

impl VersionOracle for MemoryOracle {
    fn map_slugs_to_ids(&self) -> Result<HashMap<String, ChartId>, OracleError> {
        Ok(self.slugs.clone())
    }

    fn get_version(&self, id: ChartId) -> Result<Option<u64>, OracleError> {
        Ok(self.versions.get(&id).copied())
    }
}

/// One row of a catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub slug: String,
    pub id: ChartId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

/// On-disk catalog payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub charts: Vec<CatalogEntry>,
}

/// Oracle backed by a catalog file, read once at load time.
#[derive(Debug, Clone)]
pub struct CatalogOracle {
    path: PathBuf,
    inner: MemoryOracle,
}

impl CatalogOracle {
    /// Load a catalog; `.json` files are read as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self, OracleError> {
        let contents = std::fs::read_to_string(path).map_err(|source| OracleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let catalog: Catalog = if is_json {
            serde_json::from_str(&contents).map_err(|e| parse_err(path, e))?
        } else {
            serde_yaml::from_str(&contents).map_err(|e| parse_err(path, e))?
        };
        Ok(Self::from_catalog(path, catalog))
    }

    fn from_catalog(path: &Path, catalog: Catalog) -> Self {
        let mut inner = MemoryOracle::new();
        for entry in catalog.charts {
            if inner.slugs.contains_key(&entry.slug) {
                tracing::warn!(
                    "catalog {} lists slug {} twice; keeping the first entry",
                    path.display(),
                    entry.slug
                );
                continue;
            }
            inner = match entry.version {
                Some(version) => inner.with_chart(&entry.slug, entry.id.0, version),
                None => inner.with_slug(&entry.slug, entry.id.0),
            };
        }
        Self {
            path: path.to_path_buf(),
            inner,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VersionOracle for CatalogOracle {
    fn map_slugs_to_ids(&self) -> Result<HashMap<String, ChartId>, OracleError> {
        self.inner.map_slugs_to_ids()
    }

    fn get_version(&self, id: ChartId) -> Result<Option<u64>, OracleError> {
        self.inner.get_version(id)
    }
}

fn parse_err(path: &Path, err: impl std::fmt::Display) -> OracleError {
    OracleError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
