//! Domain types for chart exports.
//!
//! References and records are rebuilt every run; nothing here is persisted
//! except through artifact filenames.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::key::derive_key;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Identifier of a chart row in the authoritative store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChartId(pub u64);

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for ChartId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Key naming an export on disk and in the index.
///
/// Equality is exact; use [`CacheKey::folded`] before comparing keys that
/// came from different sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(pub String);

impl CacheKey {
    /// Lower-cased copy used for index lookups.
    pub fn folded(&self) -> CacheKey {
        CacheKey(self.0.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A resolved chart address: the logical chart plus its presentation variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChartReference {
    /// The reference text exactly as the caller supplied it.
    pub source: String,
    pub slug: String,
    /// Canonical query string including the leading `?`, or empty.
    pub variant: String,
}

impl ChartReference {
    pub fn cache_key(&self) -> CacheKey {
        derive_key(&self.slug, &self.variant)
    }
}

impl fmt::Display for ChartReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.source.fmt(f)
    }
}

/// Metadata for one export file, reconstructed from its filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub key: CacheKey,
    pub filename: String,
    /// Public address of the artifact.
    pub location_uri: String,
    pub version: u64,
    pub width: u32,
    pub height: u32,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(ChartId::from(42).to_string(), "42");
        assert_eq!(CacheKey::from("soil-lifespans").to_string(), "soil-lifespans");
    }

    #[test]
    fn folded_key_is_lowercase() {
        let key = CacheKey::from("Soil-Lifespans-ABC");
        assert_eq!(key.folded(), CacheKey::from("soil-lifespans-abc"));
    }

    #[test]
    fn reference_displays_source_text() {
        let reference = ChartReference {
            source: "https://example.org/grapher/x?tab=map".to_string(),
            slug: "x".to_string(),
            variant: "?tab=map".to_string(),
        };
        assert_eq!(reference.to_string(), "https://example.org/grapher/x?tab=map");
    }
}
