//! Export index — one latest-version record per cache key.
//!
//! Built from a single directory listing of the artifact store. Filenames
//! follow `<key>_v<version>_<width>x<height>.<ext>` and are parsed
//! case-insensitively. Files that do not parse are skipped with a warning
//! and listed in [`ExportIndex::skipped`]; they never receive default
//! values.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use bakery_core::{identity, settings::EXPORTS_DIR, CacheKey, ExportRecord};

use crate::error::{io_err, FilenameError, SyncError};

/// Structured form of an artifact filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFilename {
    /// Lower-cased key segment.
    pub key: CacheKey,
    pub version: u64,
    pub width: u32,
    pub height: u32,
}

/// A file seen in the store but left out of the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedExport {
    pub filename: String,
    pub reason: String,
}

/// Latest export per cache key, rebuilt every run.
#[derive(Debug, Clone, Default)]
pub struct ExportIndex {
    records: BTreeMap<CacheKey, ExportRecord>,
    skipped: Vec<SkippedExport>,
}

impl ExportIndex {
    /// Fold `records` into an index using the same latest-wins rule as
    /// [`build_index`].
    pub fn from_records(records: impl IntoIterator<Item = ExportRecord>) -> Self {
        let mut index = Self::default();
        for record in records {
            index.insert(record);
        }
        index
    }

    /// Look up by key, ignoring case.
    pub fn get(&self, key: &CacheKey) -> Option<&ExportRecord> {
        self.records.get(&key.folded())
    }

    /// Look up the export for a raw chart reference.
    ///
    /// Returns `None` for references that do not resolve.
    pub fn get_for_reference(&self, reference: &str) -> Option<&ExportRecord> {
        let resolved = identity::resolve(reference).ok()?;
        self.get(&resolved.cache_key())
    }

    /// Records ordered by key.
    pub fn records(&self) -> impl Iterator<Item = &ExportRecord> {
        self.records.values()
    }

    pub fn skipped(&self) -> &[SkippedExport] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keep whichever record has the higher version; ties keep the existing one.
    fn insert(&mut self, record: ExportRecord) {
        let key = record.key.folded();
        match self.records.get(&key) {
            Some(current) if current.version >= record.version => {
                tracing::debug!(
                    "ignoring {} (v{} <= indexed v{})",
                    record.filename,
                    record.version,
                    current.version
                );
            }
            _ => {
                self.records.insert(key, record);
            }
        }
    }
}

/// Scan `store_dir` and index every `*.<extension>` file in it.
///
/// Files are visited in sorted filename order so that ties resolve the same
/// way on every run. An unreadable store directory fails the whole build.
pub fn build_index(
    store_dir: &Path,
    public_base: &str,
    extension: &str,
) -> Result<ExportIndex, SyncError> {
    let extension = extension.trim_start_matches('.').to_lowercase();
    let mut filenames = Vec::new();
    for entry in std::fs::read_dir(store_dir).map_err(|e| io_err(store_dir, e))? {
        let entry = entry.map_err(|e| io_err(store_dir, e))?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            tracing::warn!("skipping non UTF-8 filename in {}", store_dir.display());
            continue;
        };
        if has_extension(&name, &extension) {
            filenames.push(name);
        }
    }
    filenames.sort();

    let mut index = ExportIndex::default();
    for filename in filenames {
        match parse_export_filename(&filename, &extension) {
            Ok(parsed) => index.insert(ExportRecord {
                key: parsed.key,
                location_uri: public_address(public_base, &filename),
                filename,
                version: parsed.version,
                width: parsed.width,
                height: parsed.height,
            }),
            Err(reason) => {
                tracing::warn!("skipping malformed export {filename}: {reason}");
                index.skipped.push(SkippedExport {
                    filename,
                    reason: reason.to_string(),
                });
            }
        }
    }

    tracing::debug!(
        "indexed {} export key(s) from {} ({} skipped)",
        index.len(),
        store_dir.display(),
        index.skipped.len()
    );
    Ok(index)
}

/// Parse `<key>_v<version>_<width>x<height>.<extension>`.
pub fn parse_export_filename(
    filename: &str,
    extension: &str,
) -> Result<ExportFilename, FilenameError> {
    let lower = filename.to_lowercase();
    let extension = extension.trim_start_matches('.').to_lowercase();
    let stem = lower
        .strip_suffix(extension.as_str())
        .and_then(|rest| rest.strip_suffix('.'))
        .ok_or_else(|| FilenameError::WrongExtension {
            expected: extension.clone(),
        })?;

    let segments: Vec<&str> = stem.split('_').collect();
    let [key, version_tag, dims_tag] = segments.as_slice() else {
        return Err(FilenameError::SegmentCount {
            found: segments.len(),
        });
    };
    if key.is_empty() {
        return Err(FilenameError::EmptyKey);
    }

    let version = version_tag
        .strip_prefix('v')
        .filter(|digits| is_decimal(digits))
        .and_then(|digits| digits.parse::<u64>().ok())
        .ok_or_else(|| FilenameError::BadVersion {
            tag: version_tag.to_string(),
        })?;

    let bad_dims = || FilenameError::BadDimensions {
        tag: dims_tag.to_string(),
    };
    let (width, height) = dims_tag.split_once('x').ok_or_else(bad_dims)?;
    let width = parse_dimension(width).ok_or_else(bad_dims)?;
    let height = parse_dimension(height).ok_or_else(bad_dims)?;

    Ok(ExportFilename {
        key: CacheKey::from(*key),
        version,
        width,
        height,
    })
}

/// `<public_base>/exports/<filename>`
pub fn public_address(public_base: &str, filename: &str) -> String {
    format!(
        "{}/{EXPORTS_DIR}/{filename}",
        public_base.trim_end_matches('/')
    )
}

fn has_extension(filename: &str, extension: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

fn is_decimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_dimension(s: &str) -> Option<u32> {
    if !is_decimal(s) {
        return None;
    }
    s.parse::<u32>().ok().filter(|&n| n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, version: u64) -> ExportRecord {
        let filename = format!("{key}_v{version}_850x600.svg");
        ExportRecord {
            key: CacheKey::from(key),
            location_uri: public_address("https://example.org", &filename),
            filename,
            version,
            width: 850,
            height: 600,
        }
    }

    #[test]
    fn parses_well_formed_name() {
        let parsed = parse_export_filename("soil-lifespans_v3_850x600.svg", "svg").unwrap();
        assert_eq!(parsed.key, CacheKey::from("soil-lifespans"));
        assert_eq!(parsed.version, 3);
        assert_eq!((parsed.width, parsed.height), (850, 600));
    }

    #[test]
    fn parsing_ignores_case() {
        let parsed = parse_export_filename("Soil-Lifespans_V3_850X600.SVG", "svg").unwrap();
        assert_eq!(parsed.key, CacheKey::from("soil-lifespans"));
        assert_eq!(parsed.version, 3);
    }

    #[test]
    fn rejects_signed_or_empty_numbers() {
        assert!(matches!(
            parse_export_filename("a_v+3_850x600.svg", "svg"),
            Err(FilenameError::BadVersion { .. })
        ));
        assert!(matches!(
            parse_export_filename("a_v_850x600.svg", "svg"),
            Err(FilenameError::BadVersion { .. })
        ));
        assert!(matches!(
            parse_export_filename("a_v3_0x600.svg", "svg"),
            Err(FilenameError::BadDimensions { .. })
        ));
    }

    #[test]
    fn from_records_keeps_highest_version() {
        let index = ExportIndex::from_records([record("a", 2), record("a", 5), record("a", 4)]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(&CacheKey::from("A")).unwrap().version, 5);
    }

    #[test]
    fn tie_keeps_first_seen() {
        let mut first = record("a", 2);
        first.width = 100;
        let index = ExportIndex::from_records([first, record("a", 2)]);
        assert_eq!(index.get(&CacheKey::from("a")).unwrap().width, 100);
    }

    #[test]
    fn address_trims_trailing_slash() {
        assert_eq!(
            public_address("https://example.org/", "x_v1_1x1.svg"),
            "https://example.org/exports/x_v1_1x1.svg"
        );
    }
}
