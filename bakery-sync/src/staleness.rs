//! Staleness resolution against the export index and the version oracle.
//!
//! Verdict precedence for each reference:
//! 1. `InvalidReference` (no slug could be parsed)
//! 2. `Duplicate` (same cache key as an earlier reference in the input)
//! 3. `NeverBaked` (no export indexed for the key; the oracle is not asked)
//! 4. `UnknownSlug` (oracle has no chart id for the slug)
//! 5. `MissingVersion` (oracle has the id but no version)
//! 6. `Outdated` / `Current` (authoritative vs indexed version)
//!
//! Slugs are matched against the oracle case-insensitively, the same way
//! cache keys are matched against the index.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use bakery_core::{identity, CacheKey, ChartId, ChartReference};

use crate::error::SyncError;
use crate::export_index::ExportIndex;
use crate::oracle::VersionOracle;

/// Freshness of one reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Freshness {
    NeverBaked,
    Outdated { indexed: u64, current: u64 },
    Current { version: u64 },
    UnknownSlug,
    MissingVersion { chart_id: ChartId },
    InvalidReference { reason: String },
    Duplicate,
}

impl Freshness {
    /// Whether this verdict puts the reference in the bake queue.
    pub fn needs_bake(&self) -> bool {
        matches!(self, Freshness::NeverBaked | Freshness::Outdated { .. })
    }
}

/// Verdict for one input reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assessment {
    /// Reference text as supplied.
    pub reference: String,
    #[serde(skip)]
    pub resolved: Option<ChartReference>,
    pub key: Option<CacheKey>,
    pub freshness: Freshness,
}

/// Assess every reference, in input order.
///
/// Only oracle transport failures are returned as errors; everything else
/// becomes a verdict.
pub fn assess<S: AsRef<str>>(
    references: &[S],
    index: &ExportIndex,
    oracle: &dyn VersionOracle,
) -> Result<Vec<Assessment>, SyncError> {
    let mut slug_ids: Option<HashMap<String, ChartId>> = None;
    let mut seen = HashSet::new();
    let mut assessments = Vec::with_capacity(references.len());

    for reference in references {
        let text = reference.as_ref();
        let resolved = match identity::resolve(text) {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::warn!("{err}");
                assessments.push(Assessment {
                    reference: text.to_string(),
                    resolved: None,
                    key: None,
                    freshness: Freshness::InvalidReference {
                        reason: err.to_string(),
                    },
                });
                continue;
            }
        };

        let key = resolved.cache_key();
        let freshness = if !seen.insert(key.folded()) {
            tracing::debug!("{text} repeats key {key}; assessed once");
            Freshness::Duplicate
        } else {
            match index.get(&key) {
                None => Freshness::NeverBaked,
                Some(current) => {
                    let ids = match slug_ids {
                        Some(ref ids) => ids,
                        None => &*slug_ids.insert(fold_slugs(oracle.map_slugs_to_ids()?)),
                    };
                    compare_with_oracle(&resolved, current.version, ids, oracle)?
                }
            }
        };

        assessments.push(Assessment {
            reference: text.to_string(),
            resolved: Some(resolved),
            key: Some(key),
            freshness,
        });
    }

    Ok(assessments)
}

/// References that need a bake, in input order, each at most once.
pub fn resolve_stale<S: AsRef<str>>(
    references: &[S],
    index: &ExportIndex,
    oracle: &dyn VersionOracle,
) -> Result<Vec<ChartReference>, SyncError> {
    Ok(stale_from(assess(references, index, oracle)?))
}

/// Collect the bake queue out of a set of assessments.
pub fn stale_from(assessments: impl IntoIterator<Item = Assessment>) -> Vec<ChartReference> {
    assessments
        .into_iter()
        .filter(|a| a.freshness.needs_bake())
        .filter_map(|a| a.resolved)
        .collect()
}

fn compare_with_oracle(
    resolved: &ChartReference,
    indexed: u64,
    slug_ids: &HashMap<String, ChartId>,
    oracle: &dyn VersionOracle,
) -> Result<Freshness, SyncError> {
    let Some(&chart_id) = slug_ids.get(&resolved.slug.to_lowercase()) else {
        tracing::warn!("couldn't find chart with slug {}", resolved.slug);
        return Ok(Freshness::UnknownSlug);
    };

    let Some(current) = oracle.get_version(chart_id)? else {
        tracing::warn!("missing version for chart id {chart_id} (slug {})", resolved.slug);
        return Ok(Freshness::MissingVersion { chart_id });
    };

    if current > indexed {
        Ok(Freshness::Outdated { indexed, current })
    } else {
        Ok(Freshness::Current { version: indexed })
    }
}

fn fold_slugs(ids: HashMap<String, ChartId>) -> HashMap<String, ChartId> {
    let mut folded = HashMap::with_capacity(ids.len());
    let mut entries: Vec<_> = ids.into_iter().collect();
    entries.sort();
    for (slug, id) in entries {
        folded.entry(slug.to_lowercase()).or_insert(id);
    }
    folded
}
