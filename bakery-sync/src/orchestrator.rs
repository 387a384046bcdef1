//! Batch bake orchestration.
//!
//! Stale references are baked in consecutive batches of at most
//! `batch_size`, strictly one batch at a time, in input order. A failed
//! batch is logged and recorded; the batches after it still run.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use bakery_core::ChartReference;

use crate::baker::Baker;
use crate::error::SyncError;

/// Result of one bake call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    /// 1-based position of the batch in the run.
    pub batch: usize,
    pub references: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Every batch outcome of a bake run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BakeReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub batches: Vec<BatchOutcome>,
}

impl BakeReport {
    /// References in batches that succeeded.
    pub fn baked_count(&self) -> usize {
        self.batches
            .iter()
            .filter(|b| b.succeeded())
            .map(|b| b.references.len())
            .sum()
    }

    pub fn failed_batches(&self) -> usize {
        self.batches.iter().filter(|b| !b.succeeded()).count()
    }

    /// References in batches that failed.
    pub fn failed_count(&self) -> usize {
        self.batches
            .iter()
            .filter(|b| !b.succeeded())
            .map(|b| b.references.len())
            .sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed_batches() == 0
    }
}

/// Bake `stale` in batches of `batch_size` into `destination`.
///
/// Returns an error only for a zero batch size; bake failures are recorded
/// in the report.
pub fn run_bake(
    stale: &[ChartReference],
    batch_size: usize,
    baker: &dyn Baker,
    destination: &Path,
    optimize: bool,
) -> Result<BakeReport, SyncError> {
    if batch_size == 0 {
        return Err(SyncError::InvalidBatchSize);
    }

    let started_at = Utc::now();
    let total = stale.len().div_ceil(batch_size);
    let mut batches = Vec::with_capacity(total);

    for (i, batch) in stale.chunks(batch_size).enumerate() {
        let number = i + 1;
        tracing::info!("baking batch {number}/{total} ({} chart(s))", batch.len());
        let error = match baker.bake(batch, destination, optimize) {
            Ok(()) => None,
            Err(err) => {
                tracing::error!("batch {number}/{total} failed: {err}");
                Some(err.to_string())
            }
        };
        batches.push(BatchOutcome {
            batch: number,
            references: batch.iter().map(|r| r.source.clone()).collect(),
            error,
        });
    }

    Ok(BakeReport {
        started_at,
        finished_at: Utc::now(),
        batches,
    })
}
