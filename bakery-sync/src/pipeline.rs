//! Shared bake pipeline entrypoint used by the CLI.
//!
//! One run walks `Idle → Indexing → Resolving → Baking → Done`. The index is
//! built once from a single listing of the exports directory and is not
//! refreshed while batches run. A dry run stops after `Resolving`.

use std::fmt;

use serde::Serialize;

use bakery_core::{ChartReference, Settings};

use crate::baker::Baker;
use crate::export_index::{build_index, SkippedExport};
use crate::oracle::VersionOracle;
use crate::orchestrator::{run_bake, BakeReport};
use crate::staleness::{assess, stale_from, Assessment};
use crate::SyncError;

/// Phase of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    Indexing,
    Resolving,
    Baking { batches: usize },
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Idle => write!(f, "idle"),
            RunPhase::Indexing => write!(f, "indexing"),
            RunPhase::Resolving => write!(f, "resolving"),
            RunPhase::Baking { batches } => write!(f, "baking ({batches} batch(es))"),
            RunPhase::Done => write!(f, "done"),
        }
    }
}

/// Everything a run decided and did.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub phases: Vec<RunPhase>,
    pub indexed_exports: usize,
    pub skipped_exports: Vec<SkippedExport>,
    pub assessments: Vec<Assessment>,
    #[serde(skip)]
    pub stale: Vec<ChartReference>,
    /// `None` for dry runs.
    pub report: Option<BakeReport>,
}

impl RunSummary {
    pub fn failed_batches(&self) -> usize {
        self.report.as_ref().map_or(0, BakeReport::failed_batches)
    }
}

/// Run the pipeline for `references`.
///
/// Settings are validated first. The exports directory must exist and the
/// oracle must answer; any other per-item problem is logged and skipped.
pub fn run<S: AsRef<str>>(
    settings: &Settings,
    references: &[S],
    oracle: &dyn VersionOracle,
    baker: &dyn Baker,
    dry_run: bool,
) -> Result<RunSummary, SyncError> {
    settings.validate()?;
    let mut phases = vec![RunPhase::Idle];

    enter(&mut phases, RunPhase::Indexing);
    let exports_dir = settings.exports_dir();
    let index = build_index(
        &exports_dir,
        &settings.baked_base_url,
        &settings.artifact_extension,
    )?;

    enter(&mut phases, RunPhase::Resolving);
    let assessments = assess(references, &index, oracle)?;
    let stale = stale_from(assessments.iter().cloned());
    tracing::info!(
        "{} of {} reference(s) need baking",
        stale.len(),
        references.len()
    );

    let report = if dry_run {
        None
    } else {
        let batches = stale.len().div_ceil(settings.batch_size);
        if batches > 0 {
            enter(&mut phases, RunPhase::Baking { batches });
        }
        Some(run_bake(
            &stale,
            settings.batch_size,
            baker,
            &exports_dir,
            settings.optimize_svg_exports,
        )?)
    };

    enter(&mut phases, RunPhase::Done);
    Ok(RunSummary {
        phases,
        indexed_exports: index.len(),
        skipped_exports: index.skipped().to_vec(),
        assessments,
        stale,
        report,
    })
}

fn enter(phases: &mut Vec<RunPhase>, phase: RunPhase) {
    tracing::debug!("pipeline phase: {phase}");
    phases.push(phase);
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;
    use crate::error::BakeError;
    use crate::oracle::MemoryOracle;

    struct NoBake;

    impl Baker for NoBake {
        fn bake(&self, _: &[ChartReference], _: &Path, _: bool) -> Result<(), BakeError> {
            Err(BakeError::Other("baker should not run".into()))
        }
    }

    fn site() -> (TempDir, Settings) {
        let dir = TempDir::new().expect("site");
        let settings = Settings::new(dir.path(), "https://example.org");
        fs::create_dir_all(settings.exports_dir()).expect("mkdir exports");
        (dir, settings)
    }

    #[test]
    fn dry_run_never_bakes() {
        let (_dir, settings) = site();
        let summary = run(
            &settings,
            &["https://example.org/grapher/new-chart"],
            &MemoryOracle::new(),
            &NoBake,
            true,
        )
        .expect("run");
        assert_eq!(summary.stale.len(), 1);
        assert!(summary.report.is_none());
        assert_eq!(
            summary.phases,
            vec![RunPhase::Idle, RunPhase::Indexing, RunPhase::Resolving, RunPhase::Done]
        );
    }

    #[test]
    fn missing_exports_dir_fails_run() {
        let dir = TempDir::new().expect("site");
        let settings = Settings::new(dir.path(), "https://example.org");
        let err = run(
            &settings,
            &["https://example.org/grapher/x"],
            &MemoryOracle::new(),
            &NoBake,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }

    #[test]
    fn invalid_settings_fail_before_indexing() {
        let (_dir, mut settings) = site();
        settings.batch_size = 0;
        let err = run::<&str>(&settings, &[], &MemoryOracle::new(), &NoBake, false).unwrap_err();
        assert!(matches!(err, SyncError::Settings(_)));
    }
}
