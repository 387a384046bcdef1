//! `bakery bake` — index, resolve and bake stale chart references.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::Args;

use bakery_core::{ChartReference, Settings};
use bakery_sync::{
    pipeline::{self, RunSummary},
    BakeError, Baker, CommandBaker,
};

use super::{home_dir, load_settings, open_catalog, ReferenceArgs};

/// Arguments for `bakery bake`.
#[derive(Args, Debug)]
pub struct BakeArgs {
    #[command(flatten)]
    pub references: ReferenceArgs,

    /// Show what would be baked without running the baker.
    #[arg(long)]
    pub dry_run: bool,

    /// References per bake call (overrides settings).
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Chart catalog to use instead of the configured one.
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Emit the run summary as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Stands in for the baker when none is configured; only reachable when the
/// run has nothing to bake or is a dry run.
struct MissingBaker;

impl Baker for MissingBaker {
    fn bake(&self, _: &[ChartReference], _: &std::path::Path, _: bool) -> Result<(), BakeError> {
        Err(BakeError::Other(
            "no baker configured; run `bakery init --baker <program>`".to_string(),
        ))
    }
}

impl BakeArgs {
    pub fn run(self) -> Result<()> {
        let home = home_dir()?;
        let mut settings: Settings = load_settings(&home)?;
        if let Some(batch_size) = self.batch_size {
            settings.batch_size = batch_size;
        }
        let references = self.references.collect()?;
        let oracle = open_catalog(&settings, self.catalog.as_deref())?;

        let command_baker = settings.baker.as_ref().map(CommandBaker::from);
        if command_baker.is_none() && !self.dry_run {
            tracing::warn!("no baker configured; stale charts will be reported as failed batches");
        }
        let baker: &dyn Baker = match &command_baker {
            Some(baker) => baker,
            None => &MissingBaker,
        };

        let summary = pipeline::run(&settings, &references, &oracle, baker, self.dry_run)
            .context("bake run failed")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("failed to serialize run JSON")?
            );
        } else {
            print_summary(&summary, self.dry_run);
        }

        let failed = summary.failed_batches();
        if failed > 0 {
            bail!("{failed} bake batch(es) failed");
        }
        Ok(())
    }
}

fn print_summary(summary: &RunSummary, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };

    if summary.stale.is_empty() {
        println!(
            "{prefix}✓ nothing to bake ({} reference(s) checked, {} export key(s) indexed)",
            summary.assessments.len(),
            summary.indexed_exports
        );
        return;
    }

    match &summary.report {
        None => {
            println!("{prefix}{} reference(s) would be baked", summary.stale.len());
            for reference in &summary.stale {
                println!("  ~  {reference}");
            }
        }
        Some(report) => {
            let elapsed = (report.finished_at - report.started_at).num_milliseconds();
            println!(
                "{prefix}✓ baked {} reference(s) in {} batch(es), {} failed ({elapsed} ms, started {})",
                report.baked_count(),
                report.batches.len(),
                report.failed_batches(),
                local_time(report.started_at),
            );
            for batch in &report.batches {
                let marker = if batch.succeeded() { "✎" } else { "✗" };
                for reference in &batch.references {
                    println!("  {marker}  {reference}");
                }
                if let Some(error) = &batch.error {
                    println!("     batch {} failed: {error}", batch.batch);
                }
            }
        }
    }
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}
