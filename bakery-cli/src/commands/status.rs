//! `bakery status` — freshness of chart references, nothing is baked.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use bakery_sync::{assess, build_index, Assessment, Freshness};

use super::{home_dir, load_settings, open_catalog, ReferenceArgs};

/// Arguments for `bakery status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub references: ReferenceArgs,

    /// Chart catalog to use instead of the configured one.
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusReportJson<'a> {
    summary: StatusSummaryJson,
    references: &'a [Assessment],
}

#[derive(Serialize)]
struct StatusSummaryJson {
    references: usize,
    stale: usize,
    skipped: usize,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "reference")]
    reference: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "detail")]
    detail: String,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let home = home_dir()?;
        let settings = load_settings(&home)?;
        let references = self.references.collect()?;
        let oracle = open_catalog(&settings, self.catalog.as_deref())?;

        let exports_dir = settings.exports_dir();
        let index = build_index(
            &exports_dir,
            &settings.baked_base_url,
            &settings.artifact_extension,
        )
        .with_context(|| format!("failed to index '{}'", exports_dir.display()))?;
        let assessments =
            assess(&references, &index, &oracle).context("staleness check failed")?;

        let stale = assessments
            .iter()
            .filter(|a| a.freshness.needs_bake())
            .count();
        let summary = StatusSummaryJson {
            references: assessments.len(),
            stale,
            skipped: assessments.len() - stale - count_current(&assessments),
        };

        if self.json {
            let payload = StatusReportJson {
                summary,
                references: &assessments,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        print_table(&assessments, &summary);
        Ok(())
    }
}

fn count_current(assessments: &[Assessment]) -> usize {
    assessments
        .iter()
        .filter(|a| matches!(a.freshness, Freshness::Current { .. }))
        .count()
}

fn print_table(assessments: &[Assessment], summary: &StatusSummaryJson) {
    println!(
        "Bakery v{} | {} reference(s) | {} stale | {} skipped",
        env!("CARGO_PKG_VERSION"),
        summary.references,
        summary.stale,
        summary.skipped,
    );

    let rows: Vec<StatusTableRow> = assessments
        .iter()
        .map(|a| StatusTableRow {
            reference: a.reference.clone(),
            status: freshness_label(&a.freshness),
            detail: freshness_detail(&a.freshness),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if summary.stale > 0 {
        println!("Run 'bakery bake' with the same references to regenerate stale exports.");
    }
}

fn freshness_label(freshness: &Freshness) -> String {
    match freshness {
        Freshness::NeverBaked => "NEVER BAKED".yellow().bold().to_string(),
        Freshness::Outdated { .. } => "STALE".red().bold().to_string(),
        Freshness::Current { .. } => "CURRENT".green().bold().to_string(),
        Freshness::UnknownSlug
        | Freshness::MissingVersion { .. }
        | Freshness::InvalidReference { .. } => "SKIPPED".magenta().bold().to_string(),
        Freshness::Duplicate => "DUPLICATE".bright_black().bold().to_string(),
    }
}

fn freshness_detail(freshness: &Freshness) -> String {
    match freshness {
        Freshness::NeverBaked => "no export on disk".to_string(),
        Freshness::Outdated { indexed, current } => format!("v{indexed} on disk, chart at v{current}"),
        Freshness::Current { version } => format!("v{version} up to date"),
        Freshness::UnknownSlug => "slug not in catalog".to_string(),
        Freshness::MissingVersion { chart_id } => format!("chart {chart_id} has no version"),
        Freshness::InvalidReference { reason } => reason.clone(),
        Freshness::Duplicate => "repeats an earlier reference".to_string(),
    }
}
