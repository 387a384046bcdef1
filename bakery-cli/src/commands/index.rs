//! `bakery index` — what the exports directory holds right now.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use bakery_core::ExportRecord;
use bakery_sync::{build_index, export_index::SkippedExport};

use super::{home_dir, load_settings};

/// Arguments for `bakery index`.
#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct IndexJson<'a> {
    exports: Vec<&'a ExportRecord>,
    skipped: &'a [SkippedExport],
}

#[derive(Tabled)]
struct IndexTableRow {
    #[tabled(rename = "key")]
    key: String,
    #[tabled(rename = "version")]
    version: u64,
    #[tabled(rename = "size")]
    size: String,
    #[tabled(rename = "address")]
    address: String,
}

impl IndexArgs {
    pub fn run(self) -> Result<()> {
        let home = home_dir()?;
        let settings = load_settings(&home)?;
        let exports_dir = settings.exports_dir();
        let index = build_index(
            &exports_dir,
            &settings.baked_base_url,
            &settings.artifact_extension,
        )
        .with_context(|| format!("failed to index '{}'", exports_dir.display()))?;

        if self.json {
            let payload = IndexJson {
                exports: index.records().collect(),
                skipped: index.skipped(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize index JSON")?
            );
            return Ok(());
        }

        println!(
            "{} | {} export key(s) | {} skipped",
            exports_dir.display(),
            index.len(),
            index.skipped().len()
        );
        if !index.is_empty() {
            let rows: Vec<IndexTableRow> = index
                .records()
                .map(|r| IndexTableRow {
                    key: r.key.to_string(),
                    version: r.version,
                    size: format!("{}x{}", r.width, r.height),
                    address: r.location_uri.clone(),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{table}");
        }
        for skipped in index.skipped() {
            println!(
                "  {} {} ({})",
                "skipped".yellow().bold(),
                skipped.filename,
                skipped.reason
            );
        }
        Ok(())
    }
}
