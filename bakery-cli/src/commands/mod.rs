//! Subcommand implementations.

pub mod bake;
pub mod index;
pub mod init;
pub mod status;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use bakery_core::{settings, Settings};
use bakery_sync::CatalogOracle;

/// Chart references given on the command line and/or in a list file.
#[derive(Args, Debug)]
pub struct ReferenceArgs {
    /// Chart references, e.g. https://ourworldindata.org/grapher/co2?tab=map
    pub references: Vec<String>,

    /// File with one reference per line (`#` starts a comment).
    #[arg(long, short = 'f', value_name = "FILE")]
    pub file: Option<PathBuf>,
}

impl ReferenceArgs {
    /// Command-line references first, then file entries, in order.
    pub fn collect(&self) -> Result<Vec<String>> {
        let mut references = self.references.clone();
        if let Some(path) = &self.file {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read reference list '{}'", path.display()))?;
            references.extend(parse_reference_list(&contents));
        }
        if references.is_empty() {
            bail!("no chart references given; pass them as arguments or with --file");
        }
        Ok(references)
    }
}

fn parse_reference_list(contents: &str) -> impl Iterator<Item = String> + '_ {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}

pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}

pub fn load_settings(home: &Path) -> Result<Settings> {
    settings::load_at(home).context("failed to load settings")
}

/// Open the catalog named by `override_path`, falling back to settings.
pub fn open_catalog(settings: &Settings, override_path: Option<&Path>) -> Result<CatalogOracle> {
    let path = override_path
        .or(settings.catalog.as_deref())
        .context("no chart catalog configured; pass --catalog or run `bakery init --catalog`")?;
    CatalogOracle::load(path).with_context(|| format!("failed to open catalog '{}'", path.display()))
}
