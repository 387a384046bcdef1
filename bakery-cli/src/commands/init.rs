//! `bakery init --site-dir <dir> --base-url <url> [...]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use bakery_core::{
    settings::{self, DEFAULT_ARTIFACT_EXTENSION, DEFAULT_BATCH_SIZE},
    BakerCommand, Settings,
};

use super::home_dir;

/// Write bakery settings.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Root of the baked site; exports are read from and written to <dir>/exports.
    #[arg(long, value_name = "DIR")]
    pub site_dir: PathBuf,

    /// Public base address of the baked site (e.g. https://ourworldindata.org).
    #[arg(long, value_name = "URL")]
    pub base_url: String,

    /// Chart catalog (YAML or JSON) with slug, id and version per chart.
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Program that bakes one batch of references.
    #[arg(long, value_name = "PROGRAM")]
    pub baker: Option<PathBuf>,

    /// Extra argument for the baker program (repeatable).
    #[arg(long = "baker-arg", value_name = "ARG", requires = "baker", allow_hyphen_values = true)]
    pub baker_args: Vec<String>,

    /// References per bake call.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Export file extension.
    #[arg(long, default_value = DEFAULT_ARTIFACT_EXTENSION)]
    pub extension: String,

    /// Ask the baker to optimize exports.
    #[arg(long)]
    pub optimize: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let home = home_dir()?;
        let site_dir = absolute(self.site_dir)?;

        let mut settings = Settings::new(site_dir, self.base_url);
        settings.catalog = self.catalog.map(absolute).transpose()?;
        settings.baker = self.baker.map(|program| BakerCommand {
            program,
            args: self.baker_args,
        });
        settings.batch_size = self.batch_size;
        settings.artifact_extension = self.extension;
        settings.optimize_svg_exports = self.optimize;
        settings.validate().context("refusing to save settings")?;

        let path = settings::save_at(&home, &settings).context("failed to save settings")?;
        println!("✓ Saved settings to {}", path.display());
        println!("  Exports: {}", settings.exports_dir().display());
        Ok(())
    }
}

fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().context("cannot read current directory")?;
    Ok(cwd.join(path))
}
