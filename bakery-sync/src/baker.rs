//! Bake collaborator — whatever actually renders the export files.

use std::path::{Path, PathBuf};
use std::process::Command;

use bakery_core::{BakerCommand, ChartReference};

use crate::error::BakeError;

/// Renders one batch of references into `destination`.
///
/// A call either succeeds for the whole batch or reports an error; the
/// caller decides whether to keep going.
pub trait Baker {
    fn bake(
        &self,
        references: &[ChartReference],
        destination: &Path,
        optimize: bool,
    ) -> Result<(), BakeError>;
}

/// Runs an external program once per batch:
///
/// ```text
/// <program> <args>... --destination <dir> [--optimize] <reference>...
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBaker {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandBaker {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn command(&self, references: &[ChartReference], destination: &Path, optimize: bool) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg("--destination").arg(destination);
        if optimize {
            cmd.arg("--optimize");
        }
        cmd.args(references.iter().map(|r| r.source.as_str()));
        cmd
    }
}

impl From<&BakerCommand> for CommandBaker {
    fn from(config: &BakerCommand) -> Self {
        CommandBaker::new(&config.program).with_args(config.args.iter().cloned())
    }
}

impl Baker for CommandBaker {
    fn bake(
        &self,
        references: &[ChartReference],
        destination: &Path,
        optimize: bool,
    ) -> Result<(), BakeError> {
        let output = self
            .command(references, destination, optimize)
            .output()
            .map_err(|source| BakeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }
        Err(BakeError::Failed {
            program: self.program.clone(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
