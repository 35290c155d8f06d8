use std::path::PathBuf;

use crate::cli::Cli;
use crate::modes::RunMode;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub mode: Option<RunMode>,
    pub root: PathBuf,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            mode: cli.mode,
            root: cli.root,
        }
    }
}
