use std::path::PathBuf;

use clap::Parser;

use crate::cli::LogLevel;
use crate::modes::RunMode;

#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// What to start in the container environment; the default service when omitted
    #[clap(value_enum)]
    pub mode: Option<RunMode>,
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// The root directory of the project
    #[clap(long, short, default_value = ".")]
    pub root: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_argument_selects_the_default_service() {
        let cli = Cli::try_parse_from(["dockhand"]).unwrap();
        assert!(cli.mode.is_none());
        assert_eq!(cli.root, PathBuf::from("."));
    }

    #[test]
    fn mode_argument_is_recognized() {
        let cli = Cli::try_parse_from(["dockhand", "shell"]).unwrap();
        assert!(matches!(cli.mode, Some(RunMode::Shell)));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let result = Cli::try_parse_from(["dockhand", "deploy"]);
        assert!(result.is_err());
    }

    #[test]
    fn root_flag_overrides_the_working_directory() {
        let cli = Cli::try_parse_from(["dockhand", "python", "--root", "/srv/project"]).unwrap();
        assert!(matches!(cli.mode, Some(RunMode::Python)));
        assert_eq!(cli.root, PathBuf::from("/srv/project"));
    }
}
