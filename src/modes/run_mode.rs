use clap::ValueEnum;
use derive_more::Display;

/// The predefined ways to enter the container environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Display)]
pub enum RunMode {
    /// An interactive shell in the service container
    #[display("shell")]
    Shell,
    /// An interactive Python interpreter in the service container
    #[display("python")]
    Python,
    /// The project's data download script, outside the container
    #[display("download")]
    Download,
}

impl RunMode {
    /// The command launched inside the service container, for the modes
    /// that map to one. `Download` runs on the host instead.
    pub fn container_command(&self) -> Option<&'static [&'static str]> {
        match self {
            RunMode::Shell => Some(&["bash"]),
            RunMode::Python => Some(&["python"]),
            RunMode::Download => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(RunMode::Shell, Some(&["bash"][..]))]
    #[case(RunMode::Python, Some(&["python"][..]))]
    #[case(RunMode::Download, None)]
    fn container_command_lookup(
        #[case] mode: RunMode,
        #[case] expected: Option<&'static [&'static str]>,
    ) {
        assert_eq!(mode.container_command(), expected);
    }

    #[rstest]
    #[case(RunMode::Shell, "shell")]
    #[case(RunMode::Python, "python")]
    #[case(RunMode::Download, "download")]
    fn display_matches_the_cli_argument(#[case] mode: RunMode, #[case] expected: &str) {
        assert_eq!(mode.to_string(), expected);
    }
}
