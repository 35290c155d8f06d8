use compio::process::Command;
use snafu::{ResultExt, Snafu};
use tracing::info;

use crate::config::ProjectConfig;
use crate::engine::{ComposeEngine, EngineError};
use crate::modes::RunMode;

/// Maps the requested mode to its external action and waits for it.
/// Returns the action's exit code so the caller can propagate it verbatim.
pub async fn dispatch(
    mode: Option<RunMode>,
    config: &ProjectConfig,
    engine: &ComposeEngine,
) -> Result<i32, DispatchError> {
    let Some(mode) = mode else {
        info!("Starting default service '{}'", config.service);
        return engine.up().await.context(EngineInvocationSnafu);
    };

    info!("Dispatching run mode '{}'", mode);
    match mode.container_command() {
        Some(command) => engine.run(command).await.context(EngineInvocationSnafu),
        None => run_download_script(&config.download_script).await,
    }
}

/// Runs the configured download script through the platform shell with the
/// caller's terminal attached.
async fn run_download_script(script: &str) -> Result<i32, DispatchError> {
    info!("Running download script '{}'", script);

    let (shell, args) = shell_command(script);
    let mut cmd = Command::new(shell);
    cmd.args(args);

    let mut handle = cmd.spawn().context(ScriptSpawnSnafu { script })?;
    let status = handle.wait().await.context(ScriptWaitSnafu { script })?;

    Ok(status.code().unwrap_or(1))
}

/// Returns the shell invocation for a script line. This should be
/// os-specific.
fn shell_command(script: &str) -> (&'static str, Vec<&str>) {
    #[cfg(target_family = "windows")]
    {
        ("cmd", vec!["/C", script])
    }
    #[cfg(target_family = "unix")]
    {
        ("sh", vec!["-c", script])
    }
}

#[derive(Debug, Snafu)]
pub enum DispatchError {
    #[snafu(display("Container engine invocation failed"))]
    EngineInvocationError { source: EngineError },
    #[snafu(display("Failed to spawn download script '{}'", script))]
    ScriptSpawnError {
        script: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to wait for download script '{}'", script))]
    ScriptWaitError {
        script: String,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[compio::test]
    async fn download_script_exit_code_is_propagated() {
        let code = run_download_script("exit 7").await.unwrap();
        assert_eq!(code, 7);
    }

    #[compio::test]
    async fn successful_download_script_returns_zero() {
        let code = run_download_script("true").await.unwrap();
        assert_eq!(code, 0);
    }

    #[cfg(target_family = "unix")]
    #[test]
    fn shell_command_wraps_the_script_line() {
        let (shell, args) = shell_command("./download.sh");
        assert_eq!(shell, "sh");
        assert_eq!(args, vec!["-c", "./download.sh"]);
    }
}
