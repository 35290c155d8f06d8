use colored::Color;
use compio::{io::compat::AsyncStream, process::Command};
use snafu::{ResultExt, Snafu};
use std::process::Stdio;
use tracing::{debug, info};

use crate::engine::output::spawn_line_printer;
use crate::gate::RebuildAction;

const DOCKER_BINARY: &str = "docker";

/// Thin boundary around `docker compose` for a single service. Building
/// streams the child's output with a labelled prefix; run and up hand the
/// terminal to the child untouched so interactive sessions work.
#[derive(Debug, Clone)]
pub struct ComposeEngine {
    service: String,
}

impl ComposeEngine {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Rebuilds the service image. Output is piped and re-printed line by
    /// line under a `[service]` prefix; a non-zero exit is an error.
    pub async fn build(&self) -> Result<(), EngineError> {
        let args = self.build_args();
        let rendered = render_command(&args);
        info!("Rebuilding image for service '{}'", self.service);
        debug!("Spawning '{}'", rendered);

        let mut cmd = Command::new(DOCKER_BINARY);
        cmd.args(&args);
        let _ = cmd.stdout(Stdio::piped());
        let _ = cmd.stderr(Stdio::piped());

        let mut handle = cmd.spawn().context(SpawnSnafu {
            command: rendered.clone(),
        })?;

        if let Some(stdout) = handle.stdout.take() {
            spawn_line_printer(AsyncStream::new(stdout), self.service.clone(), Color::Cyan);
        }
        if let Some(stderr) = handle.stderr.take() {
            spawn_line_printer(AsyncStream::new(stderr), self.service.clone(), Color::Yellow);
        }

        let status = handle.wait().await.context(WaitSnafu { command: rendered })?;

        if status.success() {
            info!("Image for service '{}' rebuilt successfully", self.service);
            Ok(())
        } else {
            BuildFailedSnafu {
                service: self.service.clone(),
                status: status.code().unwrap_or(-1),
            }
            .fail()
        }
    }

    /// Runs a one-off command in a fresh service container with the
    /// caller's terminal attached. Returns the child's exit code.
    pub async fn run(&self, command: &[&str]) -> Result<i32, EngineError> {
        self.wait_foreground(self.run_args(command)).await
    }

    /// Starts the service in the foreground. Returns the child's exit code.
    pub async fn up(&self) -> Result<i32, EngineError> {
        self.wait_foreground(self.up_args()).await
    }

    fn build_args(&self) -> Vec<String> {
        vec!["compose".into(), "build".into(), self.service.clone()]
    }

    fn run_args(&self, command: &[&str]) -> Vec<String> {
        ["compose", "run", "--rm"]
            .iter()
            .map(|s| s.to_string())
            .chain(std::iter::once(self.service.clone()))
            .chain(command.iter().map(|s| s.to_string()))
            .collect()
    }

    fn up_args(&self) -> Vec<String> {
        vec!["compose".into(), "up".into(), self.service.clone()]
    }

    /// Spawns `docker` with inherited stdio and waits for it to finish.
    async fn wait_foreground(&self, args: Vec<String>) -> Result<i32, EngineError> {
        let rendered = render_command(&args);
        debug!("Spawning '{}'", rendered);

        let mut cmd = Command::new(DOCKER_BINARY);
        cmd.args(&args);

        let mut handle = cmd.spawn().context(SpawnSnafu {
            command: rendered.clone(),
        })?;
        let status = handle.wait().await.context(WaitSnafu { command: rendered })?;

        Ok(status.code().unwrap_or(1))
    }
}

impl RebuildAction for ComposeEngine {
    type Error = EngineError;

    async fn rebuild(&mut self) -> Result<(), EngineError> {
        self.build().await
    }
}

fn render_command(args: &[String]) -> String {
    format!("{} {}", DOCKER_BINARY, args.join(" "))
}

#[derive(Debug, Snafu)]
pub enum EngineError {
    #[snafu(display("Failed to spawn '{}'", command))]
    SpawnError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to wait for '{}'", command))]
    WaitError {
        command: String,
        source: std::io::Error,
    },
    #[snafu(display("Image build for service '{}' failed with exit code {}", service, status))]
    BuildFailedError { service: String, status: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_args_target_the_configured_service() {
        let engine = ComposeEngine::new("trainer");
        assert_eq!(engine.build_args(), vec!["compose", "build", "trainer"]);
    }

    #[test]
    fn run_args_use_a_disposable_container() {
        let engine = ComposeEngine::new("trainer");
        assert_eq!(
            engine.run_args(&["python"]),
            vec!["compose", "run", "--rm", "trainer", "python"]
        );
    }

    #[test]
    fn run_args_keep_the_command_order() {
        let engine = ComposeEngine::new("app");
        assert_eq!(
            engine.run_args(&["python", "-m", "http.server"]),
            vec!["compose", "run", "--rm", "app", "python", "-m", "http.server"]
        );
    }

    #[test]
    fn up_args_start_the_service() {
        let engine = ComposeEngine::new("app");
        assert_eq!(engine.up_args(), vec!["compose", "up", "app"]);
    }

    #[test]
    fn rendered_command_is_readable() {
        let engine = ComposeEngine::new("app");
        assert_eq!(render_command(&engine.up_args()), "docker compose up app");
    }
}
