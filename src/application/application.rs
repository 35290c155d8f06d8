use std::env;
use std::path::PathBuf;

use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, warn};

use crate::application::RuntimeConfig;
use crate::config::{ProjectConfig, ProjectConfigError};
use crate::engine::{ComposeEngine, EngineError};
use crate::ext::LogPathExt;
use crate::gate::{ChangeGate, DiskSnapshotStore, GateError};
use crate::modes::{DispatchError, dispatch};

pub struct Application;

impl Application {
    /// Enters the project directory, refreshes the container image if the
    /// tracked files changed, then dispatches the requested run mode.
    /// Returns the dispatched action's exit code.
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<i32, ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();

        env::set_current_dir(&app_config.root).context(DirectoryChangeSnafu {
            path: app_config.root.clone(),
        })?;

        let config = ProjectConfig::read(".".as_ref()).await.context(ConfigSnafu)?;
        debug!("Loaded config: {:?}", config);

        let gate = ChangeGate::new(".", config.track.clone());
        let mut store = DiskSnapshotStore::standard();
        let mut engine = ComposeEngine::new(config.service.clone());

        let outcome = gate
            .ensure_current(&mut store, &mut engine)
            .await
            .context(ImageRefreshSnafu)?;
        debug!("Change gate outcome: {:?}", outcome);

        let status = dispatch(app_config.mode, &config, &engine)
            .await
            .context(ModeDispatchSnafu)?;
        if status != 0 {
            warn!("Dispatched action exited with status {}", status);
        }

        Ok(status)
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Failed to enter project directory {}", path.display_for_log()))]
    DirectoryChangeError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigError { source: ProjectConfigError },
    #[snafu(display("Critical failure encountered while refreshing the container image"))]
    ImageRefreshError { source: GateError<EngineError> },
    #[snafu(display("Critical failure encountered while dispatching the run mode"))]
    ModeDispatchError { source: DispatchError },
}
