use std::path::PathBuf;

use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use crate::ext::{AsyncTryInto, LogPathExt};
use crate::gate::snapshot_store::{SnapshotStore, SnapshotStoreError};
use crate::gate::tracked_file::{TrackedFile, TrackedFileError};

/// The rebuild operation invoked when a tracked file has changed.
/// Injected so the gate's logic never touches a real container tool.
pub trait RebuildAction {
    type Error: std::error::Error + 'static;

    async fn rebuild(&mut self) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// All tracked files match their snapshot; nothing was done.
    Unchanged,
    /// At least one tracked file changed; the rebuild action ran and the
    /// snapshot now reflects the current content.
    Rebuilt,
}

/// Decides whether the tracked files changed since the last successful
/// rebuild. Missing snapshot entries are seeded from the current content
/// and do not count as a change, so the first-ever run always reports
/// [`GateOutcome::Unchanged`].
#[derive(Debug, Clone)]
pub struct ChangeGate {
    root: PathBuf,
    tracked: Vec<String>,
}

impl ChangeGate {
    pub fn new(root: impl Into<PathBuf>, tracked: Vec<String>) -> Self {
        Self {
            root: root.into(),
            tracked,
        }
    }

    /// Seeds missing snapshot entries, compares the rest byte-for-byte, and
    /// runs `action` once if anything differs. The snapshot is refreshed
    /// only after the action succeeds; a failed action leaves every
    /// pre-existing entry untouched.
    pub async fn ensure_current<S, A>(
        &self,
        store: &mut S,
        action: &mut A,
    ) -> Result<GateOutcome, GateError<A::Error>>
    where
        S: SnapshotStore,
        A: RebuildAction,
    {
        let mut live: Vec<(&str, TrackedFile)> = Vec::with_capacity(self.tracked.len());
        for rel_path in &self.tracked {
            let file: TrackedFile = self
                .root
                .join(rel_path)
                .async_try_into()
                .await
                .context(TrackedFileSnafu)?;
            live.push((rel_path.as_str(), file));
        }

        let mut changed: Vec<&str> = Vec::new();
        for (key, file) in &live {
            match store.read_entry(key).await.context(StoreSnafu)? {
                None => {
                    info!(
                        "No snapshot for '{}', seeding from {}",
                        key,
                        file.path().display_for_log()
                    );
                    store.write_entry(key, file.content()).await.context(StoreSnafu)?;
                }
                Some(snapshot) if snapshot == file.content() => {
                    debug!("Tracked file '{}' matches its snapshot", key);
                }
                Some(_) => {
                    debug!("Tracked file '{}' differs from its snapshot", key);
                    changed.push(key);
                }
            }
        }

        if changed.is_empty() {
            info!("Tracked files are unchanged, no rebuild needed");
            return Ok(GateOutcome::Unchanged);
        }

        info!("Tracked files changed ({}), rebuilding", changed.join(", "));
        action.rebuild().await.context(RebuildFailedSnafu)?;

        for (key, file) in &live {
            store.write_entry(key, file.content()).await.context(StoreSnafu)?;
        }

        Ok(GateOutcome::Rebuilt)
    }
}

#[derive(Debug, Snafu)]
pub enum GateError<E>
where
    E: std::error::Error + 'static,
{
    #[snafu(display("Failed to load a tracked file"))]
    TrackedFileError { source: TrackedFileError },
    #[snafu(display("Snapshot store operation failed"))]
    StoreError { source: SnapshotStoreError },
    #[snafu(display("The rebuild action failed, snapshot left untouched"))]
    RebuildFailedError { source: E },
}
