use std::path::{Path, PathBuf};

use compio::fs;
use snafu::{ResultExt, Snafu};

use crate::ext::{AsyncTryFrom, LogPathExt};

/// A file whose content is monitored for change-triggered rebuilds.
/// The content is opaque bytes; no attempt is made to parse it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFile {
    path: PathBuf,
    content: Vec<u8>,
}

impl AsyncTryFrom<PathBuf> for TrackedFile {
    type Error = TrackedFileError;

    async fn async_try_from(path: PathBuf) -> Result<Self, Self::Error> {
        let metadata = path.metadata().context(ReadSnafu { path: path.clone() })?;

        if metadata.is_dir() {
            return DirectorySnafu { path }.fail();
        }

        let content = fs::read(&path).await.context(ReadSnafu { path: path.clone() })?;

        Ok(TrackedFile { path, content })
    }
}

impl TrackedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

#[derive(Debug, Snafu)]
pub enum TrackedFileError {
    #[snafu(display("Failed to read tracked file {}", path.display_for_log()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Tracked path {} is a directory", path.display_for_log()))]
    DirectoryError { path: PathBuf },
}
