use std::hash::Hasher;
use std::path::PathBuf;

use bincode::{Decode, Encode};
use compio::fs;
use metrohash::MetroHash64;
use snafu::{ResultExt, Snafu};
use tracing::{debug, warn};

use crate::ext::LogPathExt;

const STANDARD_SNAPSHOT_DIR: &str = ".dockhand/snapshots";

/// Cached last-known content of tracked files, keyed by their
/// project-relative path. The comparison baseline for the change gate.
pub trait SnapshotStore {
    /// Returns the cached content for `name`, or `None` if no entry exists.
    async fn read_entry(&self, name: &str) -> Result<Option<Vec<u8>>, SnapshotStoreError>;

    /// Creates or overwrites the entry for `name`.
    async fn write_entry(&mut self, name: &str, content: &[u8]) -> Result<(), SnapshotStoreError>;
}

/// One persisted snapshot entry. The tracked path is embedded so a hash
/// collision in the entry file name cannot be mistaken for a valid entry.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
struct SnapshotEntry {
    tracked_path: String,
    content: Vec<u8>,
}

/// On-disk [`SnapshotStore`], one zstd-compressed bincode record per entry.
/// Not meant to be hand-edited; an unreadable entry is treated as absent.
#[derive(Debug, Clone)]
pub struct DiskSnapshotStore {
    dir: PathBuf,
}

impl DiskSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The store at the standard side-channel location under the project root.
    pub fn standard() -> Self {
        Self::new(STANDARD_SNAPSHOT_DIR)
    }

    fn entry_path(&self, name: &str) -> PathBuf {
        let mut hasher = MetroHash64::default();
        hasher.write(name.as_bytes());
        self.dir.join(format!("{:016x}.snap", hasher.finish()))
    }
}

impl SnapshotStore for DiskSnapshotStore {
    async fn read_entry(&self, name: &str) -> Result<Option<Vec<u8>>, SnapshotStoreError> {
        let path = self.entry_path(name);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No snapshot entry for '{}'", name);
                return Ok(None);
            }
            Err(err) => {
                return Err(err).context(ReadSnafu { path });
            }
        };

        let raw = match zstd::decode_all(&bytes[..]) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    "Snapshot entry {} is not valid zstd data, treating as absent: {}",
                    path.display_for_log(),
                    err
                );
                return Ok(None);
            }
        };

        match bincode::decode_from_slice::<SnapshotEntry, _>(&raw, bincode::config::standard()) {
            Ok((entry, _)) if entry.tracked_path == name => Ok(Some(entry.content)),
            Ok((entry, _)) => {
                warn!(
                    "Snapshot entry {} belongs to '{}', not '{}', treating as absent",
                    path.display_for_log(),
                    entry.tracked_path,
                    name
                );
                Ok(None)
            }
            Err(err) => {
                warn!(
                    "Snapshot entry {} failed to decode, treating as absent: {}",
                    path.display_for_log(),
                    err
                );
                Ok(None)
            }
        }
    }

    async fn write_entry(&mut self, name: &str, content: &[u8]) -> Result<(), SnapshotStoreError> {
        fs::create_dir_all(&self.dir)
            .await
            .context(CreateDirSnafu { path: self.dir.clone() })?;

        let entry = SnapshotEntry {
            tracked_path: name.to_string(),
            content: content.to_vec(),
        };
        let raw = bincode::encode_to_vec(&entry, bincode::config::standard())
            .context(EncodeSnafu { tracked_path: name.to_string() })?;
        let bytes = zstd::encode_all(&raw[..], zstd::DEFAULT_COMPRESSION_LEVEL)
            .context(CompressSnafu { tracked_path: name.to_string() })?;

        let path = self.entry_path(name);
        debug!("Writing snapshot entry for '{}' to {}", name, path.display_for_log());
        fs::write(&path, bytes).await.0.context(WriteSnafu { path })?;

        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum SnapshotStoreError {
    #[snafu(display("Failed to read snapshot entry {}", path.display_for_log()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write snapshot entry {}", path.display_for_log()))]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to create snapshot directory {}", path.display_for_log()))]
    CreateDirError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to encode snapshot entry for '{}'", tracked_path))]
    EncodeError {
        tracked_path: String,
        source: bincode::error::EncodeError,
    },
    #[snafu(display("Failed to compress snapshot entry for '{}'", tracked_path))]
    CompressError {
        tracked_path: String,
        source: std::io::Error,
    },
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;

    use super::{SnapshotStore, SnapshotStoreError};

    /// In-memory store substitute for deterministic gate tests.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct MemorySnapshotStore {
        entries: HashMap<String, Vec<u8>>,
    }

    impl MemorySnapshotStore {
        pub fn entry(&self, name: &str) -> Option<&[u8]> {
            self.entries.get(name).map(Vec::as_slice)
        }
    }

    impl SnapshotStore for MemorySnapshotStore {
        async fn read_entry(&self, name: &str) -> Result<Option<Vec<u8>>, SnapshotStoreError> {
            Ok(self.entries.get(name).cloned())
        }

        async fn write_entry(
            &mut self,
            name: &str,
            content: &[u8],
        ) -> Result<(), SnapshotStoreError> {
            self.entries.insert(name.to_string(), content.to_vec());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn store_in(dir: &Path) -> DiskSnapshotStore {
        DiskSnapshotStore::new(dir.join("snapshots"))
    }

    #[compio::test]
    async fn missing_entry_reads_as_none() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = store_in(temp_dir.path());

        let entry = store.read_entry("requirements.txt").await.unwrap();

        assert!(entry.is_none());
    }

    #[compio::test]
    async fn written_entry_reads_back_byte_identical() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut store = store_in(temp_dir.path());

        store.write_entry("requirements.txt", b"numpy==1.0\n").await.unwrap();
        let entry = store.read_entry("requirements.txt").await.unwrap();

        assert_eq!(entry.as_deref(), Some(&b"numpy==1.0\n"[..]));
    }

    #[compio::test]
    async fn overwrite_replaces_the_previous_content() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut store = store_in(temp_dir.path());

        store.write_entry("requirements.txt", b"numpy==1.0\n").await.unwrap();
        store.write_entry("requirements.txt", b"numpy==1.1\n").await.unwrap();
        let entry = store.read_entry("requirements.txt").await.unwrap();

        assert_eq!(entry.as_deref(), Some(&b"numpy==1.1\n"[..]));
    }

    #[compio::test]
    async fn entries_survive_reopening_the_store() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        {
            let mut store = store_in(temp_dir.path());
            store.write_entry("environment.yml", b"name: train\n").await.unwrap();
        }

        let reopened = store_in(temp_dir.path());
        let entry = reopened.read_entry("environment.yml").await.unwrap();

        assert_eq!(entry.as_deref(), Some(&b"name: train\n"[..]));
    }

    #[compio::test]
    async fn entries_for_different_paths_do_not_collide() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut store = store_in(temp_dir.path());

        store.write_entry("requirements.txt", b"a").await.unwrap();
        store.write_entry("environment.yml", b"b").await.unwrap();

        assert_eq!(
            store.read_entry("requirements.txt").await.unwrap().as_deref(),
            Some(&b"a"[..])
        );
        assert_eq!(
            store.read_entry("environment.yml").await.unwrap().as_deref(),
            Some(&b"b"[..])
        );
    }

    #[compio::test]
    async fn corrupt_entry_is_treated_as_absent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut store = store_in(temp_dir.path());

        store.write_entry("requirements.txt", b"numpy==1.0\n").await.unwrap();

        // Clobber the single entry file with garbage.
        let entry_file = std::fs::read_dir(temp_dir.path().join("snapshots"))
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        std::fs::write(&entry_file, b"not a snapshot").unwrap();

        let entry = store.read_entry("requirements.txt").await.unwrap();

        assert!(entry.is_none());
    }
}
