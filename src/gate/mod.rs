mod change_gate;
mod snapshot_store;
mod tracked_file;

pub use change_gate::{ChangeGate, GateError, GateOutcome, RebuildAction};
pub use snapshot_store::{DiskSnapshotStore, SnapshotStore, SnapshotStoreError};
pub use tracked_file::{TrackedFile, TrackedFileError};
