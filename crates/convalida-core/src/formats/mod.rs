//! # Formats Module
//!
//! Transport formats for the editable state. File I/O lives in the app layer.

mod snapshot;

#[cfg(feature = "crypto-hash")]
pub use snapshot::snapshot_checksum;
pub use snapshot::{Snapshot, SnapshotPatch};
