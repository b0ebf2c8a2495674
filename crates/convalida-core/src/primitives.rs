//! # Engine Primitives
//!
//! Fixed constants of the equivalence engine and the snapshot format.
//! These are compiled in and immutable at runtime.

/// Lower bound of a partial rule's coverage after clamping.
pub const MIN_COVERAGE: i64 = 0;

/// Upper bound of a partial rule's coverage after clamping.
///
/// A partial rule clamped to exactly this value also recognizes its targets.
pub const FULL_COVERAGE: i64 = 100;

/// Default file name for exported snapshots.
pub const SNAPSHOT_FILE_NAME: &str = "mallas_icoc_snapshot.json";

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum size of a snapshot payload accepted by import (8 MiB).
///
/// Checked before parsing. Real snapshots are a few tens of kilobytes.
pub const MAX_SNAPSHOT_SIZE: usize = 8 * 1024 * 1024;
