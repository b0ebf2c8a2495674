//! # convalida-core
//!
//! The curriculum equivalence engine - THE LOGIC.
//!
//! Given an origin and a destination curriculum, a flat list of declared
//! equivalence rules and the set of origin courses a student has completed,
//! this crate computes which destination courses are recognized, the
//! partial-credit records, the earned credits and per-category progress.
//!
//! ## Components
//!
//! - `types` → data model and error type
//! - `store` → the two curricula and the rule set
//! - `engine` → rule resolution (the core)
//! - `progress` → per-category credit rollup
//! - `formats` → JSON snapshot export/import
//! - `session` → owned editable state with cached resolution
//! - `layout` → term grouping for display
//! - `audit` → advisory data-quality checks
//!
//! ## Architectural Constraints
//!
//! - No async, no network, no logging dependencies (pure Rust)
//! - Deterministic: ordered collections only, integer arithmetic only
//! - Engine, aggregator and audit are total functions
//!
//! ## Example
//!
//! ```
//! use convalida_core::{CourseCode, Session};
//!
//! let mut session = Session::sample().expect("built-in sample");
//! session.toggle(CourseCode::new("CAL-103"));
//!
//! let resolution = session.resolution();
//! assert!(resolution.is_satisfied(&CourseCode::new("CVV-300")));
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod audit;
pub mod engine;
pub mod formats;
pub mod layout;
pub mod primitives;
pub mod progress;
pub mod session;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Category, ConvalidaError, Course, CourseCode, Curriculum, Rule, RuleKind, Term,
};

// =============================================================================
// RE-EXPORTS: Engine, Aggregator, State
// =============================================================================

pub use audit::{DataIssue, audit};
pub use engine::{EquivalenceEngine, PartialCredit, Resolution};
pub use layout::{TermGroup, group_by_term};
pub use progress::{CategoryProgress, ProgressAggregator, ProgressReport};
pub use session::Session;
pub use store::{CurriculumStore, PlanSide};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

#[cfg(feature = "crypto-hash")]
pub use formats::snapshot_checksum;
pub use formats::{Snapshot, SnapshotPatch};
