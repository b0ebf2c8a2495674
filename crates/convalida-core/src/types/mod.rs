//! # Core Type Definitions
//!
//! This module contains the data model shared by every part of the engine:
//! - Course identity and labels (`CourseCode`, `Category`, `Term`)
//! - Curriculum structure (`Course`, `Curriculum`)
//! - Equivalence rules (`Rule`, `RuleKind`)
//! - Error types (`ConvalidaError`)
//!
//! ## Wire Names
//!
//! Field names on the wire follow the snapshot file format (`cod`, `nombre`,
//! `bloque`, `sct`, `nivel`, ...). Rust-side names are English.
//!
//! ## Determinism Guarantees
//!
//! - Identifiers implement `Ord` for deterministic ordering in `BTreeSet`
//! - Credit sums use saturating integer arithmetic (no floating-point)

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS & LABELS
// =============================================================================

/// Stable identity of a course inside a curriculum (e.g. `"CAL-103"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseCode(pub String);

impl CourseCode {
    /// Create a new course code from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CourseCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Institution-defined academic category label (e.g. `"FB"`, `"Disciplinar"`).
///
/// Categories are an open set: new curricula may introduce new labels
/// without any schema change.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(pub String);

impl Category {
    /// Create a new category label.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordinal semester a course is nominally taken in.
///
/// `Term(0)` is the sentinel for courses without a fixed term
/// (e.g. a summer practicum).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Term(pub u32);

impl Term {
    /// Courses with no fixed term.
    pub const UNSCHEDULED: Term = Term(0);

    /// Get the raw ordinal.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Check whether the course has a fixed term.
    #[must_use]
    pub const fn is_scheduled(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_scheduled() {
            write!(f, "Semester {}", self.0)
        } else {
            f.write_str("Unscheduled")
        }
    }
}

// =============================================================================
// COURSE
// =============================================================================

/// One credit-bearing unit of a curriculum.
///
/// Courses are immutable once loaded. Identity is the `code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Unique code within the curriculum.
    #[serde(rename = "cod")]
    pub code: CourseCode,
    /// Display name.
    #[serde(rename = "nombre")]
    pub name: String,
    /// Academic category used for progress rollups.
    #[serde(rename = "bloque")]
    pub category: Category,
    /// Institutional credit weight (SCT).
    #[serde(rename = "sct")]
    pub credits: u32,
    /// Nominal semester.
    #[serde(rename = "nivel")]
    pub term: Term,
}

impl Course {
    /// Create a new course.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        credits: u32,
        term: u32,
    ) -> Self {
        Self {
            code: CourseCode::new(code),
            name: name.into(),
            category: Category::new(category),
            credits,
            term: Term(term),
        }
    }
}

// =============================================================================
// CURRICULUM
// =============================================================================

/// An academic program: an ordered list of courses.
///
/// Course codes are expected to be unique. This is not enforced here;
/// see [`crate::audit`] for the advisory check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Curriculum {
    /// Curriculum identifier (e.g. `"icoc-2026"`).
    pub id: String,
    /// Display name.
    #[serde(rename = "nombre")]
    pub name: String,
    /// Courses in declaration order.
    #[serde(rename = "malla")]
    pub courses: Vec<Course>,
}

impl Curriculum {
    /// Create a curriculum from its parts.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, courses: Vec<Course>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            courses,
        }
    }

    /// Find the first course with the given code.
    #[must_use]
    pub fn course(&self, code: &CourseCode) -> Option<&Course> {
        self.courses.iter().find(|c| &c.code == code)
    }

    /// Check whether a course with the given code exists.
    #[must_use]
    pub fn contains(&self, code: &CourseCode) -> bool {
        self.course(code).is_some()
    }

    /// Sum of credits over all courses.
    #[must_use]
    pub fn total_credits(&self) -> u32 {
        self.courses
            .iter()
            .fold(0u32, |acc, c| acc.saturating_add(c.credits))
    }

    /// Distinct category labels in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        let mut seen = BTreeSet::new();
        self.courses
            .iter()
            .filter(|c| seen.insert(&c.category))
            .map(|c| c.category.clone())
            .collect()
    }

    /// Number of courses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    /// Check whether the curriculum has no courses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

// =============================================================================
// EQUIVALENCE RULES
// =============================================================================

/// Multiplicity / credit kind of an equivalence rule.
///
/// Serialized as the wire strings `"1:1"`, `"N:1"`, `"1:N"`, `"parcial"`
/// and `"electivo"`. Any other string is kept as `Unrecognized` so that it
/// survives a snapshot round-trip; such rules are never applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleKind {
    /// One origin course maps to one destination course.
    OneToOne,
    /// All listed origin courses together map to one destination course.
    ManyToOne,
    /// One origin course maps to several destination courses.
    OneToMany,
    /// Origin courses cover a percentage of the destination courses.
    Partial,
    /// Recognized as an elective. Not applied by the engine.
    Elective,
    /// Kind string not in the vocabulary.
    Unrecognized(String),
}

impl RuleKind {
    /// Kinds that grant full recognition, in processing order.
    pub const FULL_CREDIT_PASSES: [RuleKind; 3] =
        [RuleKind::OneToOne, RuleKind::ManyToOne, RuleKind::OneToMany];

    /// Wire representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            RuleKind::OneToOne => "1:1",
            RuleKind::ManyToOne => "N:1",
            RuleKind::OneToMany => "1:N",
            RuleKind::Partial => "parcial",
            RuleKind::Elective => "electivo",
            RuleKind::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for RuleKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "1:1" => RuleKind::OneToOne,
            "N:1" => RuleKind::ManyToOne,
            "1:N" => RuleKind::OneToMany,
            "parcial" => RuleKind::Partial,
            "electivo" => RuleKind::Elective,
            _ => RuleKind::Unrecognized(raw),
        }
    }
}

impl From<RuleKind> for String {
    fn from(kind: RuleKind) -> Self {
        match kind {
            RuleKind::Unrecognized(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared mapping from origin courses to destination courses.
///
/// A rule is satisfied when EVERY source code is completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique rule identifier (e.g. `"R7"`).
    pub id: String,
    /// Rule kind.
    #[serde(rename = "tipo")]
    pub kind: RuleKind,
    /// Origin course codes (all required).
    #[serde(rename = "origen")]
    pub sources: Vec<CourseCode>,
    /// Destination course codes granted.
    #[serde(rename = "destino")]
    pub targets: Vec<CourseCode>,
    /// Coverage percentage, meaningful for partial rules only.
    /// Kept unclamped; the engine clamps to `[0, 100]`.
    #[serde(rename = "cobertura", default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<i64>,
    /// Free-text note.
    #[serde(
        rename = "observaciones",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub note: Option<String>,
}

impl Rule {
    /// Create a rule without coverage or note.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: RuleKind, sources: &[&str], targets: &[&str]) -> Self {
        Self {
            id: id.into(),
            kind,
            sources: sources.iter().map(|s| CourseCode::new(*s)).collect(),
            targets: targets.iter().map(|s| CourseCode::new(*s)).collect(),
            coverage: None,
            note: None,
        }
    }

    /// Set the coverage percentage.
    #[must_use]
    pub fn with_coverage(mut self, coverage: i64) -> Self {
        self.coverage = Some(coverage);
        self
    }

    /// Set the note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Check whether every source code is in `completed`.
    #[must_use]
    pub fn is_satisfied_by(&self, completed: &BTreeSet<CourseCode>) -> bool {
        self.sources.iter().all(|code| completed.contains(code))
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Convalida system.
///
/// The engine, aggregator and audit are total and never produce these;
/// only snapshot I/O, configuration and the app layer do.
#[derive(Debug, Error)]
pub enum ConvalidaError {
    /// The snapshot payload could not be parsed.
    #[error("Invalid snapshot format")]
    InvalidSnapshotFormat,

    /// The snapshot payload exceeds the size limit.
    #[error("Snapshot size {size} bytes exceeds maximum allowed {max} bytes")]
    SnapshotTooLarge { size: usize, max: usize },

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

// =============================================================================
// TESTS
// =============================================================================
