//! # Session Module
//!
//! The single owned state object a presentation layer talks to: the
//! curriculum store plus the completion set.
//!
//! Mutations:
//! - `toggle` adds a code if absent, removes it if present
//! - `reset_all` clears the completion set
//! - `replace_*` substitute a curriculum or the rule set wholesale
//! - `import_snapshot` / `apply_patch` replace whichever fields are present
//!
//! Each mutation is a single state transition. The resolution is cached and
//! the cache is dropped by every mutation, so reads never observe a result
//! older than the last mutation.

use crate::engine::{EquivalenceEngine, Resolution};
use crate::formats::{Snapshot, SnapshotPatch};
use crate::progress::{ProgressAggregator, ProgressReport};
use crate::{ConvalidaError, CourseCode, Curriculum, CurriculumStore, Rule};
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Editable state: curricula, rules and completed origin courses.
#[derive(Debug, Default)]
pub struct Session {
    store: CurriculumStore,
    completed: BTreeSet<CourseCode>,
    resolution: OnceLock<Resolution>,
}

impl Session {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session over an existing store with nothing completed.
    #[must_use]
    pub fn with_store(store: CurriculumStore) -> Self {
        Self {
            store,
            completed: BTreeSet::new(),
            resolution: OnceLock::new(),
        }
    }

    /// Create a session from a full snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let (store, completed) = snapshot.into_parts();
        Self {
            store,
            completed,
            resolution: OnceLock::new(),
        }
    }

    /// Create a session holding the built-in ICOC sample.
    pub fn sample() -> Result<Self, ConvalidaError> {
        Snapshot::sample().map(Self::from_snapshot)
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// The curricula and rules.
    #[must_use]
    pub fn store(&self) -> &CurriculumStore {
        &self.store
    }

    /// Completed origin codes.
    #[must_use]
    pub fn completed(&self) -> &BTreeSet<CourseCode> {
        &self.completed
    }

    /// Check whether an origin code is marked completed.
    #[must_use]
    pub fn is_completed(&self, code: &CourseCode) -> bool {
        self.completed.contains(code)
    }

    /// Current resolution, computed on first read after a mutation.
    pub fn resolution(&self) -> &Resolution {
        self.resolution.get_or_init(|| {
            EquivalenceEngine::resolve(
                &self.completed,
                self.store.rules(),
                self.store.destination(),
            )
        })
    }

    /// Per-category progress of the destination curriculum.
    #[must_use]
    pub fn progress(&self) -> ProgressReport {
        ProgressAggregator::aggregate(self.store.destination(), &self.resolution().satisfied)
    }

    /// Capture the full editable state.
    #[must_use]
    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.store, &self.completed)
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Flip the completion mark of an origin code.
    ///
    /// Returns `true` if the code is completed afterwards. Codes absent from
    /// the origin curriculum are accepted.
    pub fn toggle(&mut self, code: CourseCode) -> bool {
        let now_completed = if self.completed.remove(&code) {
            false
        } else {
            self.completed.insert(code);
            true
        };
        self.invalidate();
        now_completed
    }

    /// Clear every completion mark.
    pub fn reset_all(&mut self) {
        self.completed.clear();
        self.invalidate();
    }

    /// Replace the origin curriculum.
    pub fn replace_origin(&mut self, origin: Curriculum) {
        self.store.replace_origin(origin);
        self.invalidate();
    }

    /// Replace the destination curriculum.
    pub fn replace_destination(&mut self, destination: Curriculum) {
        self.store.replace_destination(destination);
        self.invalidate();
    }

    /// Replace the rule set.
    pub fn replace_rules(&mut self, rules: Vec<Rule>) {
        self.store.replace_rules(rules);
        self.invalidate();
    }

    /// Replace the completion set.
    pub fn replace_completed(&mut self, completed: impl IntoIterator<Item = CourseCode>) {
        self.completed = completed.into_iter().collect();
        self.invalidate();
    }

    /// Parse an import payload and apply it.
    ///
    /// On any error the session is left unchanged.
    pub fn import_snapshot(&mut self, bytes: &[u8]) -> Result<(), ConvalidaError> {
        let patch = SnapshotPatch::from_json_bytes(bytes)?;
        self.apply_patch(patch);
        Ok(())
    }

    /// Apply the fields present in a patch; absent fields are untouched.
    pub fn apply_patch(&mut self, patch: SnapshotPatch) {
        let SnapshotPatch {
            plan_origen,
            plan_destino,
            reglas,
            aprobados,
        } = patch;

        if let Some(origin) = plan_origen {
            self.store.replace_origin(origin);
        }
        if let Some(destination) = plan_destino {
            self.store.replace_destination(destination);
        }
        if let Some(rules) = reglas {
            self.store.replace_rules(rules);
        }
        if let Some(completed) = aprobados {
            self.completed = completed.into_iter().collect();
        }
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.resolution = OnceLock::new();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Course, RuleKind};

    fn session() -> Session {
        let store = CurriculumStore::new(
            Curriculum::new("o", "Origin", vec![Course::new("A", "A", "FB", 6, 1)]),
            Curriculum::new(
                "d",
                "Dest",
                vec![
                    Course::new("X", "X", "FB", 5, 1),
                    Course::new("Y", "Y", "FD", 3, 2),
                ],
            ),
            vec![Rule::new("R1", RuleKind::OneToOne, &["A"], &["X"])],
        );
        Session::with_store(store)
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut session = session();
        let code = CourseCode::new("A");

        assert!(session.toggle(code.clone()));
        assert!(session.is_completed(&code));
        assert!(!session.toggle(code.clone()));
        assert!(!session.is_completed(&code));
    }

    #[test]
    fn resolution_follows_mutations() {
        let mut session = session();
        assert_eq!(session.resolution().earned_credits, 0);

        session.toggle(CourseCode::new("A"));
        assert_eq!(session.resolution().earned_credits, 5);

        session.replace_rules(Vec::new());
        assert_eq!(session.resolution().earned_credits, 0);
    }

    #[test]
    fn reset_clears_completions_only() {
        let mut session = session();
        session.toggle(CourseCode::new("A"));
        session.reset_all();

        assert!(session.completed().is_empty());
        assert_eq!(session.store().rules().len(), 1);
        assert_eq!(session.resolution().pending_count(), 2);
    }

    #[test]
    fn failed_import_leaves_state_unchanged() {
        let mut session = session();
        session.toggle(CourseCode::new("A"));
        let before = session.export_snapshot();

        let result = session.import_snapshot(b"definitely not json");
        assert!(matches!(result, Err(ConvalidaError::InvalidSnapshotFormat)));
        assert_eq!(session.export_snapshot(), before);
    }

    #[test]
    fn positional_array_import_keeps_rules() {
        let mut session = Session::sample().expect("sample");
        let before = session.export_snapshot();

        let result = session.import_snapshot(br#"[null, null, [], ["CAL-103"]]"#);
        assert!(matches!(result, Err(ConvalidaError::InvalidSnapshotFormat)));
        assert_eq!(session.store().rules().len(), 30);
        assert!(session.completed().is_empty());
        assert_eq!(session.export_snapshot(), before);

        assert!(session.import_snapshot(b"[]").is_err());
        assert_eq!(session.export_snapshot(), before);
    }

    #[test]
    fn progress_uses_current_resolution() {
        let mut session = session();
        session.toggle(CourseCode::new("A"));
        let report = session.progress();

        assert_eq!(report.earned(), 5);
        assert_eq!(report.total(), 8);
    }

    #[test]
    fn sample_session_starts_empty() {
        let session = Session::sample().expect("sample");
        assert!(session.completed().is_empty());
        assert_eq!(session.resolution().earned_credits, 0);
        assert_eq!(session.resolution().pending_count(), 49);
    }
}
