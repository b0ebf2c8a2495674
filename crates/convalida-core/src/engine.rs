//! # Equivalence Engine
//!
//! Resolves which destination courses are recognized from a set of
//! completed origin courses.
//!
//! ## Algorithm
//!
//! A rule is satisfied when every one of its source codes is completed.
//! Rules are processed in four passes, filtered by kind, in this order:
//!
//! 1. `1:1`
//! 2. `N:1`
//! 3. `1:N`
//! 4. `parcial`
//!
//! Satisfied rules of the first three passes recognize all their targets.
//! Satisfied partial rules append one [`PartialCredit`] per target with the
//! coverage clamped to `[0, 100]` (missing counts as 0); at exactly 100 the
//! target is also recognized.
//!
//! `electivo` rules and unrecognized kinds are never applied.
//!
//! Unknown codes are not errors: a rule whose sources are absent never
//! matches, and a target absent from the destination curriculum is
//! recognized but contributes no credits.

use crate::primitives::{FULL_COVERAGE, MIN_COVERAGE};
use crate::{CourseCode, Curriculum, Rule, RuleKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// RESOLUTION RESULT
// =============================================================================

/// One partial-credit record produced by a satisfied partial rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialCredit {
    /// Destination course the coverage applies to.
    pub code: CourseCode,
    /// Clamped coverage in `[0, 100]`.
    pub coverage: u8,
    /// The rule's note, or empty.
    pub note: String,
    /// Id of the rule that produced the record.
    pub rule_id: String,
}

/// Outcome of resolving a completion set against the rules.
///
/// Derived data: recomputed from scratch, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Resolution {
    /// Recognized destination codes.
    ///
    /// May contain codes absent from the destination curriculum.
    pub satisfied: BTreeSet<CourseCode>,
    /// Partial-credit records in rule declaration order.
    pub partials: Vec<PartialCredit>,
    /// Sum of credits over recognized destination courses.
    pub earned_credits: u32,
    /// Destination codes not recognized, in curriculum declaration order.
    pub unsatisfied: Vec<CourseCode>,
}

impl Resolution {
    /// Check whether a destination course is recognized.
    #[must_use]
    pub fn is_satisfied(&self, code: &CourseCode) -> bool {
        self.satisfied.contains(code)
    }

    /// Number of recognized destination codes.
    #[must_use]
    pub fn recognized_count(&self) -> usize {
        self.satisfied.len()
    }

    /// Number of destination courses still pending.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.unsatisfied.len()
    }

    /// Partial records for one destination course.
    pub fn partials_for<'a>(
        &'a self,
        code: &'a CourseCode,
    ) -> impl Iterator<Item = &'a PartialCredit> + 'a {
        self.partials.iter().filter(move |p| &p.code == code)
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// Stateless equivalence resolver.
pub struct EquivalenceEngine;

impl EquivalenceEngine {
    /// Resolve a completion set against the rules and destination curriculum.
    ///
    /// Total and pure: same inputs always produce the same output.
    #[must_use]
    pub fn resolve(
        completed: &BTreeSet<CourseCode>,
        rules: &[Rule],
        destination: &Curriculum,
    ) -> Resolution {
        let mut satisfied = BTreeSet::new();
        let mut partials = Vec::new();

        for kind in &RuleKind::FULL_CREDIT_PASSES {
            for rule in Self::satisfied_of_kind(rules, kind, completed) {
                satisfied.extend(rule.targets.iter().cloned());
            }
        }

        for rule in Self::satisfied_of_kind(rules, &RuleKind::Partial, completed) {
            let coverage = Self::clamp_coverage(rule.coverage);
            let note = rule.note.clone().unwrap_or_default();
            for target in &rule.targets {
                partials.push(PartialCredit {
                    code: target.clone(),
                    coverage,
                    note: note.clone(),
                    rule_id: rule.id.clone(),
                });
            }
            if i64::from(coverage) == FULL_COVERAGE {
                satisfied.extend(rule.targets.iter().cloned());
            }
        }

        let earned_credits = destination
            .courses
            .iter()
            .filter(|c| satisfied.contains(&c.code))
            .fold(0u32, |acc, c| acc.saturating_add(c.credits));

        let unsatisfied = destination
            .courses
            .iter()
            .filter(|c| !satisfied.contains(&c.code))
            .map(|c| c.code.clone())
            .collect();

        Resolution {
            satisfied,
            partials,
            earned_credits,
            unsatisfied,
        }
    }

    /// Clamp a raw coverage to `[0, 100]`; missing counts as 0.
    #[must_use]
    pub fn clamp_coverage(raw: Option<i64>) -> u8 {
        // Bounded to [0, 100], so the narrowing cast is exact.
        raw.unwrap_or(MIN_COVERAGE).clamp(MIN_COVERAGE, FULL_COVERAGE) as u8
    }

    /// Satisfied rules of one kind, in declaration order.
    fn satisfied_of_kind<'a>(
        rules: &'a [Rule],
        kind: &'a RuleKind,
        completed: &'a BTreeSet<CourseCode>,
    ) -> impl Iterator<Item = &'a Rule> + 'a {
        rules
            .iter()
            .filter(move |r| &r.kind == kind && r.is_satisfied_by(completed))
    }
}

// =============================================================================
// TESTS
// =============================================================================
