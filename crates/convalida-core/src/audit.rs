//! # Data-Quality Audit
//!
//! Advisory checks over a [`CurriculumStore`]. The engine never defends
//! against bad data (unknown codes simply never match, or are recognized
//! without credits); this module only reports it so a loader or operator can
//! act on it.
//!
//! Issues are reported in a fixed order: duplicate codes (origin, then
//! destination), then per-rule issues in rule declaration order.

use crate::engine::EquivalenceEngine;
use crate::primitives::{FULL_COVERAGE, MIN_COVERAGE};
use crate::store::PlanSide;
use crate::{CourseCode, Curriculum, CurriculumStore, RuleKind};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// One finding of the audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum DataIssue {
    /// A code appears more than once in one curriculum.
    DuplicateCourseCode { side: PlanSide, code: CourseCode },
    /// Two rules share an id.
    DuplicateRuleId { rule_id: String },
    /// A rule source is not an origin course; the rule can never match.
    UnknownSource { rule_id: String, code: CourseCode },
    /// A rule target is not a destination course; it earns no credits.
    UnknownTarget { rule_id: String, code: CourseCode },
    /// A rule with no sources matches unconditionally.
    EmptySources { rule_id: String },
    /// A rule with no targets has no effect.
    EmptyTargets { rule_id: String },
    /// Elective rules are declared but not applied by the engine.
    ElectiveNotApplied { rule_id: String },
    /// The rule kind is not in the vocabulary; the rule is never applied.
    UnrecognizedKind { rule_id: String, kind: String },
    /// A partial rule's coverage is missing or outside `[0, 100]`.
    CoverageOutOfRange {
        rule_id: String,
        coverage: Option<i64>,
        effective: u8,
    },
}

impl DataIssue {
    /// Snake-case name of the finding, identical to the serialized `issue` tag.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateCourseCode { .. } => "duplicate_course_code",
            Self::DuplicateRuleId { .. } => "duplicate_rule_id",
            Self::UnknownSource { .. } => "unknown_source",
            Self::UnknownTarget { .. } => "unknown_target",
            Self::EmptySources { .. } => "empty_sources",
            Self::EmptyTargets { .. } => "empty_targets",
            Self::ElectiveNotApplied { .. } => "elective_not_applied",
            Self::UnrecognizedKind { .. } => "unrecognized_kind",
            Self::CoverageOutOfRange { .. } => "coverage_out_of_range",
        }
    }
}

impl fmt::Display for DataIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateCourseCode { side, code } => {
                write!(f, "{} curriculum lists course {} more than once", side, code)
            }
            Self::DuplicateRuleId { rule_id } => write!(f, "rule id {} is not unique", rule_id),
            Self::UnknownSource { rule_id, code } => write!(
                f,
                "rule {}: source {} is not in the origin curriculum",
                rule_id, code
            ),
            Self::UnknownTarget { rule_id, code } => write!(
                f,
                "rule {}: target {} is not in the destination curriculum",
                rule_id, code
            ),
            Self::EmptySources { rule_id } => {
                write!(f, "rule {}: no sources, always satisfied", rule_id)
            }
            Self::EmptyTargets { rule_id } => write!(f, "rule {}: no targets", rule_id),
            Self::ElectiveNotApplied { rule_id } => {
                write!(f, "rule {}: elective rules are not applied", rule_id)
            }
            Self::UnrecognizedKind { rule_id, kind } => {
                write!(f, "rule {}: unrecognized kind {:?}, not applied", rule_id, kind)
            }
            Self::CoverageOutOfRange {
                rule_id,
                coverage,
                effective,
            } => match coverage {
                Some(raw) => write!(
                    f,
                    "rule {}: coverage {} outside [0, 100], applied as {}",
                    rule_id, raw, effective
                ),
                None => write!(f, "rule {}: coverage missing, applied as {}", rule_id, effective),
            },
        }
    }
}

/// Run every check over a store.
#[must_use]
pub fn audit(store: &CurriculumStore) -> Vec<DataIssue> {
    let mut issues = Vec::new();
    duplicate_codes(store.origin(), PlanSide::Origin, &mut issues);
    duplicate_codes(store.destination(), PlanSide::Destination, &mut issues);

    let mut seen_ids = BTreeSet::new();
    for rule in store.rules() {
        let rule_id = || rule.id.clone();

        if !seen_ids.insert(rule.id.as_str()) {
            issues.push(DataIssue::DuplicateRuleId { rule_id: rule_id() });
        }

        match &rule.kind {
            RuleKind::Elective => issues.push(DataIssue::ElectiveNotApplied { rule_id: rule_id() }),
            RuleKind::Unrecognized(kind) => issues.push(DataIssue::UnrecognizedKind {
                rule_id: rule_id(),
                kind: kind.clone(),
            }),
            RuleKind::Partial => {
                let in_range = rule
                    .coverage
                    .is_some_and(|c| (MIN_COVERAGE..=FULL_COVERAGE).contains(&c));
                if !in_range {
                    issues.push(DataIssue::CoverageOutOfRange {
                        rule_id: rule_id(),
                        coverage: rule.coverage,
                        effective: EquivalenceEngine::clamp_coverage(rule.coverage),
                    });
                }
            }
            RuleKind::OneToOne | RuleKind::ManyToOne | RuleKind::OneToMany => {}
        }

        if rule.sources.is_empty() {
            issues.push(DataIssue::EmptySources { rule_id: rule_id() });
        }
        if rule.targets.is_empty() {
            issues.push(DataIssue::EmptyTargets { rule_id: rule_id() });
        }

        for code in rule.sources.iter().filter(|c| !store.origin().contains(c)) {
            issues.push(DataIssue::UnknownSource {
                rule_id: rule_id(),
                code: code.clone(),
            });
        }
        for code in rule
            .targets
            .iter()
            .filter(|c| !store.destination().contains(c))
        {
            issues.push(DataIssue::UnknownTarget {
                rule_id: rule_id(),
                code: code.clone(),
            });
        }
    }

    issues
}

fn duplicate_codes(curriculum: &Curriculum, side: PlanSide, issues: &mut Vec<DataIssue>) {
    let mut seen: BTreeSet<&CourseCode> = BTreeSet::new();
    let mut reported: BTreeSet<&CourseCode> = BTreeSet::new();
    for course in &curriculum.courses {
        if !seen.insert(&course.code) && reported.insert(&course.code) {
            issues.push(DataIssue::DuplicateCourseCode {
                side,
                code: course.code.clone(),
            });
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
