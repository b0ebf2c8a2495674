//! # Term Layout
//!
//! Groups a curriculum's courses by term for display. Groups are sorted by
//! numeric term (the unscheduled sentinel `0` first); courses keep their
//! declaration order inside a group.

use crate::{Course, Curriculum, Term};
use serde::Serialize;
use std::collections::BTreeMap;

/// Courses sharing one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermGroup<'a> {
    /// The shared term.
    pub term: Term,
    /// Courses in declaration order.
    pub courses: Vec<&'a Course>,
}

impl TermGroup<'_> {
    /// Sum of credits in the group.
    #[must_use]
    pub fn credits(&self) -> u32 {
        self.courses
            .iter()
            .fold(0u32, |acc, c| acc.saturating_add(c.credits))
    }
}

/// Group a curriculum's courses by term.
#[must_use]
pub fn group_by_term(curriculum: &Curriculum) -> Vec<TermGroup<'_>> {
    let mut groups: BTreeMap<Term, Vec<&Course>> = BTreeMap::new();
    for course in &curriculum.courses {
        groups.entry(course.term).or_default().push(course);
    }
    groups
        .into_iter()
        .map(|(term, courses)| TermGroup { term, courses })
        .collect()
}
