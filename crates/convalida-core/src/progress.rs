//! # Progress Aggregator
//!
//! Per-category credit rollup of a destination curriculum against a set of
//! recognized course codes.
//!
//! Categories are derived from the curriculum itself, in first-seen order.
//! Percentages use integer arithmetic only: `round(100 * earned / total)`
//! with halves rounded up, and 0% when a category has no credits.

use crate::{Category, CourseCode, Curriculum};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Earned versus total credits for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProgress {
    /// Category label.
    pub category: Category,
    /// Credits of recognized courses in this category.
    pub earned: u32,
    /// Credits of all courses in this category.
    pub total: u32,
}

impl CategoryProgress {
    /// Percent complete, rounded to the nearest integer. 0 when `total` is 0.
    #[must_use]
    pub fn percent(&self) -> u8 {
        percent_of(self.earned, self.total)
    }
}

/// Category rollup of a destination curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProgressReport {
    /// One entry per distinct category, in first-seen order.
    pub categories: Vec<CategoryProgress>,
}

impl ProgressReport {
    /// Look up the entry for a category.
    #[must_use]
    pub fn get(&self, category: &Category) -> Option<&CategoryProgress> {
        self.categories.iter().find(|c| &c.category == category)
    }

    /// Sum of earned credits over all categories.
    #[must_use]
    pub fn earned(&self) -> u32 {
        self.categories
            .iter()
            .fold(0u32, |acc, c| acc.saturating_add(c.earned))
    }

    /// Sum of total credits over all categories.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.categories
            .iter()
            .fold(0u32, |acc, c| acc.saturating_add(c.total))
    }

    /// Overall percent complete.
    #[must_use]
    pub fn percent(&self) -> u8 {
        percent_of(self.earned(), self.total())
    }
}

/// Stateless category aggregator.
pub struct ProgressAggregator;

impl ProgressAggregator {
    /// Roll up credits per category.
    #[must_use]
    pub fn aggregate(destination: &Curriculum, resolved: &BTreeSet<CourseCode>) -> ProgressReport {
        let mut categories: Vec<CategoryProgress> = Vec::new();

        for course in &destination.courses {
            let index = match categories
                .iter()
                .position(|c| c.category == course.category)
            {
                Some(index) => index,
                None => {
                    categories.push(CategoryProgress {
                        category: course.category.clone(),
                        earned: 0,
                        total: 0,
                    });
                    categories.len() - 1
                }
            };

            let entry = &mut categories[index];
            entry.total = entry.total.saturating_add(course.credits);
            if resolved.contains(&course.code) {
                entry.earned = entry.earned.saturating_add(course.credits);
            }
        }

        ProgressReport { categories }
    }
}

/// `round(100 * part / whole)` in integer arithmetic, 0 when `whole` is 0.
fn percent_of(part: u32, whole: u32) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = u64::from(part);
    let whole = u64::from(whole);
    let rounded = (part.saturating_mul(200).saturating_add(whole)) / whole.saturating_mul(2);
    rounded.min(u64::from(u8::MAX)) as u8
}

// =============================================================================
// TESTS
// =============================================================================
