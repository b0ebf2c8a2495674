//! # Curriculum Store
//!
//! Holds the origin curriculum, the destination curriculum and the rule set
//! as one coherent snapshot. The only mutations are wholesale replacements;
//! no validation is performed on replacement.

use crate::{Curriculum, Rule};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which of the two curricula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanSide {
    /// The curriculum completions are marked against.
    Origin,
    /// The curriculum recognition is computed for.
    Destination,
}

impl PlanSide {
    /// Lowercase name, as used on the command line and in URLs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanSide::Origin => "origin",
            PlanSide::Destination => "destination",
        }
    }
}

impl fmt::Display for PlanSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "origin" | "origen" => Ok(PlanSide::Origin),
            "destination" | "destino" => Ok(PlanSide::Destination),
            other => Err(format!(
                "Unknown plan side: {}. Use: origin, destination",
                other
            )),
        }
    }
}

/// The two curricula and the rule set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CurriculumStore {
    origin: Curriculum,
    destination: Curriculum,
    rules: Vec<Rule>,
}

impl CurriculumStore {
    /// Create a store from its parts.
    #[must_use]
    pub fn new(origin: Curriculum, destination: Curriculum, rules: Vec<Rule>) -> Self {
        Self {
            origin,
            destination,
            rules,
        }
    }

    /// The curriculum completions are marked against.
    #[must_use]
    pub fn origin(&self) -> &Curriculum {
        &self.origin
    }

    /// The curriculum recognition is computed for.
    #[must_use]
    pub fn destination(&self) -> &Curriculum {
        &self.destination
    }

    /// One of the two curricula.
    #[must_use]
    pub fn curriculum(&self, side: PlanSide) -> &Curriculum {
        match side {
            PlanSide::Origin => &self.origin,
            PlanSide::Destination => &self.destination,
        }
    }

    /// Rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Replace the origin curriculum.
    pub fn replace_origin(&mut self, origin: Curriculum) {
        self.origin = origin;
    }

    /// Replace the destination curriculum.
    pub fn replace_destination(&mut self, destination: Curriculum) {
        self.destination = destination;
    }

    /// Replace the whole rule set.
    pub fn replace_rules(&mut self, rules: Vec<Rule>) {
        self.rules = rules;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Course, RuleKind};

    #[test]
    fn replacements_are_wholesale() {
        let mut store = CurriculumStore::default();
        assert!(store.origin().is_empty());

        let plan = Curriculum::new("o", "Origin", vec![Course::new("A", "A", "FB", 5, 1)]);
        store.replace_origin(plan.clone());
        assert_eq!(store.origin(), &plan);
        assert!(store.destination().is_empty());

        store.replace_rules(vec![Rule::new("R1", RuleKind::OneToOne, &["A"], &["B"])]);
        assert_eq!(store.rules().len(), 1);

        store.replace_rules(Vec::new());
        assert!(store.rules().is_empty());
    }

    #[test]
    fn plan_side_parses_both_vocabularies() {
        assert_eq!("origin".parse::<PlanSide>(), Ok(PlanSide::Origin));
        assert_eq!("destino".parse::<PlanSide>(), Ok(PlanSide::Destination));
        assert!("sideways".parse::<PlanSide>().is_err());
        assert_eq!(PlanSide::Destination.to_string(), "destination");
    }
}
