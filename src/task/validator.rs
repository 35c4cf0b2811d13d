use chrono::{DateTime, Duration, Utc};

use crate::domain::DatetimeInterval;

/// A predicate tree over a task's start instant that also seeds candidate
/// starts for the scheduler. Leaves check `at` (and, for
/// `MustEndBetween`, `at + duration`) against an interval; composites
/// combine their children the way the boolean operator they're named for
/// suggests.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskValidator {
    MustStartBetween(DatetimeInterval),
    MustEndBetween(DatetimeInterval),
    Conjunction(Vec<TaskValidator>),
    Disjunction(Vec<TaskValidator>),
}

impl TaskValidator {
    pub fn validate(&self, duration: Duration, at: DateTime<Utc>) -> bool {
        match self {
            TaskValidator::MustStartBetween(interval) => interval.contains(at),
            TaskValidator::MustEndBetween(interval) => interval.contains(at + duration),
            TaskValidator::Conjunction(children) => {
                children.iter().all(|c| c.validate(duration, at))
            }
            TaskValidator::Disjunction(children) => {
                children.iter().any(|c| c.validate(duration, at))
            }
        }
    }

    /// Candidate start instants this validator's own intervals suggest,
    /// independent of any other task or the price curve: the endpoints of
    /// `MustStartBetween` intervals as-is, and the endpoints of
    /// `MustEndBetween` intervals shifted back by `duration`. Composites
    /// intersect (`Conjunction`) or union (`Disjunction`) their children's
    /// seed lists.
    pub fn seed_starts(&self, duration: Duration) -> Vec<DateTime<Utc>> {
        match self {
            TaskValidator::MustStartBetween(interval) => {
                vec![interval.start, interval.end()]
            }
            TaskValidator::MustEndBetween(interval) => {
                vec![interval.start - duration, interval.end() - duration]
            }
            TaskValidator::Conjunction(children) => {
                let mut iter = children.iter();
                let Some(first) = iter.next() else {
                    return Vec::new();
                };
                let mut acc = first.seed_starts(duration);
                for child in iter {
                    let seeds = child.seed_starts(duration);
                    acc.retain(|s| seeds.contains(s));
                }
                acc
            }
            TaskValidator::Disjunction(children) => {
                let mut acc: Vec<DateTime<Utc>> = Vec::new();
                for child in children {
                    for s in child.seed_starts(duration) {
                        if !acc.contains(&s) {
                            acc.push(s);
                        }
                    }
                }
                acc
            }
        }
    }
}
