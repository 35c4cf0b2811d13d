//! The task model and its constraint DSL.

mod splitter;
mod validator;

pub use splitter::{split, SplitValidators};
pub use validator::TaskValidator;

use chrono::{DateTime, Duration, Utc};

use crate::function::PowerUsageFunction;

/// A deferrable load: a power-consumption profile and an optional
/// constraint on when it may start. Immutable once constructed; `id` is
/// opaque to the engine but is required by the recommender to report
/// per-task worst-case cost across discarded alternatives.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: Option<String>,
    pub power: PowerUsageFunction,
    pub validator: Option<TaskValidator>,
}

impl Task {
    pub fn new(id: Option<String>, power: PowerUsageFunction, validator: Option<TaskValidator>) -> Self {
        Self { id, power, validator }
    }

    pub fn duration(&self) -> Duration {
        self.power.duration()
    }

    pub fn validate(&self, at: DateTime<Utc>) -> bool {
        match &self.validator {
            Some(v) => v.validate(self.duration(), at),
            None => true,
        }
    }

    /// Candidate starts this task's own validator seeds, independent of
    /// the price curve or any committed task (spec.md §4.6).
    pub fn seed_starts(&self) -> Vec<DateTime<Utc>> {
        match &self.validator {
            Some(v) => v.seed_starts(self.duration()),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DatetimeInterval;

    fn at(hour: u32) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2021-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            + Duration::hours(hour as i64)
    }

    #[test]
    fn unconstrained_task_validates_everywhere() {
        let task = Task::new(
            None,
            PowerUsageFunction::constant(Duration::hours(1), 1.0).unwrap(),
            None,
        );
        assert!(task.validate(at(0)));
        assert!(task.validate(at(100)));
        assert!(task.seed_starts().is_empty());
    }

    #[test]
    fn constrained_task_delegates_to_its_validator() {
        let task = Task::new(
            Some("t1".into()),
            PowerUsageFunction::constant(Duration::hours(1), 1.0).unwrap(),
            Some(TaskValidator::MustStartBetween(DatetimeInterval::new(
                at(1),
                Duration::hours(2),
            ))),
        );
        assert!(task.validate(at(2)));
        assert!(!task.validate(at(10)));
        assert_eq!(task.seed_starts(), vec![at(1), at(3)]);
    }
}
