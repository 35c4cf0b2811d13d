//! The schedule model: placements of tasks onto the time axis, and the
//! schedule-level validators that constrain how they may coexist.

mod validator;

pub use validator::ScheduleValidator;

use chrono::{DateTime, Duration, Utc};

use crate::domain::DatetimeInterval;
use crate::error::EngineError;
use crate::function::zipped::WallClockFunction;
use crate::function::PowerWeightedFunction;
use crate::task::Task;

/// One task assigned to a start interval. `start_interval.start` is the
/// earliest admissible start instant for this placement;
/// `start_interval.duration` is the slack over which the cost integral is
/// invariant. `cost` is always the canonical integral evaluated at
/// `start_interval.start` (spec.md §4.5).
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    pub task: Task,
    pub start_interval: DatetimeInterval,
    pub cost: f64,
}

impl ScheduledTask {
    pub fn new(task: Task, start_interval: DatetimeInterval, cost: f64) -> Self {
        Self { task, start_interval, cost }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start_interval.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.start() + self.task.duration()
    }

    /// Half-open running window: `[start, end)`. A task ending exactly at
    /// `t` is not considered running at `t` (spec.md §4.9), so a task
    /// ending when another begins does not conflict.
    pub fn runs_at(&self, t: DateTime<Utc>) -> bool {
        t >= self.start() && t < self.end()
    }

    pub fn power_at(&self, t: DateTime<Utc>) -> f64 {
        if !self.runs_at(t) {
            return 0.0;
        }
        self.task
            .power
            .apply(t - self.start())
            .expect("runs_at guarantees t - start is within the power curve's domain")
    }

    /// This task's own power-curve breakpoints, in absolute time, that fall
    /// within `[window_start, window_end)`.
    pub fn runtime_breakpoints_in(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Vec<DateTime<Utc>> {
        self.task
            .power
            .runtime_breakpoints()
            .into_iter()
            .map(|rt| self.start() + rt)
            .filter(|t| *t >= window_start && *t < window_end)
            .collect()
    }

    /// The maximum cost (or emission, depending on `weight`) over every
    /// start instant in this placement's slack. With the zero-slack
    /// placement model this crate uses (spec.md §4.7 design note), slack is
    /// always a single instant and this collapses to the canonical
    /// integral; the loop below is kept general so the method stays
    /// correct if a future slack-widening pass is reintroduced.
    pub fn worst_case_against<W: WallClockFunction>(&self, weight: &W) -> Result<f64, EngineError> {
        let zipped = PowerWeightedFunction::new(&self.task.power, weight);
        let mut worst = f64::MIN;
        let mut s = self.start_interval.start;
        let end = self.start_interval.end();
        loop {
            let v = zipped.integrate_full_run(s)?;
            worst = worst.max(v);
            if s == end {
                break;
            }
            s = end;
        }
        Ok(worst)
    }
}

/// An ordered sequence of placements plus an optional schedule-level
/// validator (typically `MaximumPowerConsumption`). Treated as an
/// immutable value; extending it clones the task list (spec.md §9,
/// "Schedule immutability" — a plain `Vec` clone, not a persistent
/// structure, since `n` is small by construction).
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    pub tasks: Vec<ScheduledTask>,
    pub validator: Option<ScheduleValidator>,
}

impl Schedule {
    pub fn new(validator: Option<ScheduleValidator>) -> Self {
        Self { tasks: Vec::new(), validator }
    }

    pub fn with_tasks(tasks: Vec<ScheduledTask>, validator: Option<ScheduleValidator>) -> Self {
        Self { tasks, validator }
    }

    /// Whether `task` may be placed at `at` given everything already
    /// committed: both the task's own validator and this schedule's
    /// validator must accept the placement.
    pub fn can_schedule_task_at(&self, task: &Task, at: DateTime<Utc>) -> bool {
        if !task.validate(at) {
            return false;
        }
        match &self.validator {
            Some(v) => v.validate(&self.tasks, &task.power, at),
            None => true,
        }
    }

    /// A new schedule with `placement` appended; `self` is left untouched.
    pub fn with_placement(&self, placement: ScheduledTask) -> Self {
        let mut tasks = self.tasks.clone();
        tasks.push(placement);
        Self { tasks, validator: self.validator.clone() }
    }

    pub fn total_cost(&self) -> f64 {
        self.tasks.iter().map(|t| t.cost).sum()
    }

    /// The latest instant at which any placed task stops running.
    pub fn horizon_end(&self) -> Option<DateTime<Utc>> {
        self.tasks.iter().map(|t| t.end()).max()
    }
}

/// Every instant in `[window_start, window_end)` at which the combined
/// power draw of `schedule`'s tasks changes, used by property tests (spec
/// "Power bound") to re-check `MaximumPowerConsumption` independently of
/// the validator that produced the schedule.
pub fn combined_power_breakpoints(
    schedule: &Schedule,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    let mut points: Vec<DateTime<Utc>> = schedule
        .tasks
        .iter()
        .flat_map(|t| t.runtime_breakpoints_in(window_start, window_end))
        .collect();
    points.sort();
    points.dedup();
    points
}

pub fn combined_power_at(schedule: &Schedule, t: DateTime<Utc>) -> f64 {
    schedule.tasks.iter().map(|st| st.power_at(t)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::PowerUsageFunction;

    fn at(hour: u32) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2021-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            + Duration::hours(hour as i64)
    }

    fn task(kw: f64) -> Task {
        Task::new(None, PowerUsageFunction::constant(Duration::hours(1), kw).unwrap(), None)
    }

    #[test]
    fn half_open_window_excludes_the_end_instant() {
        let st = ScheduledTask::new(task(1.0), DatetimeInterval::at(at(1)), 1.0);
        assert!(st.runs_at(at(1)));
        assert!(!st.runs_at(at(2)));
        assert_eq!(st.power_at(at(2)), 0.0);
    }

    #[test]
    fn back_to_back_tasks_never_overlap() {
        let a = ScheduledTask::new(task(1.0), DatetimeInterval::at(at(1)), 1.0);
        let b = ScheduledTask::new(task(1.0), DatetimeInterval::at(at(2)), 1.0);
        let schedule = Schedule::with_tasks(vec![a, b], None);
        assert_eq!(combined_power_at(&schedule, at(2)), 1.0);
    }

    #[test]
    fn with_placement_does_not_mutate_original() {
        let schedule = Schedule::new(None);
        let extended = schedule.with_placement(ScheduledTask::new(
            task(1.0),
            DatetimeInterval::at(at(1)),
            1.0,
        ));
        assert!(schedule.tasks.is_empty());
        assert_eq!(extended.tasks.len(), 1);
    }
}
