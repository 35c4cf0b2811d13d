use chrono::{DateTime, Duration, Utc};

use crate::function::PowerUsageFunction;

use super::ScheduledTask;

/// A predicate over a candidate placement `(task, at)` given everything
/// already committed to the schedule. `MaximumPowerConsumption` is the one
/// described in spec.md §4.9; `Conjunction`/`Disjunction` exist for
/// symmetry with `TaskValidator` and so a caller can combine multiple
/// schedule-level constraints, though the wire boundary (spec.md §6) only
/// ever sends a single `MaximumPowerConsumption`.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleValidator {
    MaximumPowerConsumption(f64),
    Conjunction(Vec<ScheduleValidator>),
    Disjunction(Vec<ScheduleValidator>),
}

impl ScheduleValidator {
    pub fn validate(
        &self,
        committed: &[ScheduledTask],
        candidate_power: &PowerUsageFunction,
        at: DateTime<Utc>,
    ) -> bool {
        match self {
            ScheduleValidator::MaximumPowerConsumption(max_kw) => {
                max_power_consumption_holds(committed, candidate_power, at, *max_kw)
            }
            ScheduleValidator::Conjunction(children) => children
                .iter()
                .all(|c| c.validate(committed, candidate_power, at)),
            ScheduleValidator::Disjunction(children) => children
                .iter()
                .any(|c| c.validate(committed, candidate_power, at)),
        }
    }
}

/// Checks every instant at which either a committed task's power profile or
/// the candidate's own profile changes, within `[at, at + duration]`, using
/// a half-open running-window convention: a task ending exactly at `t` does
/// not count toward the load at `t` (spec.md §4.9), so a task ending when
/// another starts is admissible.
fn max_power_consumption_holds(
    committed: &[ScheduledTask],
    candidate_power: &PowerUsageFunction,
    at: DateTime<Utc>,
    max_kw: f64,
) -> bool {
    let duration = candidate_power.duration();
    let mut checkpoints: Vec<DateTime<Utc>> = candidate_power
        .runtime_breakpoints()
        .into_iter()
        .map(|rt| at + rt)
        .collect();

    for st in committed {
        for t in st.runtime_breakpoints_in(at, at + duration) {
            checkpoints.push(t);
        }
    }
    checkpoints.sort();
    checkpoints.dedup();

    for t in checkpoints {
        let mut total = 0.0;
        for st in committed {
            total += st.power_at(t);
        }
        if t >= at && t < at + duration {
            total += candidate_power
                .apply(t - at)
                .expect("checkpoint derived from the candidate's own breakpoints");
        }
        if total > max_kw + 1e-9 {
            return false;
        }
    }
    true
}
