//! Candidate-start enumeration, single-task placement, and the multi-task
//! permutation sweep (spec.md §4.6–4.8).

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::domain::DatetimeInterval;
use crate::error::EngineError;
use crate::function::{breakpoints_between, DiscreteFunction, PowerPriceFunction, SpotPriceFunction};
use crate::schedule::{Schedule, ScheduledTask};
use crate::task::{Task, TaskValidator};

/// The finite set of start instants worth evaluating for `task` against
/// `base`: the union of price breakpoints, committed-task window bounds,
/// and the task's own validator seeds, each further expanded by every
/// runtime breakpoint of `task`'s power curve (spec.md §4.6) — this is
/// exactly the set of instants at which the cost integral, which is
/// piecewise-constant in the start instant, can change value.
pub fn candidate_starts(
    task: &Task,
    base: &Schedule,
    price: &SpotPriceFunction,
    now: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    let duration = task.duration();
    let domain_min = price.min_domain();
    let domain_max = price.max_domain();
    let effective_min = now.max(domain_min);

    let mut seeds: Vec<DateTime<Utc>> = if effective_min <= domain_max {
        breakpoints_between(price, effective_min, domain_max)
    } else {
        Vec::new()
    };

    for st in &base.tasks {
        seeds.push(st.start());
        seeds.push(st.end());
    }

    seeds.extend(task.seed_starts());
    seeds.sort();
    seeds.dedup();

    let runtime_breakpoints = task.power.runtime_breakpoints();

    let mut candidates: Vec<DateTime<Utc>> = Vec::new();
    for s in &seeds {
        for rt in &runtime_breakpoints {
            for candidate in [*s + *rt, *s - *rt] {
                if candidate < now {
                    continue;
                }
                if candidate < domain_min || candidate > domain_max {
                    continue;
                }
                let end = candidate + duration;
                if end < domain_min || end > domain_max {
                    continue;
                }
                candidates.push(candidate);
            }
        }
    }
    candidates.sort();
    candidates.dedup();

    candidates
        .into_iter()
        .filter(|&at| base.can_schedule_task_at(task, at))
        .collect()
}

/// Every feasible placement of `task` onto `base`, one per surviving
/// candidate start (spec.md §4.7). This crate implements the zero-slack
/// form: every placement's `start_interval` is a single instant.
pub fn schedule_task_for(
    task: &Task,
    base: &Schedule,
    price: &SpotPriceFunction,
    now: DateTime<Utc>,
) -> Result<Vec<ScheduledTask>, EngineError> {
    let starts = candidate_starts(task, base, price, now);
    let power_price = PowerPriceFunction::new(&task.power, price);

    starts
        .into_iter()
        .map(|at| {
            let cost = power_price.integrate_full_run(at)?;
            Ok(ScheduledTask::new(task.clone(), DatetimeInterval::at(at), cost))
        })
        .collect()
}

/// The full combinatorial assembly (spec.md §4.8): every permutation of
/// `tasks` is tried, each permutation expanding a frontier of partial
/// schedules by one task at a time; the union of every permutation's
/// final frontier is returned for the recommender to choose from.
///
/// Permutations are independent of one another, so the outer loop is the
/// concurrency seam: each permutation's frontier expansion runs on
/// rayon's pool, and results are collected into a `Vec` in
/// permutation-generation order before returning — not accumulated by a
/// shared mutable collector — so the result is deterministic regardless
/// of which permutation's worker finishes first (spec.md §5).
pub fn all_candidate_schedules(
    tasks: &[Task],
    base: &Schedule,
    price: &SpotPriceFunction,
    now: DateTime<Utc>,
) -> Result<Vec<Schedule>, EngineError> {
    let permutations = permutations_of(tasks.len());

    let per_permutation: Vec<Result<Vec<Schedule>, EngineError>> = permutations
        .par_iter()
        .map(|order| {
            let ordered_tasks: Vec<&Task> = order.iter().map(|&i| &tasks[i]).collect();
            expand_frontier(&ordered_tasks, base, price, now)
        })
        .collect();

    let mut all = Vec::new();
    for result in per_permutation {
        all.extend(result?);
    }
    Ok(all)
}

fn expand_frontier(
    ordered_tasks: &[&Task],
    base: &Schedule,
    price: &SpotPriceFunction,
    now: DateTime<Utc>,
) -> Result<Vec<Schedule>, EngineError> {
    let mut frontier = vec![base.clone()];
    for task in ordered_tasks {
        let mut next_frontier = Vec::new();
        for schedule in &frontier {
            for placement in schedule_task_for(task, schedule, price, now)? {
                next_frontier.push(schedule.with_placement(placement));
            }
        }
        frontier = next_frontier;
        if frontier.is_empty() {
            break;
        }
    }
    Ok(frontier)
}

/// Every permutation of `0..n`, generated with Heap's algorithm so no
/// third-party combinatorics crate is pulled in for what is otherwise a
/// few dozen lines (the teacher and the rest of the example pack have no
/// such dependency either).
fn permutations_of(n: usize) -> Vec<Vec<usize>> {
    if n == 0 {
        return vec![Vec::new()];
    }
    let mut elements: Vec<usize> = (0..n).collect();
    let mut results = Vec::new();
    let mut c = vec![0usize; n];
    results.push(elements.clone());

    let mut i = 0;
    while i < n {
        if c[i] < i {
            if i % 2 == 0 {
                elements.swap(0, i);
            } else {
                elements.swap(c[i], i);
            }
            results.push(elements.clone());
            c[i] += 1;
            i = 0;
        } else {
            c[i] = 0;
            i += 1;
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::domain::PricePoint;
    use crate::function::PowerUsageFunction;
    use crate::schedule::ScheduleValidator;

    fn at(hour: u32) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2021-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            + Duration::hours(hour as i64)
    }

    fn hourly_prices(values: &[(u32, f64)]) -> SpotPriceFunction {
        let points = values
            .iter()
            .map(|(h, p)| PricePoint::new(at(*h), *p))
            .collect();
        SpotPriceFunction::new(points, Duration::hours(1)).unwrap()
    }

    #[test]
    fn permutations_of_three_has_six_orderings() {
        let perms = permutations_of(3);
        assert_eq!(perms.len(), 6);
        let mut sorted = perms.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 6);
    }

    #[test]
    fn permutations_of_zero_is_the_empty_ordering() {
        assert_eq!(permutations_of(0), vec![Vec::<usize>::new()]);
    }

    #[test]
    fn s1_minimum_price_single_task() {
        let price = hourly_prices(&[
            (15, 10.0), (16, 10.0), (17, 10.0), (18, 10.0),
            (19, 5.0), (20, 10.0), (21, 10.0), (22, 10.0),
        ]);
        let task = Task::new(
            Some("t".into()),
            PowerUsageFunction::constant(Duration::hours(1), 1.0).unwrap(),
            None,
        );
        let placements = schedule_task_for(&task, &Schedule::new(None), &price, at(15)).unwrap();
        let best = placements
            .iter()
            .min_by(|a, b| a.cost.partial_cmp(&b.cost).unwrap())
            .unwrap();
        assert_eq!(best.start(), at(19));
        assert!((best.cost - 5.0).abs() < 1e-9);
    }

    #[test]
    fn s2_two_hour_task_picks_the_earlier_of_two_equal_cost_windows() {
        let price = hourly_prices(&[
            (15, 10.0), (16, 10.0), (17, 10.0), (18, 10.0),
            (19, 5.0), (20, 10.0), (21, 10.0), (22, 10.0), (23, 10.0),
        ]);
        let task = Task::new(
            Some("t".into()),
            PowerUsageFunction::constant(Duration::hours(2), 1.0).unwrap(),
            None,
        );
        let placements = schedule_task_for(&task, &Schedule::new(None), &price, at(15)).unwrap();
        let min_cost = placements.iter().map(|p| p.cost).fold(f64::MAX, f64::min);
        let earliest_at_min_cost = placements
            .iter()
            .filter(|p| (p.cost - min_cost).abs() < 1e-9)
            .min_by_key(|p| p.start())
            .unwrap();
        assert!((min_cost - 15.0).abs() < 1e-9);
        assert_eq!(earliest_at_min_cost.start(), at(18));
    }

    #[test]
    fn s4_end_before_start_serializes_without_overlap() {
        let price = hourly_prices(&[(15, 1.0), (16, 1.0), (17, 1.0), (18, 1.0)]);
        let task_a = Task::new(
            Some("a".into()),
            PowerUsageFunction::constant(Duration::hours(1), 1.0).unwrap(),
            Some(TaskValidator::MustStartBetween(DatetimeInterval::at(at(17)))),
        );
        let task_b = Task::new(
            Some("b".into()),
            PowerUsageFunction::constant(Duration::minutes(75), 1.0).unwrap(),
            Some(TaskValidator::MustEndBetween(DatetimeInterval::at(at(17)))),
        );
        let base = Schedule::new(Some(ScheduleValidator::MaximumPowerConsumption(1.0)));
        let schedules = all_candidate_schedules(&[task_a, task_b], &base, &price, at(15)).unwrap();
        assert!(!schedules.is_empty());

        let b_start = at(17) - Duration::minutes(75);
        for s in &schedules {
            assert_eq!(s.tasks.len(), 2);
            let b = s.tasks.iter().find(|t| t.task.id.as_deref() == Some("b")).unwrap();
            assert_eq!(b.start(), b_start);
            assert_eq!(b.end(), at(17));
        }
    }

    #[test]
    fn s6_piecewise_power_with_no_feasible_placement_yields_no_candidates() {
        let price = hourly_prices(&[(0, 1.0), (1, 1.0)]);
        let task = Task::new(
            Some("t".into()),
            PowerUsageFunction::new(
                vec![(Duration::zero(), 1.0), (Duration::seconds(300), 2.0)],
                Duration::seconds(300),
            )
            .unwrap(),
            None,
        );
        let base = Schedule::new(Some(ScheduleValidator::MaximumPowerConsumption(1.0)));
        let placements = schedule_task_for(&task, &base, &price, at(0)).unwrap();
        assert!(placements.is_empty());
    }

    #[test]
    fn s3_max_power_conflict_serializes_two_tasks() {
        let price = hourly_prices(&[(15, 1.0), (16, 1.0), (17, 1.0), (18, 1.0)]);
        let t1 = Task::new(
            Some("a".into()),
            PowerUsageFunction::constant(Duration::hours(1), 1.0).unwrap(),
            None,
        );
        let t2 = Task::new(
            Some("b".into()),
            PowerUsageFunction::constant(Duration::hours(1), 1.0).unwrap(),
            None,
        );
        let base = Schedule::new(Some(ScheduleValidator::MaximumPowerConsumption(1.0)));
        let schedules = all_candidate_schedules(&[t1, t2], &base, &price, at(15)).unwrap();
        assert!(!schedules.is_empty());
        for s in &schedules {
            assert_eq!(s.tasks.len(), 2);
        }
        let best = schedules
            .iter()
            .min_by(|a, b| a.total_cost().partial_cmp(&b.total_cost()).unwrap())
            .unwrap();
        assert!((best.total_cost() - 2.0).abs() < 1e-9);
    }
}
