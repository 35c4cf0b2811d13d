//! Selects the cost-minimizing schedule from the candidate set produced by
//! `scheduler::all_candidate_schedules`, and tracks the worst-case
//! price/emission observed for each task identity across every candidate
//! (spec.md §4.10).

use std::collections::HashMap;

use crate::error::EngineError;
use crate::function::{EmissionFunction, PowerEmissionFunction, SpotPriceFunction};
use crate::schedule::Schedule;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorstCase {
    pub highest_price: f64,
    pub highest_co2_emission: f64,
}

#[derive(Debug, Clone)]
pub struct Recommendation {
    pub schedule: Schedule,
    /// Keyed by task id; tasks without an id are not reported (spec.md §3,
    /// "id is opaque to the engine but required for the recommender").
    pub worst_case_by_task_id: HashMap<String, WorstCase>,
}

/// Picks the cheapest schedule from `schedules` and, in the same pass,
/// tracks the most expensive price and emission seen for every task id
/// across the whole candidate set (not just the winner) so a caller can
/// report a savings figure. Returns `Ok(None)` for an empty candidate set
/// — this is how a `ConstraintUnsatisfiable` task surfaces (spec.md §7):
/// the scheduler already returned no placements for it, so no schedule
/// ever contained it, and there is nothing to recommend.
pub fn recommend(
    schedules: Vec<Schedule>,
    price: &SpotPriceFunction,
    emission: &EmissionFunction,
) -> Result<Option<Recommendation>, EngineError> {
    if schedules.is_empty() {
        return Ok(None);
    }

    let mut worst_case_by_task_id: HashMap<String, WorstCase> = HashMap::new();
    let mut scored = Vec::with_capacity(schedules.len());

    for schedule in schedules {
        let mut total_emission = 0.0;
        let mut total_worst_case = 0.0;

        for st in &schedule.tasks {
            let power_emission = PowerEmissionFunction::new(&st.task.power, emission);
            let task_emission = power_emission.integrate_full_run(st.start())?;
            let task_worst_case = st.worst_case_against(price)?;
            total_emission += task_emission;
            total_worst_case += task_worst_case;

            if let Some(id) = &st.task.id {
                let entry = worst_case_by_task_id.entry(id.clone()).or_default();
                if st.cost > entry.highest_price {
                    entry.highest_price = st.cost;
                }
                if task_emission > entry.highest_co2_emission {
                    entry.highest_co2_emission = task_emission;
                }
            }
        }

        let total_cost = schedule.total_cost();
        let mut starts: Vec<_> = schedule.tasks.iter().map(|st| st.start()).collect();
        starts.sort();

        scored.push((schedule, total_cost, total_emission, total_worst_case, starts));
    }

    scored.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap()
            .then_with(|| a.2.partial_cmp(&b.2).unwrap())
            .then_with(|| a.3.partial_cmp(&b.3).unwrap())
            .then_with(|| a.4.cmp(&b.4))
    });

    let (winner, ..) = scored.into_iter().next().unwrap();
    Ok(Some(Recommendation { schedule: winner, worst_case_by_task_id }))
}
