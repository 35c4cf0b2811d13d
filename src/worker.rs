use std::fs;
use std::thread;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use log::{info, warn};

use crate::cache::horizon::next_release;
use crate::cache::CacheError;
use crate::config::{Config, Files};
use crate::error::EngineError;
use crate::errors::{MyGridWorkerError, WireError};
use crate::function::{DiscreteFunction, EmissionFunction, SpotPriceFunction};
use crate::initialization::Mgr;
use crate::recommender;
use crate::schedule::Schedule;
use crate::scheduler;
use crate::upstream::nordpool::release_date_for;
use crate::wire::{WireMaximumPowerConsumption, WireRequest, WireResponse, WireSchedule};
use crate::{retry, wrapper};

/// Runs one scheduling pass: refreshes the price/emission caches, reads a
/// request from `files.request_path`, runs the engine, and writes the
/// recommended schedule to `files.response_path`.
///
/// # Arguments
///
/// * 'mgr' - struct with configured collaborators
/// * 'config' - full configuration
pub fn run(mgr: &Mgr, config: &Config) -> Result<(), MyGridWorkerError> {
    let now = Utc::now();
    let horizon = next_release(now, config.horizon.release_hour);

    ensure_price_cache_fresh(mgr, now, horizon)?;
    ensure_emission_cache_fresh(mgr, config, now, horizon)?;

    let price = SpotPriceFunction::new(
        mgr.price_cache.get_prices(now)?,
        Duration::minutes(config.horizon.price_extend_by_minutes),
    )?;
    let emission = EmissionFunction::new(
        mgr.emission_cache.get_emissions(now)?,
        Duration::minutes(config.horizon.emission_extend_by_minutes),
    )?;

    let request = read_request(&config.files)?;
    let (tasks, base) = request.to_domain()?;

    info!("Run start: {}, {} task(s) requested, horizon at {}", now, tasks.len(), price.max_domain());
    if tasks.len() > config.scheduling.max_tasks {
        warn!(
            "{} tasks requested exceeds configured max_tasks {}; permutation sweep will be {}! combinations",
            tasks.len(),
            config.scheduling.max_tasks,
            tasks.len()
        );
    }

    check_within_horizon(&tasks, now, price.max_domain(), emission.max_domain())?;

    let schedules = scheduler::all_candidate_schedules(&tasks, &base, &price, now)?;
    let recommendation = recommender::recommend(schedules, &price, &emission)?;

    let response = match recommendation {
        Some(rec) => {
            info!("Recommended schedule cost: {}", rec.schedule.total_cost());
            WireResponse::from_recommendation(&rec, price.max_domain())
        }
        None => {
            info!("No feasible schedule for the requested tasks");
            empty_response(&base, price.max_domain())
        }
    };

    write_response(&config.files, &response)?;

    Ok(())
}

/// Refuses a request whose longest task would need to run past either
/// series' cached horizon (spec.md §7, `InputOutOfHorizon`).
fn check_within_horizon(
    tasks: &[crate::task::Task],
    now: DateTime<Utc>,
    price_max_domain: DateTime<Utc>,
    emission_max_domain: DateTime<Utc>,
) -> Result<(), EngineError> {
    let Some(max_duration) = tasks.iter().map(|t| t.duration()).max() else {
        return Ok(());
    };
    let required = now + max_duration;
    if required > price_max_domain || required > emission_max_domain {
        return Err(EngineError::InputOutOfHorizon(format!(
            "request needs coverage until {} but price/emission data only reaches {}/{}",
            required, price_max_domain, emission_max_domain
        )));
    }
    Ok(())
}

fn empty_response(base: &Schedule, latest_available_spot_price: DateTime<Utc>) -> WireResponse {
    let maximum_power_consumption: Option<WireMaximumPowerConsumption> =
        WireSchedule::from_domain(base).maximum_power_consumption;
    WireResponse { tasks: Vec::new(), maximum_power_consumption, latest_available_spot_price: latest_available_spot_price.timestamp() }
}

/// Backfills the price cache with the next two calendar days of day-ahead
/// prices whenever the cache doesn't yet reach the next release instant.
fn ensure_price_cache_fresh(mgr: &Mgr, now: DateTime<Utc>, horizon: DateTime<Utc>) -> Result<(), MyGridWorkerError> {
    let fresh = mgr.price_cache.latest()?.is_some_and(|t| t >= horizon);
    if fresh {
        return Ok(());
    }

    let today = release_date_for(now);
    for day in [today, today.succ_opt().expect("calendar never overflows in practice")] {
        let day_start = Utc
            .with_ymd_and_hms(day.year(), day.month(), day.day(), 0, 0, 0)
            .single()
            .expect("valid calendar date");
        let day_end = day_start + Duration::days(1);

        let points = retry!(|| mgr.nordpool.get_day_prices(day, day_start, day_end))
            .map_err(|e| CacheError::UpstreamUnavailable(e.to_string()))?;
        if !points.is_empty() {
            mgr.price_cache.insert(&points)?;
        }
    }

    Ok(())
}

fn ensure_emission_cache_fresh(mgr: &Mgr, config: &Config, now: DateTime<Utc>, horizon: DateTime<Utc>) -> Result<(), MyGridWorkerError> {
    let tail = Duration::minutes(config.horizon.emission_extend_by_minutes);
    let fresh = mgr.emission_cache.latest()?.is_some_and(|t| t + tail >= horizon);
    if fresh {
        return Ok(());
    }

    let points = retry!(|| mgr.carbon_intensity.get_forecast(now, horizon))
        .map_err(|e| CacheError::UpstreamUnavailable(e.to_string()))?;
    mgr.emission_cache.insert(&points)?;

    Ok(())
}

fn read_request(files: &Files) -> Result<WireRequest, WireError> {
    let json = fs::read_to_string(&files.request_path)?;
    let request: WireRequest = serde_json::from_str(&json)?;
    Ok(request)
}

fn write_response(files: &Files, response: &WireResponse) -> Result<(), WireError> {
    let json = serde_json::to_string_pretty(response)?;
    fs::write(&files.response_path, json)?;
    info!("Schedule written to {}", files.response_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::PowerUsageFunction;
    use crate::task::Task;

    fn at(hour: u32) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2021-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            + Duration::hours(hour as i64)
    }

    #[test]
    fn s5_task_needing_more_than_an_hour_refuses_an_hour_wide_horizon() {
        let task = Task::new(
            Some("t".into()),
            PowerUsageFunction::constant(Duration::hours(1), 1.0).unwrap(),
            None,
        );
        let now = at(0);
        let err = check_within_horizon(&[task], now, now + Duration::minutes(30), now + Duration::minutes(30))
            .unwrap_err();
        assert!(matches!(err, EngineError::InputOutOfHorizon(_)));
    }

    #[test]
    fn task_fitting_within_the_cached_horizon_is_accepted() {
        let task = Task::new(
            Some("t".into()),
            PowerUsageFunction::constant(Duration::hours(1), 1.0).unwrap(),
            None,
        );
        let now = at(0);
        assert!(check_within_horizon(&[task], now, now + Duration::hours(1), now + Duration::hours(1)).is_ok());
    }

    #[test]
    fn no_tasks_is_always_within_horizon() {
        assert!(check_within_horizon(&[], at(0), at(0), at(0)).is_ok());
    }
}
