//! In-memory price/emission cache keyed by timestamp, behind a
//! single-writer `RwLock` (spec.md §5: "the external price/emission cache
//! is the only shared-mutable resource"). Not part of the engine proper —
//! the engine only ever sees the `Vec<PricePoint>`/`Vec<EmissionPoint>`
//! this layer hands it before a request begins.

pub mod error;
pub mod horizon;

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::domain::{EmissionPoint, PricePoint};
pub use error::CacheError;

/// A single-metric timestamp-keyed store. Readers take a read lock;
/// `insert` takes a write lock only to commit already-fetched rows, never
/// while an upstream HTTP call is in flight (matching the teacher's
/// fetch-then-commit pattern in `worker::run`).
pub struct TimeSeriesCache {
    points: RwLock<BTreeMap<DateTime<Utc>, f64>>,
}

impl Default for TimeSeriesCache {
    fn default() -> Self {
        Self { points: RwLock::new(BTreeMap::new()) }
    }
}

impl TimeSeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent on timestamp: inserting a point at a timestamp already
    /// present overwrites it rather than duplicating it.
    pub fn insert(&self, points: impl IntoIterator<Item = (DateTime<Utc>, f64)>) -> Result<(), CacheError> {
        let mut guard = self
            .points
            .write()
            .map_err(|e| CacheError::LockPoisoned(e.to_string()))?;
        for (t, v) in points {
            guard.insert(t, v);
        }
        Ok(())
    }

    pub fn earliest(&self) -> Result<Option<DateTime<Utc>>, CacheError> {
        let guard = self.points.read().map_err(|e| CacheError::LockPoisoned(e.to_string()))?;
        Ok(guard.keys().next().copied())
    }

    pub fn latest(&self) -> Result<Option<DateTime<Utc>>, CacheError> {
        let guard = self.points.read().map_err(|e| CacheError::LockPoisoned(e.to_string()))?;
        Ok(guard.keys().next_back().copied())
    }

    fn from_ts(&self, from: DateTime<Utc>) -> Result<Vec<(DateTime<Utc>, f64)>, CacheError> {
        let guard = self.points.read().map_err(|e| CacheError::LockPoisoned(e.to_string()))?;
        Ok(guard.range(from..).map(|(t, v)| (*t, *v)).collect())
    }
}

#[derive(Default)]
pub struct PriceCache(TimeSeriesCache);

impl PriceCache {
    pub fn new() -> Self {
        Self(TimeSeriesCache::new())
    }

    pub fn insert(&self, points: &[PricePoint]) -> Result<(), CacheError> {
        self.0.insert(points.iter().map(|p| (p.time, p.price)))
    }

    pub fn get_prices(&self, from: DateTime<Utc>) -> Result<Vec<PricePoint>, CacheError> {
        Ok(self
            .0
            .from_ts(from)?
            .into_iter()
            .map(|(t, v)| PricePoint::new(t, v))
            .collect())
    }

    pub fn earliest(&self) -> Result<Option<DateTime<Utc>>, CacheError> {
        self.0.earliest()
    }

    pub fn latest(&self) -> Result<Option<DateTime<Utc>>, CacheError> {
        self.0.latest()
    }
}

#[derive(Default)]
pub struct EmissionCache(TimeSeriesCache);

impl EmissionCache {
    pub fn new() -> Self {
        Self(TimeSeriesCache::new())
    }

    pub fn insert(&self, points: &[EmissionPoint]) -> Result<(), CacheError> {
        self.0.insert(points.iter().map(|p| (p.time, p.intensity)))
    }

    pub fn get_emissions(&self, from: DateTime<Utc>) -> Result<Vec<EmissionPoint>, CacheError> {
        Ok(self
            .0
            .from_ts(from)?
            .into_iter()
            .map(|(t, v)| EmissionPoint::new(t, v))
            .collect())
    }

    pub fn earliest(&self) -> Result<Option<DateTime<Utc>>, CacheError> {
        self.0.earliest()
    }

    pub fn latest(&self) -> Result<Option<DateTime<Utc>>, CacheError> {
        self.0.latest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(hour: u32) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2021-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            + Duration::hours(hour as i64)
    }

    #[test]
    fn insert_is_idempotent_on_timestamp() {
        let cache = PriceCache::new();
        cache.insert(&[PricePoint::new(at(1), 10.0)]).unwrap();
        cache.insert(&[PricePoint::new(at(1), 20.0)]).unwrap();
        let prices = cache.get_prices(at(0)).unwrap();
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].price, 20.0);
    }

    #[test]
    fn get_prices_returns_points_from_the_given_instant_onward() {
        let cache = PriceCache::new();
        cache
            .insert(&[
                PricePoint::new(at(1), 1.0),
                PricePoint::new(at(2), 2.0),
                PricePoint::new(at(3), 3.0),
            ])
            .unwrap();
        let prices = cache.get_prices(at(2)).unwrap();
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].time, at(2));
    }

    #[test]
    fn earliest_and_latest_on_empty_cache() {
        let cache = EmissionCache::new();
        assert_eq!(cache.earliest().unwrap(), None);
        assert_eq!(cache.latest().unwrap(), None);
    }
}
