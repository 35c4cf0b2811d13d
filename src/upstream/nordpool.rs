mod models;

use std::time::Duration as StdDuration;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::blocking::Client;
use thiserror::Error;

use crate::domain::PricePoint;
use models::Tariffs;

/// Day-ahead spot price fetch against the same NordPool endpoint the
/// teacher's `manager_nordpool` targets, but built with the
/// `reqwest::blocking` client construction from the teacher's
/// `manager_forecast` (`manager_nordpool` itself is built on `ureq`), and
/// re-targeted at plain currency-per-kWh price points instead of the
/// teacher's tariff-with-fees breakdown (this crate has no fee schedule to
/// apply — that is a billing concern, not a scheduling one).
pub struct NordPool {
    client: Client,
    delivery_area: String,
    currency: String,
}

impl NordPool {
    pub fn new(delivery_area: String, currency: String) -> Result<Self, NordPoolError> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(30))
            .build()?;
        Ok(Self { client, delivery_area, currency })
    }

    /// Fetches the day-ahead price curve for the calendar day `day`,
    /// restricted to `[day_start, day_end)`.
    pub fn get_day_prices(
        &self,
        day: NaiveDate,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>, NordPoolError> {
        let url = "https://dataportal-api.nordpoolgroup.com/api/DayAheadPrices";
        let date = format!("{}", day.format("%Y-%m-%d"));

        let response = self
            .client
            .get(url)
            .query(&[
                ("date", date.as_str()),
                ("market", "DayAhead"),
                ("deliveryArea", self.delivery_area.as_str()),
                ("currency", self.currency.as_str()),
            ])
            .send()?;

        let json = response.text()?;
        let tariffs: Tariffs = serde_json::from_str(&json).map_err(|e| NordPoolError::Document(e.to_string()))?;

        self.tariffs_to_points(&tariffs, day_start, day_end)
    }

    fn tariffs_to_points(
        &self,
        tariffs: &Tariffs,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>, NordPoolError> {
        if tariffs.multi_area_entries.is_empty() {
            return Err(NordPoolError::NoContent);
        }

        let mut points = Vec::new();
        for e in tariffs
            .multi_area_entries
            .iter()
            .filter(|e| e.delivery_start >= day_start && e.delivery_start < day_end)
        {
            let area_price = e
                .entry_per_area
                .for_area(&self.delivery_area)
                .ok_or_else(|| NordPoolError::Document(format!("no price for area {}", self.delivery_area)))?;
            points.push(PricePoint::new(e.delivery_start, area_price / 1000.0));
        }

        Ok(points)
    }
}

/// Turns a release-hour-configured UTC instant into the calendar date
/// NordPool expects for its `date` query parameter.
pub fn release_date_for(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive()
}

#[derive(Error, Debug)]
pub enum NordPoolError {
    #[error("NordPoolError::Document: {0}")]
    Document(String),
    #[error("NordPoolError::NoContent")]
    NoContent,
    #[error("NordPoolError::Network: {0}")]
    Network(#[from] reqwest::Error),
}
