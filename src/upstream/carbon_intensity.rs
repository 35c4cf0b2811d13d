mod models;

use std::time::Duration as StdDuration;

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use reqwest::blocking::Client;
use thiserror::Error;

use crate::domain::EmissionPoint;
use models::IntensityRecord;

/// Five-minute carbon-intensity forecast fetch, adapted from the teacher's
/// `manager_forecast`: same client construction (`reqwest::blocking`,
/// 30s timeout) and truncate-to-grid pattern, re-targeted at grams CO2/kWh
/// instead of cloud cover.
pub struct CarbonIntensity {
    client: Client,
    host: String,
    port: u16,
    zone: String,
}

impl CarbonIntensity {
    pub fn new(host: String, port: u16, zone: String) -> Result<Self, CarbonIntensityError> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(30))
            .build()?;
        Ok(Self { client, host, port, zone })
    }

    pub fn get_forecast(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<EmissionPoint>, CarbonIntensityError> {
        let from = from
            .duration_trunc(TimeDelta::minutes(5))
            .map_err(|e| CarbonIntensityError::Date(format!("from date: {}", e)))?;
        let to = to
            .duration_trunc(TimeDelta::minutes(5))
            .map_err(|e| CarbonIntensityError::Date(format!("to date: {}", e)))?;

        let url = format!("http://{}:{}/carbon-intensity", self.host, self.port);
        let response = self
            .client
            .get(url)
            .query(&[("zone", self.zone.as_str()), ("from", &from.to_rfc3339()), ("to", &to.to_rfc3339())])
            .send()?;

        let json = response.text()?;
        let records: Vec<IntensityRecord> =
            serde_json::from_str(&json).map_err(|e| CarbonIntensityError::Parse(e.to_string()))?;

        if records.is_empty() {
            return Err(CarbonIntensityError::Empty(format!("no forecast for {} - {}", from, to)));
        }

        Ok(records
            .into_iter()
            .map(|r| EmissionPoint::new(r.datetime, r.carbon_intensity))
            .collect())
    }
}

#[derive(Error, Debug)]
pub enum CarbonIntensityError {
    #[error("DateError: {0}")]
    Date(String),
    #[error("ParseError: {0}")]
    Parse(String),
    #[error("EmptyForecastError: {0}")]
    Empty(String),
    #[error("NetworkError: {0}")]
    Network(#[from] reqwest::Error),
}
