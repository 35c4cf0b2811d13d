use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct IntensityRecord {
    pub datetime: DateTime<Utc>,
    #[serde(rename = "carbonIntensity")]
    pub carbon_intensity: f64,
}
