use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single grid carbon-intensity breakpoint, in grams CO2 per kWh.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmissionPoint {
    pub time: DateTime<Utc>,
    pub intensity: f64,
}

impl EmissionPoint {
    pub fn new(time: DateTime<Utc>, intensity: f64) -> Self {
        Self { time, intensity }
    }
}
