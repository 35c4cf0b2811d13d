use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single day-ahead spot price breakpoint, in currency per kWh.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub time: DateTime<Utc>,
    pub price: f64,
}

impl PricePoint {
    pub fn new(time: DateTime<Utc>, price: f64) -> Self {
        Self { time, price }
    }
}
