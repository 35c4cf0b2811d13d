mod interval;
mod price;
mod emission;

pub use interval::DatetimeInterval;
pub use price::PricePoint;
pub use emission::EmissionPoint;
