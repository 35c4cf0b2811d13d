use chrono::{DateTime, Duration, Utc};

use crate::domain::PricePoint;
use crate::error::EngineError;
use super::{next_with_tail, validate_ascending, DiscreteFunction};

/// Piecewise-constant day-ahead spot price, in currency per kWh, as a
/// function of wall-clock time. Extended past the last breakpoint by
/// `extend_by` (one hour for a day-ahead release).
#[derive(Debug, Clone)]
pub struct SpotPriceFunction {
    points: Vec<PricePoint>,
    extend_by: Duration,
}

impl SpotPriceFunction {
    pub fn new(points: Vec<PricePoint>, extend_by: Duration) -> Result<Self, EngineError> {
        validate_ascending(&points, |p| p.time)?;
        Ok(Self { points, extend_by })
    }

    pub fn extend_by(&self) -> Duration {
        self.extend_by
    }
}

impl DiscreteFunction for SpotPriceFunction {
    type Domain = DateTime<Utc>;
    type Codomain = f64;
    type Integral = f64;
    type Point = PricePoint;

    fn points(&self) -> &[PricePoint] {
        &self.points
    }

    fn domain_of(&self, point: &PricePoint) -> DateTime<Utc> {
        point.time
    }

    fn codomain_of(&self, point: &PricePoint) -> f64 {
        point.price
    }

    fn min_domain(&self) -> DateTime<Utc> {
        self.points[0].time
    }

    fn max_domain(&self) -> DateTime<Utc> {
        self.points[self.points.len() - 1].time + self.extend_by
    }

    fn zero_integral(&self) -> f64 {
        0.0
    }

    fn combine_integrals(&self, a: f64, b: f64) -> f64 {
        a + b
    }

    fn integral_over(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
        let hours = (end - start).num_milliseconds() as f64 / 3_600_000.0;
        let price = self.apply(start).expect("start is valid within a single piece");
        price * hours
    }

    fn next_discrete_point_from(
        &self,
        min: DateTime<Utc>,
        argument: DateTime<Utc>,
        max: DateTime<Utc>,
    ) -> Option<PricePoint> {
        let last_price = self.points.last().unwrap().price;
        next_with_tail(
            &self.points,
            |p| p.time,
            |tail_domain| PricePoint::new(tail_domain, last_price),
            self.extend_by,
            min,
            argument,
            max,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2021-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            + Duration::hours(hour as i64)
    }

    fn prices() -> SpotPriceFunction {
        SpotPriceFunction::new(
            vec![
                PricePoint::new(at(15), 10.0),
                PricePoint::new(at(16), 10.0),
                PricePoint::new(at(17), 10.0),
                PricePoint::new(at(18), 10.0),
                PricePoint::new(at(19), 5.0),
                PricePoint::new(at(20), 10.0),
                PricePoint::new(at(21), 10.0),
                PricePoint::new(at(22), 10.0),
            ],
            Duration::hours(1),
        )
        .unwrap()
    }

    #[test]
    fn rejects_empty_and_non_ascending_and_duplicate() {
        assert!(SpotPriceFunction::new(vec![], Duration::hours(1)).is_err());
        assert!(SpotPriceFunction::new(
            vec![PricePoint::new(at(1), 1.0), PricePoint::new(at(1), 2.0)],
            Duration::hours(1)
        )
        .is_err());
        assert!(SpotPriceFunction::new(
            vec![PricePoint::new(at(2), 1.0), PricePoint::new(at(1), 2.0)],
            Duration::hours(1)
        )
        .is_err());
    }

    #[test]
    fn apply_at_breakpoint_matches_its_value() {
        let f = prices();
        assert_eq!(f.apply(at(19)).unwrap(), 5.0);
        assert_eq!(f.apply(at(19) + Duration::minutes(30)).unwrap(), 5.0);
    }

    #[test]
    fn tail_extension_holds_last_value() {
        let f = prices();
        assert_eq!(f.max_domain(), at(23));
        assert_eq!(f.apply(f.max_domain()).unwrap(), 10.0);
        assert!(f.apply(f.max_domain() + Duration::seconds(1)).is_err());
    }

    #[test]
    fn integration_additivity() {
        let f = prices();
        let (a, b, c) = (at(15), at(18), at(21));
        let whole = f.integrate(a, c).unwrap();
        let split = f.integrate(a, b).unwrap() + f.integrate(b, c).unwrap();
        assert!((whole - split).abs() < 1e-9);
    }

    #[test]
    fn integrate_across_the_valley() {
        let f = prices();
        // 18:00 - 20:00 costs 10 (18:00 piece) + 5 (19:00 piece) = 15
        let cost = f.integrate(at(18), at(20)).unwrap();
        assert!((cost - 15.0).abs() < 1e-9);
    }
}
