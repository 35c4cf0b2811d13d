use chrono::{DateTime, Duration, Utc};

use crate::domain::EmissionPoint;
use crate::error::EngineError;
use super::{next_with_tail, validate_ascending, DiscreteFunction};

/// Piecewise-constant grid carbon intensity, in grams CO2 per kWh, as a
/// function of wall-clock time. Extended past the last breakpoint by
/// `extend_by` (five minutes for a typical forecast resolution).
#[derive(Debug, Clone)]
pub struct EmissionFunction {
    points: Vec<EmissionPoint>,
    extend_by: Duration,
}

impl EmissionFunction {
    pub fn new(points: Vec<EmissionPoint>, extend_by: Duration) -> Result<Self, EngineError> {
        validate_ascending(&points, |p| p.time)?;
        Ok(Self { points, extend_by })
    }

    pub fn extend_by(&self) -> Duration {
        self.extend_by
    }
}

impl DiscreteFunction for EmissionFunction {
    type Domain = DateTime<Utc>;
    type Codomain = f64;
    type Integral = f64;
    type Point = EmissionPoint;

    fn points(&self) -> &[EmissionPoint] {
        &self.points
    }

    fn domain_of(&self, point: &EmissionPoint) -> DateTime<Utc> {
        point.time
    }

    fn codomain_of(&self, point: &EmissionPoint) -> f64 {
        point.intensity
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
        let intensity = self.apply(start).expect("start is valid within a single piece");
        intensity * hours
    }

    fn next_discrete_point_from(
        &self,
        min: DateTime<Utc>,
        argument: DateTime<Utc>,
        max: DateTime<Utc>,
    ) -> Option<EmissionPoint> {
        let last_intensity = self.points.last().unwrap().intensity;
        next_with_tail(
            &self.points,
            |p| p.time,
            |tail_domain| EmissionPoint::new(tail_domain, last_intensity),
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

    fn at(min: i64) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2021-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            + Duration::minutes(min)
    }

    #[test]
    fn five_minute_resolution_tail() {
        let f = EmissionFunction::new(
            vec![
                EmissionPoint::new(at(0), 100.0),
                EmissionPoint::new(at(5), 120.0),
                EmissionPoint::new(at(10), 90.0),
            ],
            Duration::minutes(5),
        )
        .unwrap();

        assert_eq!(f.max_domain(), at(15));
        assert_eq!(f.apply(at(12)).unwrap(), 90.0);
        assert_eq!(f.apply(f.max_domain()).unwrap(), 90.0);
    }

    #[test]
    fn point_evaluation_matches_breakpoints() {
        let f = EmissionFunction::new(
            vec![
                EmissionPoint::new(at(0), 100.0),
                EmissionPoint::new(at(5), 120.0),
            ],
            Duration::minutes(5),
        )
        .unwrap();
        for p in f.points() {
            assert_eq!(f.apply(p.time).unwrap(), p.intensity);
        }
    }
}
