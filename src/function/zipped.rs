use chrono::{DateTime, Duration, Utc};

use crate::error::EngineError;
use super::{DiscreteFunction, EmissionFunction, PowerUsageFunction, SpotPriceFunction};

/// Anything that prices or weights wall-clock time at a constant rate per
/// piece — implemented by both [`SpotPriceFunction`] and [`EmissionFunction`].
/// Lets [`PowerWeightedFunction`] stay generic over "what's being integrated
/// against power" without fighting the trait system over a tuple domain: a
/// literal `ZippedDiscreteFunction<D1, D2, ...>` generic over both sides'
/// domain, codomain and point types was considered and rejected as harder to
/// read than the value it added here, since both concrete weights share the
/// same wall-clock domain.
pub trait WallClockFunction: DiscreteFunction<Domain = DateTime<Utc>, Codomain = f64> {}

impl WallClockFunction for SpotPriceFunction {}
impl WallClockFunction for EmissionFunction {}

/// The product of a task's power draw and a wall-clock-indexed weight
/// (price or carbon intensity), synchronously advanced breakpoint by
/// breakpoint so neither side's pieces are ever split incorrectly.
pub struct PowerWeightedFunction<'a, W: WallClockFunction> {
    power: &'a PowerUsageFunction,
    weight: &'a W,
}

pub type PowerPriceFunction<'a> = PowerWeightedFunction<'a, SpotPriceFunction>;
pub type PowerEmissionFunction<'a> = PowerWeightedFunction<'a, EmissionFunction>;

impl<'a, W: WallClockFunction> PowerWeightedFunction<'a, W> {
    pub fn new(power: &'a PowerUsageFunction, weight: &'a W) -> Self {
        Self { power, weight }
    }

    /// The integral of `power(t - start_time) * weight(t)` over
    /// `[start_time, end_time]`, where `start_offset`/`end_offset` are the
    /// corresponding elapsed-runtime bounds fed to `power`. The two bound
    /// pairs must describe the same span of wall-clock time; a caller
    /// passing inconsistent pairs (e.g. from independently rounded
    /// intermediate values) gets a `DomainViolation` rather than a silently
    /// wrong number.
    pub fn integrate_from_to(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        start_offset: Duration,
        end_offset: Duration,
    ) -> Result<f64, EngineError> {
        if end_time - start_time != end_offset - start_offset {
            return Err(EngineError::DomainViolation(
                "wall-clock span and elapsed-runtime span must match in a zipped integration"
                    .into(),
            ));
        }
        if start_time == end_time {
            return Ok(0.0);
        }

        let power_min = self.power.min_domain();
        let power_max = self.power.max_domain();
        let weight_min = self.weight.min_domain();
        let weight_max = self.weight.max_domain();

        let mut total = 0.0;
        let mut cursor_time = start_time;
        let mut cursor_offset = start_offset;
        loop {
            if cursor_time == end_time {
                break;
            }

            let next_power_time = self
                .power
                .next_discrete_point_from(power_min, cursor_offset, power_max)
                .map(|p| cursor_time + (p.0 - cursor_offset));
            let next_weight_time =
                self.weight
                    .next_discrete_point_from(weight_min, cursor_time, weight_max);

            let segment_end = [Some(end_time), next_power_time, next_weight_time]
                .into_iter()
                .flatten()
                .min()
                .unwrap();

            let power_value = self.power.apply(cursor_offset)?;
            let weight_value = self.weight.apply(cursor_time)?;
            let hours = (segment_end - cursor_time).num_milliseconds() as f64 / 3_600_000.0;
            total += power_value * weight_value * hours;

            cursor_offset = cursor_offset + (segment_end - cursor_time);
            cursor_time = segment_end;
        }
        Ok(total)
    }

    /// The integral over the task's full runtime, starting at `start_time`.
    pub fn integrate_full_run(&self, start_time: DateTime<Utc>) -> Result<f64, EngineError> {
        let duration = self.power.duration();
        self.integrate_from_to(
            start_time,
            start_time + duration,
            Duration::zero(),
            duration,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PricePoint;

    fn at(hour: u32) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2021-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            + Duration::hours(hour as i64)
    }

    #[test]
    fn constant_power_and_price_multiply_linearly() {
        let price = SpotPriceFunction::new(
            vec![PricePoint::new(at(0), 2.0), PricePoint::new(at(1), 2.0)],
            Duration::hours(1),
        )
        .unwrap();
        let power = PowerUsageFunction::constant(Duration::hours(2), 3.0).unwrap();
        let zipped = PowerWeightedFunction::new(&power, &price);

        let cost = zipped.integrate_full_run(at(0)).unwrap();
        assert!((cost - 12.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_mismatched_spans() {
        let price = SpotPriceFunction::new(
            vec![PricePoint::new(at(0), 2.0), PricePoint::new(at(1), 2.0)],
            Duration::hours(1),
        )
        .unwrap();
        let power = PowerUsageFunction::constant(Duration::hours(2), 3.0).unwrap();
        let zipped = PowerWeightedFunction::new(&power, &price);

        let res = zipped.integrate_from_to(at(0), at(1), Duration::zero(), Duration::hours(2));
        assert!(res.is_err());
    }

    #[test]
    fn price_step_mid_task_splits_the_integral() {
        // price: 10/kWh for the first hour, 5/kWh after; power is constant
        // 1kW for 2 hours starting exactly at the step.
        let price = SpotPriceFunction::new(
            vec![
                PricePoint::new(at(0), 10.0),
                PricePoint::new(at(1), 5.0),
                PricePoint::new(at(2), 5.0),
            ],
            Duration::hours(1),
        )
        .unwrap();
        let power = PowerUsageFunction::constant(Duration::hours(2), 1.0).unwrap();
        let zipped = PowerWeightedFunction::new(&power, &price);

        let cost = zipped.integrate_full_run(at(0)).unwrap();
        assert!((cost - 15.0).abs() < 1e-9);
    }
}
