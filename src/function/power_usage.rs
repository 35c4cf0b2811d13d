use chrono::Duration;

use crate::error::EngineError;
use super::{breakpoints_between, next_with_tail, DiscreteFunction};

/// The power consumption profile of a task, as a piecewise-constant function
/// of elapsed runtime. The first breakpoint is always at offset zero (the
/// value is repeated there if the caller didn't supply it), and the
/// function is extended `extend_by` past the last breakpoint — the
/// function's effective duration is `last_offset + extend_by`.
#[derive(Debug, Clone)]
pub struct PowerUsageFunction {
    points: Vec<(Duration, f64)>,
    extend_by: Duration,
}

impl PowerUsageFunction {
    pub fn new(mut power_points: Vec<(Duration, f64)>, extend_by: Duration) -> Result<Self, EngineError> {
        if power_points.is_empty() {
            return Err(EngineError::InvalidTimeSeries("power curve is empty".into()));
        }
        if power_points[0].0 > Duration::zero() {
            power_points.insert(0, (Duration::zero(), power_points[0].1));
        }
        if power_points[0].0 < Duration::zero() {
            return Err(EngineError::InvalidTimeSeries(
                "power curve's first offset must not be negative".into(),
            ));
        }
        for pair in power_points.windows(2) {
            if pair[0].0 >= pair[1].0 {
                return Err(EngineError::InvalidTimeSeries(
                    "power curve offsets must be strictly increasing".into(),
                ));
            }
        }

        Ok(Self { points: power_points, extend_by })
    }

    /// A constant-power task: a single breakpoint at `duration` and no tail.
    pub fn constant(duration: Duration, kilowatts: f64) -> Result<Self, EngineError> {
        Self::new(vec![(duration, kilowatts)], Duration::zero())
    }

    /// The task's total running duration: `last_offset + extend_by`.
    pub fn duration(&self) -> Duration {
        self.max_domain()
    }

    /// The smallest gap between consecutive breakpoints (including the
    /// `extend_by` tail as the final gap), used to seed the scheduler's
    /// zipped forward-iteration step size.
    pub fn min_step(&self) -> Duration {
        let mut steps: Vec<Duration> = self
            .points
            .windows(2)
            .map(|w| w[1].0 - w[0].0)
            .collect();
        if self.extend_by > Duration::zero() {
            steps.push(self.extend_by);
        }
        steps.into_iter().min().unwrap_or(Duration::zero())
    }

    /// Every runtime at which the power curve changes, from zero to the end
    /// of the `extend_by` tail, inclusive.
    pub fn runtime_breakpoints(&self) -> Vec<Duration> {
        breakpoints_between(self, Duration::zero(), self.max_domain())
    }
}

impl DiscreteFunction for PowerUsageFunction {
    type Domain = Duration;
    type Codomain = f64;
    type Integral = f64;
    type Point = (Duration, f64);

    fn points(&self) -> &[(Duration, f64)] {
        &self.points
    }

    fn domain_of(&self, point: &(Duration, f64)) -> Duration {
        point.0
    }

    fn codomain_of(&self, point: &(Duration, f64)) -> f64 {
        point.1
    }

    fn min_domain(&self) -> Duration {
        Duration::zero()
    }

    fn max_domain(&self) -> Duration {
        self.points[self.points.len() - 1].0 + self.extend_by
    }

    fn zero_integral(&self) -> f64 {
        0.0
    }

    fn combine_integrals(&self, a: f64, b: f64) -> f64 {
        a + b
    }

    fn integral_over(&self, start: Duration, end: Duration) -> f64 {
        let hours = (end - start).num_milliseconds() as f64 / 3_600_000.0;
        let kilowatts = self.apply(start).expect("start is valid within a single piece");
        kilowatts * hours
    }

    fn next_discrete_point_from(
        &self,
        min: Duration,
        argument: Duration,
        max: Duration,
    ) -> Option<(Duration, f64)> {
        let last_power = self.points.last().unwrap().1;
        next_with_tail(
            &self.points,
            |p| p.0,
            |tail_domain| (tail_domain, last_power),
            self.extend_by,
            min,
            argument,
            max,
        )
    }
}
