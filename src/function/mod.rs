//! Piecewise-constant function algebra.
//!
//! `DiscreteFunction` is a capability trait rather than the runtime-generic
//! abstract base class of the system this crate's algorithms were modeled
//! on: `Domain`, `Codomain` and `Integral` are associated types fixed at
//! compile time per implementor, so the hot integration loop in
//! [`DiscreteFunction::integrate`] carries no virtual dispatch.

mod spot_price;
mod emission;
mod power_usage;
pub mod zipped;

pub use spot_price::SpotPriceFunction;
pub use emission::EmissionFunction;
pub use power_usage::PowerUsageFunction;
pub use zipped::{PowerPriceFunction, PowerEmissionFunction, PowerWeightedFunction};

use std::ops::{Add, Sub};
use chrono::{DateTime, Duration, Utc};
use crate::error::EngineError;

/// A piecewise-constant function over a discrete set of breakpoints, with
/// exact interval integration.
pub trait DiscreteFunction {
    type Domain: Ord + Copy;
    type Codomain: Copy;
    type Integral: Copy;
    type Point: Copy;

    fn points(&self) -> &[Self::Point];
    fn domain_of(&self, point: &Self::Point) -> Self::Domain;
    fn codomain_of(&self, point: &Self::Point) -> Self::Codomain;

    fn min_domain(&self) -> Self::Domain;
    fn max_domain(&self) -> Self::Domain;

    fn zero_integral(&self) -> Self::Integral;
    fn combine_integrals(&self, a: Self::Integral, b: Self::Integral) -> Self::Integral;

    /// The area under the function between `start` and `end`, which must lie
    /// within a single piece (or `end` must be exactly the next breakpoint).
    fn integral_over(&self, start: Self::Domain, end: Self::Domain) -> Self::Integral;

    /// The breakpoint immediately following the piece containing `argument`,
    /// bracketed to `[min, max]`. Implementors extend this past their last
    /// real breakpoint for the duration of their `extend_by` tail.
    fn next_discrete_point_from(
        &self,
        min: Self::Domain,
        argument: Self::Domain,
        max: Self::Domain,
    ) -> Option<Self::Point>;

    fn is_valid_argument(&self, argument: Self::Domain) -> bool {
        argument >= self.min_domain() && argument <= self.max_domain()
    }

    /// The breakpoint whose piece covers `argument`: the greatest breakpoint
    /// with domain `<= argument`.
    fn discrete_point_at(&self, argument: Self::Domain) -> Result<Self::Point, EngineError> {
        if !self.is_valid_argument(argument) {
            return Err(EngineError::DomainViolation(
                "argument is outside the function's domain".into(),
            ));
        }

        let points = self.points();
        let idx = points.partition_point(|p| self.domain_of(p) <= argument);
        debug_assert!(idx > 0, "min_domain invariant should guarantee idx > 0");
        Ok(points[idx - 1])
    }

    fn apply(&self, argument: Self::Domain) -> Result<Self::Codomain, EngineError> {
        let point = self.discrete_point_at(argument)?;
        Ok(self.codomain_of(&point))
    }

    /// The exact integral from `start` to `end`, decomposed iteratively at
    /// every breakpoint strictly between the two — rather than via a single
    /// running-sum sweep — so that a breakpoint falling between `start` and
    /// `end` can never be double counted or dropped by a floating point
    /// boundary comparison.
    fn integrate(&self, start: Self::Domain, end: Self::Domain) -> Result<Self::Integral, EngineError> {
        if start == end {
            return Ok(self.zero_integral());
        }
        if !self.is_valid_argument(start) || !self.is_valid_argument(end) {
            return Err(EngineError::DomainViolation(
                "integration bounds outside the function's domain".into(),
            ));
        }

        let (min, max) = (self.min_domain(), self.max_domain());
        let mut total = self.zero_integral();
        let mut cursor = start;
        loop {
            if cursor == end {
                break;
            }
            let next = self
                .next_discrete_point_from(min, cursor, max)
                .map(|p| self.domain_of(&p));
            let segment_end = match next {
                Some(n) if n < end => n,
                _ => end,
            };
            total = self.combine_integrals(total, self.integral_over(cursor, segment_end));
            cursor = segment_end;
        }
        Ok(total)
    }
}

/// Walks every breakpoint domain value from `start` to `end` inclusive,
/// using `next_discrete_point_from` to advance. Equivalent to the source's
/// single-function discrete-point iterator; candidate-start seeding and
/// slack calculations only ever iterate one function at a time in this
/// crate, so no separate iterator type is needed.
pub fn breakpoints_between<F: DiscreteFunction>(
    f: &F,
    start: F::Domain,
    end: F::Domain,
) -> Vec<F::Domain> {
    let mut result = Vec::new();
    let mut cursor = start;
    loop {
        result.push(cursor);
        if cursor == end {
            break;
        }
        match f.next_discrete_point_from(start, cursor, end) {
            Some(p) => cursor = f.domain_of(&p),
            None => break,
        }
    }
    result
}

/// Checks that `points` is non-empty, strictly increasing, and free of
/// duplicate timestamps — the shared precondition for `SpotPriceFunction`
/// and `EmissionFunction`, both of which decode an externally-sourced
/// series that makes no ordering guarantee of its own.
pub(crate) fn validate_ascending<P>(points: &[P], time_of: impl Fn(&P) -> DateTime<Utc>) -> Result<(), EngineError> {
    if points.is_empty() {
        return Err(EngineError::InvalidTimeSeries("point list is empty".into()));
    }
    for pair in points.windows(2) {
        let (a, b) = (time_of(&pair[0]), time_of(&pair[1]));
        if a == b {
            return Err(EngineError::InvalidTimeSeries(format!("duplicate timestamp at {}", a)));
        }
        if a > b {
            return Err(EngineError::InvalidTimeSeries(format!(
                "points are not in ascending order at {} -> {}",
                a, b
            )));
        }
    }
    Ok(())
}

/// Shared tail-extension logic for `next_discrete_point_from`: once `argument`
/// reaches the last real breakpoint, synthesize a point at `max_domain`
/// (holding the last breakpoint's value) for as long as `argument` is within
/// `extend_by` of it; otherwise fall back to the ordinary next-breakpoint
/// lookup.
pub(crate) fn next_with_tail<D, P>(
    points: &[P],
    domain_of: impl Fn(&P) -> D,
    make_tail_point: impl Fn(D) -> P,
    extend_by: Duration,
    min: D,
    argument: D,
    max: D,
) -> Option<P>
where
    D: Ord + Copy + Sub<D, Output = Duration> + Add<Duration, Output = D>,
    P: Copy,
{
    if argument < min || argument > max {
        return None;
    }

    let last = *points.last().expect("point list is non-empty by construction");
    let last_domain = domain_of(&last);
    if argument >= last_domain {
        let delta = argument - last_domain;
        if delta <= extend_by {
            return Some(make_tail_point(max));
        }
        return None;
    }

    let idx = points.partition_point(|p| domain_of(p) <= argument);
    points.get(idx).copied()
}
