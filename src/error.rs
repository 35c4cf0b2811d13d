use thiserror::Error;

/// Typed failures surfaced by the scheduling engine (spec ERROR HANDLING DESIGN).
///
/// `ConstraintUnsatisfiable` is deliberately not produced as an `Err` by the
/// scheduler/recommender — an unsatisfiable task yields an `Ok` empty
/// schedule so a caller can tell the difference between "no feasible
/// placement" and a hard failure. The variant still exists here so callers
/// that want to report it explicitly have a typed value to match on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("InputOutOfHorizon: {0}")]
    InputOutOfHorizon(String),

    #[error("InvalidTimeSeries: {0}")]
    InvalidTimeSeries(String),

    #[error("ConstraintUnsatisfiable: {0}")]
    ConstraintUnsatisfiable(String),

    #[error("DomainViolation: {0}")]
    DomainViolation(String),
}
