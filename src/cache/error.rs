use thiserror::Error;

/// Failures local to the price/emission cache layer. Distinct from
/// `EngineError` because the engine itself never touches the network —
/// these are surfaced by the calling layer before the engine is invoked
/// (spec.md §7, `UpstreamUnavailable`).
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("UpstreamUnavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("LockPoisoned: {0}")]
    LockPoisoned(String),
}
