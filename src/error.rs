use thiserror::Error;

/// Errors that abort the handling of a single event.
///
/// Insufficient data and an exhausted retry budget are ordinary
/// `Simulation` outcomes, not errors; only storage failures land here.
#[derive(Debug, Error)]
pub enum BotError {
    /// A persistence operation failed. Propagated, never retried.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),
}
