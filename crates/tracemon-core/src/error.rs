use std::collections::TryReserveError;

use thiserror::Error;

/// Failure to open a metric source. Surfaces as a command-line error.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("unknown counter identifier '{0}'")]
    UnknownCounter(String),

    #[error("counter '{counter}' has no instance '{instance}'")]
    NoSuchInstance { counter: String, instance: String },

    #[error("counters are not supported on this platform")]
    Unsupported,
}

/// A single failed collection. Recoverable: the poller logs it and keeps going.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("counter unavailable: {0}")]
    Unavailable(String),

    #[error("source exhausted")]
    Exhausted,
}

/// Errors from the consumer-side chart model.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to allocate {width}-column sample buffer")]
    Alloc {
        width: usize,
        #[source]
        source: TryReserveError,
    },
}
