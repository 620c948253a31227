use thiserror::Error;

/// Errors surfaced by the performance layer.
///
/// Construction-time validation is the only fatal condition; runtime
/// operations signal absence through `Option` instead of erroring.
#[derive(Error, Debug)]
pub enum PerfError {
    #[error("Configuration error: {0}")] Config(String),
}

pub type PerfResult<T> = Result<T, PerfError>;
