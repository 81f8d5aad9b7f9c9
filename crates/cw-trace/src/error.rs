//! Trace-output error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TraceResult<T> = Result<T, TraceError>;
