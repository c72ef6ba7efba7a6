//! Crate-wide error type.

use thiserror::Error;

/// Failures reported by the containers. None of them are retried or
/// recovered internally; a failed call leaves the container untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("key not found")]
    KeyNotFound,
    #[error("unsupported key type: {0} keys cannot be hashed")]
    UnsupportedKeyType(&'static str),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("heap is empty")]
    EmptyHeap,
    #[error("element not found")]
    ElementNotFound,
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;
