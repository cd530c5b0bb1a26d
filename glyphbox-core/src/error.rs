//! Error taxonomy shared by every glyphbox crate.
//!
//! Failures are reported through `Result`, never by panicking. Each
//! variant maps onto a stable integer result code (see [`Error::code`])
//! so that the C ABI in `glyphbox-layout` can hand the same numbers to
//! foreign callers.

use thiserror::Error;

/// Result code reported for success across the C ABI.
pub const SUCCESS: i32 = 0;
/// Generic failure (corrupt resource, failed read or write).
pub const FAILURE: i32 = -1;
/// A heap allocation could not be satisfied.
pub const FAILED_TO_ALLOCATE_MEMORY: i32 = -32;
/// Operation attempted on an uninitialized or released object.
pub const INVALID_OBJECT: i32 = -512;
/// A required input was missing or empty.
pub const INVALID_PARAMETER: i32 = -511;
/// Layout ran out of boxes before every character was placed.
pub const NOT_ENOUGH_SPACE: i32 = -1024;

/// Errors raised by the [`Access`](crate::access::Access) backends.
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("range {offset}..{offset}+{len} is outside a buffer of {size} bytes")]
    OutOfBounds { offset: u64, len: usize, size: u64 },

    #[error("buffer is null")]
    NullBuffer,

    #[error("declared {what} of {value} exceeds the limit of {limit}")]
    LimitExceeded {
        what: &'static str,
        value: u64,
        limit: u64,
    },

    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: u64 },

    #[error("stream I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("object is not initialized")]
    InvalidObject,

    #[error("corrupt resource: {0}")]
    CorruptResource(#[source] AccessError),

    #[error("buffer access failed: {0}")]
    Access(#[from] AccessError),

    #[error("failed to allocate {bytes} bytes")]
    AllocationFailure { bytes: usize },
}

impl Error {
    /// Shorthand for a corrupt resource detected by a size check rather
    /// than by a failed read.
    pub fn corrupt(offset: u64, len: usize, size: u64) -> Self {
        Error::CorruptResource(AccessError::OutOfBounds { offset, len, size })
    }

    /// Stable integer code for this error.
    pub fn code(&self) -> i32 {
        match self {
            Error::InvalidParameter(_) => INVALID_PARAMETER,
            Error::InvalidObject => INVALID_OBJECT,
            Error::CorruptResource(_) | Error::Access(_) => FAILURE,
            Error::AllocationFailure { .. } => FAILED_TO_ALLOCATE_MEMORY,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
