use thiserror::Error;

/// Represents all error types that can occur while transferring files to or
/// from a user sandbox.
///
/// `NotFound` carries a user-actionable message suitable for returning to the
/// HTTP caller verbatim; the remaining variants describe transport faults.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Neither the sandbox nor the fallback location had the file.
    #[error("{0}")]
    NotFound(String),
    /// The docker CLI returned a non-zero exit status.
    #[error("sandbox command failed: {0}")]
    Docker(String),
    /// A docker invocation exceeded its wall-clock bound.
    #[error("sandbox command timed out after {0}s")]
    Timeout(u64),
    /// The returned archive stream could not be unpacked.
    #[error("archive error: {0}")]
    Archive(String),
    /// Host-side I/O error while staging the file.
    #[error("transfer I/O error: {0}")]
    Io(#[from] std::io::Error),
}
