use thiserror::Error;

/// Represents all error types that can occur while reading or writing notebooks.
///
/// The transform engine always distinguishes "processed" from "could not
/// process": a malformed document surfaces as [`NotebookError::Parse`] rather
/// than being silently copied through.
#[derive(Debug, Error)]
pub enum NotebookError {
    /// Notebook JSON is malformed or does not match the ipynb schema.
    #[error("failed to parse notebook: {0}")]
    Parse(#[from] serde_json::Error),
    /// I/O error (file not found, unreadable, etc.).
    #[error("notebook I/O error: {0}")]
    Io(#[from] std::io::Error),
}
