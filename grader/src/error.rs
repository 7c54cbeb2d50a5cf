use thiserror::Error;

/// Errors surfaced by the assignment setup pipeline.
///
/// Grading itself never returns an error: grade failures collapse to `None`
/// so a failed run can never leak a partial score upstream.
#[derive(Debug, Error)]
pub enum GraderError {
    /// The uploaded source notebook could not be located.
    #[error("source notebook not found: {0}")]
    SourceNotFound(String),
    /// Neither the registration tool nor the manual fallback produced a
    /// release notebook.
    #[error("failed to create release notebook at {0}")]
    ReleaseNotCreated(String),
    #[error(transparent)]
    Notebook(#[from] notebook::NotebookError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
