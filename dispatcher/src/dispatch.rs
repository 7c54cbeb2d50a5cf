//! Submission dispatch: dedup, worker hand-off, and the grading attempt.

use crate::ledger::SubmissionLedger;
use crate::pool::WorkerPool;
use crate::submission::SubmissionIdentity;
use std::path::{Path, PathBuf};
use thiserror::Error;
use util::paths;

/// Failures surfaced to a direct grading trigger.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Submission not found")]
    SubmissionNotFound,
    #[error("No notebook found in submission")]
    NoNotebook,
}

/// Owns the lifecycle of submission-processing attempts: dedup ledger in,
/// grading worker out. Cheap to clone; clones share the ledger and pool.
#[derive(Clone)]
pub struct Dispatcher {
    ledger: SubmissionLedger,
    pool: WorkerPool,
}

impl Dispatcher {
    pub fn new(max_concurrent: usize) -> Self {
        Self::with_ledger(SubmissionLedger::new(), max_concurrent)
    }

    /// Build with an externally owned ledger, so tests can assert dedup
    /// behavior deterministically.
    pub fn with_ledger(ledger: SubmissionLedger, max_concurrent: usize) -> Self {
        Self {
            ledger,
            pool: WorkerPool::new(max_concurrent),
        }
    }

    pub fn ledger(&self) -> &SubmissionLedger {
        &self.ledger
    }

    /// Dispatch one submission file for grading.
    ///
    /// A path already dispatched in this process is a no-op. Otherwise the
    /// attempt runs on a pooled background worker; this call never waits for
    /// grading to finish.
    pub fn dispatch(&self, submission_path: PathBuf) {
        if !self.ledger.first_seen(&submission_path) {
            return;
        }
        tracing::info!(path = %submission_path.display(), "processing submission");

        let this = self.clone();
        tokio::spawn(async move {
            this.run_attempt(&submission_path).await;
        });
    }

    /// Dispatch grading for a submission that must already be on disk.
    pub fn dispatch_existing(
        &self,
        student_id: &str,
        assignment_name: &str,
    ) -> Result<PathBuf, DispatchError> {
        let dir = paths::submitted_dir(student_id, assignment_name);
        if !dir.exists() {
            return Err(DispatchError::SubmissionNotFound);
        }

        let notebook = first_notebook_in(&dir).ok_or(DispatchError::NoNotebook)?;
        self.dispatch(notebook.clone());
        Ok(notebook)
    }

    /// One grading attempt, start to finish. All failures are terminal for
    /// the attempt and logged; nothing propagates to the worker.
    async fn run_attempt(&self, submission_path: &Path) {
        let Some(identity) = SubmissionIdentity::from_path(submission_path) else {
            tracing::error!(
                path = %submission_path.display(),
                "could not derive submission identity from path"
            );
            return;
        };
        tracing::info!(
            student_id = identity.student_id,
            assignment = identity.assignment_name,
            "grading submission"
        );

        self.pool.acquire().await;
        match grader::grade(&identity.student_id, &identity.assignment_name).await {
            Some(record) => {
                grader::report_grade(&identity.student_id, &identity.assignment_name, &record)
                    .await;
            }
            None => {
                tracing::error!(
                    student_id = identity.student_id,
                    assignment = identity.assignment_name,
                    "grading produced no score, nothing reported"
                );
            }
        }
        self.pool.release().await;
    }
}

/// First notebook file in a submission directory, by name.
fn first_notebook_in(dir: &Path) -> Option<PathBuf> {
    let mut notebooks: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("ipynb"))
        .collect();
    notebooks.sort();
    notebooks.into_iter().next()
}
