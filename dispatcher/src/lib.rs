//! # Dispatcher Library
//!
//! The orchestration brain of the grading service. Watches the submission
//! tree for arriving notebooks, guarantees each physical file is dispatched
//! for grading at most once per process lifetime, and runs every grading
//! attempt on a bounded worker pool: metadata restoration, autograding and
//! score recovery, then webhook delivery.
//!
//! Event sources (the watcher and the HTTP triggers) never block on grading
//! completion; they hand the path to a worker and return.

pub mod dispatch;
pub mod ledger;
pub mod pool;
pub mod submission;
pub mod watcher;

pub use dispatch::{DispatchError, Dispatcher};
pub use ledger::SubmissionLedger;
pub use pool::WorkerPool;
pub use submission::SubmissionIdentity;
pub use watcher::spawn_submission_watcher;
