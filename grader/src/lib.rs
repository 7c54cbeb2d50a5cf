//! # Grader Library
//!
//! Drives the external `nbgrader` autograder and turns its output into a
//! normalized score record. Score recovery is dual-path: the structured JSON
//! export is preferred, with a direct gradebook query as fallback. The final
//! record is delivered upstream through a best-effort webhook.
//!
//! Every external invocation runs under a hard wall-clock timeout, and every
//! failure in the grading pipeline collapses to a logged `None` — a partial or
//! garbage score is never reported upstream.

pub mod adapter;
pub mod error;
pub mod gradebook;
pub mod score;
pub mod setup;
pub mod webhook;

pub use adapter::grade;
pub use error::GraderError;
pub use score::ScoreRecord;
pub use setup::{SetupPaths, setup_assignment};
pub use webhook::report_grade;
