//! HTTP route entry point.
//!
//! Route groups:
//! - `GET /health` → liveness probe
//! - `POST /prepare-notebook/{student_id}/{assignment_name}` → sanitize a source
//!   notebook and push it into the student's sandbox
//! - `POST /submit/{student_id}/{assignment_name}` → pull the student's notebook
//!   out of the sandbox and start async grading
//! - `POST /grade/{student_id}/{assignment_name}` → grade an already-present
//!   submission
//! - `POST /setup-assignment/{assignment_name}` → register an assignment and
//!   generate its student release

use axum::{
    Router,
    routing::{get, post},
};

pub mod health;
pub mod notebooks;
pub mod submissions;

/// Builds the complete application router for all HTTP endpoints.
pub fn routes() -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/prepare-notebook/{student_id}/{assignment_name}",
            post(notebooks::prepare_notebook),
        )
        .route(
            "/submit/{student_id}/{assignment_name}",
            post(submissions::submit_for_grading),
        )
        .route(
            "/grade/{student_id}/{assignment_name}",
            post(submissions::trigger_grading),
        )
        .route(
            "/setup-assignment/{assignment_name}",
            post(notebooks::setup_assignment),
        )
}
