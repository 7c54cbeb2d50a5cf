//! Submission intake and grading trigger endpoints.

use crate::response::{ErrorResponse, MessageResponse, SubmitResponse};
use crate::state;
use axum::{
    Json,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use util::paths;

/// POST /submit/{student_id}/{assignment_name}
///
/// Pulls the student's notebook out of their sandbox into the submission tree
/// and starts grading in the background.
///
/// # Request Body
/// - `notebookFilename` (string): Name of the notebook in the sandbox
///   workspace. *(Optional, defaults to `<assignment_name>.ipynb`)*
/// - `notebookPath` (string): Uploaded source notebook path, used to register
///   the assignment on the fly when it is not set up yet. *(Optional)*
///
/// # Responses
/// - `200` `{success, message, path}` once the file is staged and grading is queued
/// - `400` `{success:false, error}` when the notebook cannot be retrieved
pub async fn submit_for_grading(
    Path((student_id, assignment_name)): Path<(String, String)>,
    body: Option<Json<Value>>,
) -> Response {
    tracing::info!(student_id, assignment_name, "received submission request");

    let req = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let notebook_filename = req
        .get("notebookFilename")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{assignment_name}.ipynb"));
    let notebook_path = req
        .get("notebookPath")
        .and_then(Value::as_str)
        .unwrap_or_default();

    // Autograding needs the assignment registered in the source tree; set it
    // up on the fly when missing and the caller told us where the source is.
    if !paths::source_dir(&assignment_name).exists() && !notebook_path.is_empty() {
        match paths::resolve_uploaded_notebook(notebook_path) {
            Some(source) => match grader::setup_assignment(&source, &assignment_name).await {
                Ok(_) => tracing::info!(assignment_name, "source assignment set up before grading"),
                Err(e) => tracing::error!(error = %e, "failed to set up source assignment"),
            },
            None => {
                tracing::warn!(notebook_path, "could not find source notebook to set up assignment")
            }
        }
    }

    match sandbox::pull_submission(&student_id, &assignment_name, &notebook_filename).await {
        Ok(path) => {
            state::dispatcher().dispatch(path.clone());
            Json(SubmitResponse {
                success: true,
                message: "Submission received, grading started".into(),
                path: path.display().to_string(),
            })
            .into_response()
        }
        Err(e) => {
            (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string()))).into_response()
        }
    }
}

/// POST /grade/{student_id}/{assignment_name}
///
/// Directly triggers grading for an existing submission.
///
/// # Responses
/// - `200` `{success, message}` when a notebook was found and queued
/// - `404` `{success:false, error}` when no submission exists for the pair
pub async fn trigger_grading(Path((student_id, assignment_name)): Path<(String, String)>) -> Response {
    tracing::info!(student_id, assignment_name, "received grading request");

    match state::dispatcher().dispatch_existing(&student_id, &assignment_name) {
        Ok(_) => Json(MessageResponse::ok("Grading started")).into_response(),
        Err(e) => (StatusCode::NOT_FOUND, Json(ErrorResponse::new(e.to_string()))).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serial_test::serial;
    use util::config::AppConfig;

    #[tokio::test]
    #[serial]
    async fn trigger_returns_404_without_a_submission() {
        let tmp = tempfile::tempdir().unwrap();
        AppConfig::set_course_root(tmp.path().to_string_lossy().to_string());
        state::init_dispatcher(2);

        let response = trigger_grading(Path(("alice".into(), "week5".into()))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Submission not found");
        AppConfig::reset();
    }

    #[tokio::test]
    #[serial]
    async fn trigger_queues_an_existing_submission() {
        let tmp = tempfile::tempdir().unwrap();
        AppConfig::set_course_root(tmp.path().to_string_lossy().to_string());
        state::init_dispatcher(2);

        let dir = tmp.path().join("submitted/alice/week5");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("week5.ipynb"), "{}").unwrap();

        let response = trigger_grading(Path(("alice".into(), "week5".into()))).await;
        assert_eq!(response.status(), StatusCode::OK);
        AppConfig::reset();
    }
}
