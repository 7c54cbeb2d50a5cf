//! Notebook preparation and assignment setup endpoints.

use crate::response::{ErrorResponse, MessageResponse, SetupResponse};
use axum::{
    Json,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use notebook::{Notebook, sanitize_for_students};
use sandbox::TransferError;
use serde_json::Value;
use util::paths;

/// POST /prepare-notebook/{student_id}/{assignment_name}
///
/// Copies a sanitized student version of a source notebook into the user's
/// sandbox workspace. Called when a user starts a challenge.
///
/// # Request Body
/// - `notebookPath` (string): Path of the uploaded source notebook. **Required**
/// - `notebookFilename` (string): Clean filename for the user's copy. **Required**
///
/// # Responses
/// - `200` `{success, message}` on success
/// - `400` when required fields are missing
/// - `404` when the sandbox or source notebook cannot be found
/// - `500` on transfer or processing failures
pub async fn prepare_notebook(
    Path((student_id, assignment_name)): Path<(String, String)>,
    body: Option<Json<Value>>,
) -> Response {
    tracing::info!(student_id, assignment_name, "preparing notebook for user");

    let req = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let notebook_path = req.get("notebookPath").and_then(Value::as_str);
    let notebook_filename = req.get("notebookFilename").and_then(Value::as_str);
    let (Some(notebook_path), Some(notebook_filename)) = (notebook_path, notebook_filename) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "notebookPath and notebookFilename are required",
            )),
        )
            .into_response();
    };

    let Some(source_path) = paths::resolve_uploaded_notebook(notebook_path) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!(
                "Source notebook not found for {notebook_path}"
            ))),
        )
            .into_response();
    };

    let notebook = match Notebook::from_path(&source_path) {
        Ok(notebook) => notebook,
        Err(e) => {
            tracing::error!(error = %e, path = %source_path.display(), "failed to read source notebook");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response();
        }
    };
    let content = match sanitize_for_students(notebook).to_vec() {
        Ok(content) => content,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response();
        }
    };

    match sandbox::push_to_sandbox(&student_id, &content, notebook_filename).await {
        Ok(()) => Json(MessageResponse::ok(format!(
            "Notebook {notebook_filename} prepared for user {student_id}"
        )))
        .into_response(),
        Err(e @ TransferError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, Json(ErrorResponse::new(e.to_string()))).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "error preparing notebook");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response()
        }
    }
}

/// POST /setup-assignment/{assignment_name}
///
/// Registers an assignment from a source notebook: writes the instructor copy
/// with grading metadata and generates the student release.
///
/// # Request Body
/// - `notebookPath` (string): Full path of the source notebook. **Required**
/// - `maxPoints` (number): Accepted for compatibility; points come from the
///   per-cell metadata. *(Optional)*
///
/// # Responses
/// - `200` `{success, message, sourcePath, releasePath}` on success
/// - `400` when `notebookPath` is missing
/// - `500` when setup fails
pub async fn setup_assignment(
    Path(assignment_name): Path<String>,
    body: Option<Json<Value>>,
) -> Response {
    tracing::info!(assignment_name, "setting up assignment");

    let req = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let Some(notebook_path) = req.get("notebookPath").and_then(Value::as_str) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("notebookPath is required")),
        )
            .into_response();
    };

    match grader::setup_assignment(std::path::Path::new(notebook_path), &assignment_name).await {
        Ok(setup) => Json(SetupResponse {
            success: true,
            message: format!("Assignment {assignment_name} set up successfully"),
            source_path: setup.source_path.display().to_string(),
            release_path: setup.release_path.display().to_string(),
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to setup assignment");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::json;

    #[tokio::test]
    async fn prepare_requires_both_body_fields() {
        let response = prepare_notebook(
            Path(("alice".into(), "week5".into())),
            Some(Json(json!({"notebookPath": "uploads/notebooks/x.ipynb"}))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn prepare_without_body_is_a_bad_request() {
        let response = prepare_notebook(Path(("alice".into(), "week5".into())), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn setup_requires_notebook_path() {
        let response = setup_assignment(Path("week5".into()), Some(Json(json!({})))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
