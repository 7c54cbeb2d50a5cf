//! Response shapes for all outgoing JSON.
//!
//! Every endpoint returns structured JSON with an explicit `success` flag;
//! errors carry a human-readable `error` message the caller can surface.

use serde::Serialize;

/// `GET /health` body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy",
            service: "grading",
        }
    }
}

/// Generic success envelope.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Generic failure envelope.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// `POST /submit/...` success body: where the pulled submission landed.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub path: String,
}

/// `POST /setup-assignment/...` success body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupResponse {
    pub success: bool,
    pub message: String,
    pub source_path: String,
    pub release_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn error_envelope_has_explicit_success_flag() {
        let value: Value = serde_json::to_value(ErrorResponse::new("nope")).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "nope");
    }

    #[test]
    fn setup_response_uses_camel_case_paths() {
        let response = SetupResponse {
            success: true,
            message: "done".into(),
            source_path: "/course/source/week5/week5.ipynb".into(),
            release_path: "/course/release/week5/week5.ipynb".into(),
        };
        let value: Value = serde_json::to_value(response).unwrap();
        assert!(value.get("sourcePath").is_some());
        assert!(value.get("releasePath").is_some());
    }
}
