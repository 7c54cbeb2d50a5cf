use crate::response::HealthResponse;
use axum::{Json, response::IntoResponse};

/// GET /health
///
/// Returns a simple success response to indicate the service is running.
/// Used for uptime checks and health probes; always 200.
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::health_check;
    use axum::body::to_bytes;
    use axum::response::IntoResponse;
    use serde_json::Value;

    #[tokio::test]
    async fn health_check_returns_ok_json() {
        let response = health_check().await.into_response();
        assert_eq!(response.status(), 200);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "grading");
    }
}
