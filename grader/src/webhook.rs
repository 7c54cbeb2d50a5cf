//! Grade delivery to the upstream application.

use crate::score::ScoreRecord;
use chrono::Utc;
use serde::Serialize;
use std::time::Duration;
use util::config::AppConfig;

/// Bound on the delivery POST.
const REPORT_TIMEOUT_SECS: u64 = 30;

/// Wire payload for a reported grade. Authentication is a shared-secret field
/// in the body, not a header.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeWebhook<'a> {
    pub assignment_name: &'a str,
    pub student_id: &'a str,
    pub score: f64,
    pub max_score: f64,
    pub webhook_secret: &'a str,
    pub timestamp: String,
}

impl<'a> GradeWebhook<'a> {
    pub fn new(
        student_id: &'a str,
        assignment_name: &'a str,
        record: &ScoreRecord,
        webhook_secret: &'a str,
    ) -> Self {
        Self {
            assignment_name,
            student_id,
            score: record.score,
            max_score: record.max_score,
            webhook_secret,
            timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        }
    }
}

/// Report a grade to the configured webhook endpoint.
///
/// At-most-once delivery: the payload is built fresh, POSTed once with a
/// 30-second timeout, and never retried or persisted. A non-2xx response or
/// transport failure is logged as an error; the grading attempt is complete
/// either way, so nothing is surfaced to the caller.
pub async fn report_grade(student_id: &str, assignment_name: &str, record: &ScoreRecord) {
    let (url, secret) = {
        let cfg = AppConfig::global();
        (cfg.webhook_url.clone(), cfg.webhook_secret.clone())
    };
    if secret.is_empty() {
        tracing::warn!("webhook secret not set, using empty secret");
    }

    let payload = GradeWebhook::new(student_id, assignment_name, record, &secret);
    tracing::info!(
        url,
        student_id,
        assignment_name,
        score = record.score,
        max_score = record.max_score,
        "reporting grade"
    );

    let client = reqwest::Client::new();
    let response = client
        .post(&url)
        .json(&payload)
        .timeout(Duration::from_secs(REPORT_TIMEOUT_SECS))
        .send()
        .await;

    match response {
        Ok(response) if response.status().is_success() => {
            tracing::info!(status = %response.status(), "grade reported successfully");
        }
        Ok(response) => {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body, "failed to report grade");
        }
        Err(e) => {
            tracing::error!(error = %e, "error reporting grade");
        }
    }
}
