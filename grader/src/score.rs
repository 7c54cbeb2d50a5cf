use serde::Serialize;
use serde_json::Value;

/// Substituted when the fallback path finds a score but no summable maxima.
pub const FALLBACK_MAX_SCORE: f64 = 100.0;

/// Normalized grading outcome: total awarded, total possible, and the raw
/// report when the structured export produced one.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreRecord {
    pub score: f64,
    pub max_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Parse the autograder's JSON export into a score record.
///
/// `score` is the sum of non-null per-item scores; `max_score` the sum of
/// declared per-item maxima. Returns `None` when the report is not valid
/// JSON — the caller then falls back to the gradebook.
pub fn parse_export_report(raw: &str) -> Option<ScoreRecord> {
    let report: Value = serde_json::from_str(raw).ok()?;

    let mut score = 0.0;
    let mut max_score = 0.0;
    if let Some(grades) = report.get("grades").and_then(Value::as_array) {
        for grade in grades {
            if let Some(item_score) = grade.get("score").and_then(Value::as_f64) {
                score += item_score;
            }
            max_score += grade.get("max_score").and_then(Value::as_f64).unwrap_or(0.0);
        }
    }

    Some(ScoreRecord {
        score,
        max_score,
        details: Some(report),
    })
}
