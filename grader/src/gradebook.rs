//! Direct gradebook queries, used when the structured export is unavailable.
//!
//! The autograder keeps its gradebook in SQLite. Grades live per cell with
//! separate auto and manual components; maxima come from the graded cell
//! definitions. This module is strictly read-only.

use crate::score::{FALLBACK_MAX_SCORE, ScoreRecord};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::Row;
use std::path::Path;
use util::config::AppConfig;

const SCORE_QUERY: &str = r#"
SELECT
    SUM(COALESCE(g.auto_score, 0) + COALESCE(g.manual_score, 0)) AS total_score,
    SUM(gc.max_score) AS max_score
FROM grade g
JOIN submitted_notebook sn ON g.notebook_id = sn.id
JOIN submitted_assignment sa ON sn.assignment_id = sa.id
JOIN assignment a ON sa.assignment_id = a.id
JOIN student s ON sa.student_id = s.id
JOIN grade_cells gc ON g.cell_id = gc.id
WHERE a.name = ? AND s.id = ?
"#;

/// Sum a submission's scores straight out of the configured gradebook.
pub async fn fetch_scores(
    student_id: &str,
    assignment_name: &str,
) -> Result<Option<ScoreRecord>, sqlx::Error> {
    let path = AppConfig::global().gradebook_path.clone();
    fetch_scores_from(Path::new(&path), student_id, assignment_name).await
}

/// As [`fetch_scores`], against an explicit database path (injectable for tests).
pub async fn fetch_scores_from(
    db_path: &Path,
    student_id: &str,
    assignment_name: &str,
) -> Result<Option<ScoreRecord>, sqlx::Error> {
    if !db_path.exists() {
        tracing::error!(path = %db_path.display(), "gradebook database not found");
        return Ok(None);
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&format!("sqlite://{}?mode=ro", db_path.display()))
        .await?;

    let row = sqlx::query(SCORE_QUERY)
        .bind(assignment_name)
        .bind(student_id)
        .fetch_one(&pool)
        .await?;
    pool.close().await;

    let total: Option<f64> = row.try_get("total_score")?;
    let maximum: Option<f64> = row.try_get("max_score")?;
    Ok(normalize_row(total, maximum))
}

/// Turn the aggregate row into a score record.
///
/// No summed score means no graded rows existed — the caller must not report
/// a grade. A found score with no summable maxima gets the documented
/// placeholder maximum.
fn normalize_row(total: Option<f64>, maximum: Option<f64>) -> Option<ScoreRecord> {
    let score = total?;
    let max_score = maximum.unwrap_or(FALLBACK_MAX_SCORE);
    tracing::info!(score, max_score, "got grades from gradebook");
    Some(ScoreRecord {
        score,
        max_score,
        details: None,
    })
}
