//! Autograder invocation and score recovery.

use crate::gradebook;
use crate::score::{ScoreRecord, parse_export_report};
use notebook::{Notebook, restore_grading_metadata};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use util::paths;

/// Wall-clock bound on one autograde run.
const AUTOGRADE_TIMEOUT_SECS: u64 = 300;
/// Wall-clock bound on the structured report export.
const EXPORT_TIMEOUT_SECS: u64 = 60;

/// Run an `nbgrader` subcommand to completion within `timeout_secs`.
pub(crate) async fn run_nbgrader(
    args: &[&str],
    cwd: Option<&Path>,
    timeout_secs: u64,
) -> Result<std::process::Output, String> {
    let mut cmd = Command::new("nbgrader");
    cmd.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    tracing::info!(command = %format!("nbgrader {}", args.join(" ")), "running");

    let child = cmd.spawn().map_err(|e| e.to_string())?;
    timeout(Duration::from_secs(timeout_secs), child.wait_with_output())
        .await
        .map_err(|_| format!("nbgrader {} timed out after {timeout_secs}s", args[0]))?
        .map_err(|e| e.to_string())
}

/// Grade a submission and recover its score.
///
/// Restores grading metadata, runs the autograder, then extracts the score —
/// structured export first, gradebook query second. Any failure along the way
/// is logged and collapses to `None`; no webhook is sent for a `None` result.
pub async fn grade(student_id: &str, assignment_name: &str) -> Option<ScoreRecord> {
    // Students' edit sessions can strip grading metadata; put it back before
    // the autograder sees the notebook.
    restore_submission_metadata(student_id, assignment_name);

    let output = match run_nbgrader(
        &[
            "autograde",
            assignment_name,
            "--student",
            student_id,
            "--force",
        ],
        Some(&paths::course_root()),
        AUTOGRADE_TIMEOUT_SECS,
    )
    .await
    {
        Ok(output) => output,
        Err(e) => {
            tracing::error!(error = %e, "autograding failed to run");
            return None;
        }
    };

    if !output.status.success() {
        tracing::error!(
            stderr = %String::from_utf8_lossy(&output.stderr),
            "autograde failed"
        );
        return None;
    }

    collect_scores(student_id, assignment_name).await
}

/// Recover the score for an already-autograded submission.
async fn collect_scores(student_id: &str, assignment_name: &str) -> Option<ScoreRecord> {
    match run_nbgrader(
        &[
            "export",
            "--to",
            "json",
            "--assignment",
            assignment_name,
            "--student",
            student_id,
        ],
        Some(&paths::course_root()),
        EXPORT_TIMEOUT_SECS,
    )
    .await
    {
        Ok(output) if output.status.success() && !output.stdout.is_empty() => {
            if let Some(record) = parse_export_report(&String::from_utf8_lossy(&output.stdout)) {
                return Some(record);
            }
            tracing::warn!("export output did not parse, falling back to gradebook");
        }
        Ok(output) => {
            tracing::warn!(
                status = %output.status,
                "export produced no report, falling back to gradebook"
            );
        }
        Err(e) => {
            tracing::warn!(error = %e, "export failed, falling back to gradebook");
        }
    }

    match gradebook::fetch_scores(student_id, assignment_name).await {
        Ok(record) => record,
        Err(e) => {
            tracing::error!(error = %e, "gradebook query failed");
            None
        }
    }
}

/// Restore grading metadata on every submitted notebook from its source
/// counterpart. Best-effort: problems are logged per notebook and skipped.
fn restore_submission_metadata(student_id: &str, assignment_name: &str) {
    let submitted_dir = paths::submitted_dir(student_id, assignment_name);
    let source_dir = paths::source_dir(assignment_name);

    if !submitted_dir.exists() {
        tracing::warn!(path = %submitted_dir.display(), "submitted directory not found");
        return;
    }
    if !source_dir.exists() {
        tracing::warn!(path = %source_dir.display(), "source directory not found");
        return;
    }

    let entries = match std::fs::read_dir(&submitted_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!(error = %e, "failed to list submitted directory");
            return;
        }
    };

    for entry in entries.filter_map(Result::ok) {
        let submitted_path = entry.path();
        if submitted_path.extension().and_then(|e| e.to_str()) != Some("ipynb") {
            continue;
        }
        let Some(file_name) = submitted_path.file_name() else {
            continue;
        };
        let source_path = source_dir.join(file_name);
        if !source_path.exists() {
            tracing::warn!(path = %source_path.display(), "source notebook not found");
            continue;
        }

        match (
            Notebook::from_path(&source_path),
            Notebook::from_path(&submitted_path),
        ) {
            (Ok(source), Ok(submitted)) => {
                let (restored, count) = restore_grading_metadata(&source, submitted);
                match restored.write_to_path(&submitted_path) {
                    Ok(()) => tracing::info!(
                        cells = count,
                        notebook = %file_name.to_string_lossy(),
                        "restored grading metadata"
                    ),
                    Err(e) => {
                        tracing::error!(error = %e, path = %submitted_path.display(), "failed to write restored notebook")
                    }
                }
            }
            (source, submitted) => {
                if let Err(e) = source.and(submitted) {
                    tracing::error!(error = %e, path = %submitted_path.display(), "failed to restore metadata");
                }
            }
        }
    }
}
