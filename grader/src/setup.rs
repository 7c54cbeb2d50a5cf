//! Assignment setup: source registration and release generation.
//!
//! Turns an uploaded instructor notebook into the course-tree pair the rest
//! of the pipeline relies on: the metadata-annotated copy under `source/`
//! and the sanitized student copy under `release/`.

use crate::adapter::run_nbgrader;
use crate::error::GraderError;
use notebook::{Notebook, inject_grading_metadata, sanitize_for_students};
use std::path::{Path, PathBuf};
use util::paths;

/// Bound on the external assignment registration run.
const GENERATE_TIMEOUT_SECS: u64 = 60;

/// Where an assignment's instructor and student copies landed.
#[derive(Debug)]
pub struct SetupPaths {
    pub source_path: PathBuf,
    pub release_path: PathBuf,
}

/// Set up an assignment from an uploaded source notebook.
///
/// 1. Write the instructor copy (grading metadata injected) to
///    `source/<assignment>/`, stripping any UUID upload prefix from the name.
/// 2. Register the assignment with `nbgrader generate_assignment`, which also
///    produces the release copy. Registration failures are tolerated.
/// 3. If the release copy still does not exist, sanitize the source copy
///    manually; as a last resort the source is copied verbatim.
///
/// A missing release notebook after all fallbacks is an error.
pub async fn setup_assignment(
    source_notebook_path: &Path,
    assignment_name: &str,
) -> Result<SetupPaths, GraderError> {
    tracing::info!(
        assignment = assignment_name,
        source = %source_notebook_path.display(),
        "setting up assignment"
    );

    if !source_notebook_path.exists() {
        return Err(GraderError::SourceNotFound(
            source_notebook_path.display().to_string(),
        ));
    }

    let source_dir = paths::ensure_dir(paths::source_dir(assignment_name))?;
    let release_dir = paths::ensure_dir(paths::release_dir(assignment_name))?;

    let original_filename = source_notebook_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{assignment_name}.ipynb"));
    let notebook_name = paths::clean_notebook_name(&original_filename);
    tracing::info!(notebook_name, "cleaned notebook name");

    let source_dest = source_dir.join(&notebook_name);
    write_instructor_copy(source_notebook_path, &source_dest)?;

    match run_nbgrader(
        &[
            "generate_assignment",
            assignment_name,
            "--force",
            // Empty string disables the injected header notebook.
            "--IncludeHeaderFooter.header=",
        ],
        Some(&paths::course_root()),
        GENERATE_TIMEOUT_SECS,
    )
    .await
    {
        Ok(output) if output.status.success() => {
            tracing::info!(assignment = assignment_name, "generated assignment");
        }
        Ok(output) => {
            tracing::warn!(
                stdout = %String::from_utf8_lossy(&output.stdout),
                stderr = %String::from_utf8_lossy(&output.stderr),
                "generate_assignment failed, falling back to manual release creation"
            );
        }
        Err(e) => {
            tracing::warn!(error = %e, "generate_assignment did not run, falling back to manual release creation");
        }
    }

    let release_dest = release_dir.join(&notebook_name);
    if !release_dest.exists() {
        write_release_copy(&source_dest, &release_dest);
    }
    if !release_dest.exists() {
        return Err(GraderError::ReleaseNotCreated(
            release_dest.display().to_string(),
        ));
    }

    Ok(SetupPaths {
        source_path: source_dest,
        release_path: release_dest,
    })
}

/// Write the instructor copy with grading metadata injected.
///
/// An unparseable upload is copied verbatim: registration may still cope, and
/// refusing the upload outright would lose it.
fn write_instructor_copy(source: &Path, dest: &Path) -> Result<(), GraderError> {
    match Notebook::from_path(source) {
        Ok(nb) => {
            inject_grading_metadata(nb).write_to_path(dest)?;
        }
        Err(e) => {
            tracing::error!(error = %e, "could not parse source notebook, copying unmodified");
            std::fs::copy(source, dest)?;
        }
    }
    tracing::info!(dest = %dest.display(), "wrote instructor copy");
    Ok(())
}

/// Produce the student copy from the instructor copy. Never fails outright;
/// the caller checks for the release file afterwards.
fn write_release_copy(source_dest: &Path, release_dest: &Path) {
    match Notebook::from_path(source_dest) {
        Ok(nb) => match sanitize_for_students(nb).write_to_path(release_dest) {
            Ok(()) => tracing::info!(dest = %release_dest.display(), "created student version"),
            Err(e) => tracing::error!(error = %e, "failed to write student version"),
        },
        Err(e) => {
            tracing::error!(error = %e, "failed to create student version, copying source as fallback");
            if let Err(e) = std::fs::copy(source_dest, release_dest) {
                tracing::error!(error = %e, "fallback copy failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;
    use util::config::AppConfig;

    fn upload(dir: &Path, name: &str) -> PathBuf {
        let nb = json!({"cells": [
            {"cell_type": "code", "metadata": {},
             "source": "def f():\n    ### BEGIN SOLUTION\n    return 1\n    ### END SOLUTION\n"},
            {"cell_type": "code", "metadata": {}, "source": "assert f() == 1"}
        ]});
        let path = dir.join(name);
        std::fs::write(&path, nb.to_string()).unwrap();
        path
    }

    #[tokio::test]
    #[serial]
    async fn builds_source_and_release_copies() {
        let tmp = tempfile::tempdir().unwrap();
        AppConfig::set_course_root(tmp.path().join("course").to_string_lossy().to_string());

        let uploaded = upload(
            tmp.path(),
            "123e4567-e89b-12d3-a456-426614174000_week5.ipynb",
        );
        let result = setup_assignment(&uploaded, "week5").await.unwrap();

        // UUID upload prefix is stripped from the canonical name.
        assert!(result.source_path.ends_with("source/week5/week5.ipynb"));
        assert!(result.release_path.ends_with("release/week5/week5.ipynb"));

        let source = Notebook::from_path(&result.source_path).unwrap();
        assert_eq!(
            source.cells[0].grading_metadata().unwrap()["grade_id"],
            "cell_1"
        );

        let release = Notebook::from_path(&result.release_path).unwrap();
        let text = release.cells[0].source_text();
        assert!(text.contains("# YOUR CODE HERE"));
        assert!(!text.contains("return 1"));
        AppConfig::reset();
    }

    #[tokio::test]
    #[serial]
    async fn missing_upload_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        AppConfig::set_course_root(tmp.path().join("course").to_string_lossy().to_string());

        let result = setup_assignment(&tmp.path().join("nope.ipynb"), "week5").await;
        assert!(matches!(result, Err(GraderError::SourceNotFound(_))));
        AppConfig::reset();
    }
}
