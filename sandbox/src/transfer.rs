//! Notebook transfer in and out of user sandboxes.

use crate::docker::{
    SANDBOX_FILE_MODE, SANDBOX_GID, SANDBOX_UID, SANDBOX_WORK_DIR, docker_command,
    find_user_container, run_docker,
};
use crate::error::TransferError;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;
use util::paths;

/// Bound on streaming a submission archive out of a container.
const ARCHIVE_PULL_TIMEOUT_SECS: u64 = 60;
/// Bound on the disposable volume-reader helper.
const VOLUME_HELPER_TIMEOUT_SECS: u64 = 30;
/// Bound on depositing a file into a container.
const PUSH_TIMEOUT_SECS: u64 = 30;

/// Image used for the disposable volume-reader helper.
const HELPER_IMAGE: &str = "alpine:latest";

const PULL_REMEDY: &str = "Could not find notebook. Please make sure your JupyterHub session is active and you have saved your work.";

/// Pull a student's notebook into the canonical submission location.
///
/// Tries the running sandbox container first (`docker cp` streams a tar
/// archive); when the container is gone or the file is absent there, falls
/// back to the student's persistent volume via a short-lived helper process.
/// Returns the path the submission was written to.
pub async fn pull_submission(
    student_id: &str,
    assignment_name: &str,
    filename: &str,
) -> Result<PathBuf, TransferError> {
    let dest_dir = paths::ensure_dir(paths::submitted_dir(student_id, assignment_name))?;
    let dest_file = dest_dir.join(filename);

    // A lookup failure only rules out the container path; the volume
    // fallback below can still succeed.
    let container = match find_user_container(student_id).await {
        Ok(container) => container,
        Err(e) => {
            tracing::info!(error = %e, "error searching containers");
            None
        }
    };

    if let Some(container) = container {
        let src = format!("{container}:{SANDBOX_WORK_DIR}/{filename}");
        let output = run_docker(&["cp", &src, "-"], ARCHIVE_PULL_TIMEOUT_SECS).await?;
        if output.status.success() {
            match extract_notebook_from_tar(&output.stdout)? {
                Some(content) => {
                    std::fs::write(&dest_file, content)?;
                    tracing::info!(path = %dest_file.display(), "copied notebook from container");
                    return Ok(dest_file);
                }
                None => {
                    return Err(TransferError::Archive(
                        "no notebook entry in container archive".into(),
                    ));
                }
            }
        }
        tracing::info!(student_id, filename, "notebook not in container, trying volume");
    }

    // Fallback: read straight off the user's persistent volume.
    let volume = format!("jupyterhub-user-{student_id}");
    tracing::info!(volume, "trying persistent volume");
    let output = run_docker(
        &[
            "run",
            "--rm",
            "-v",
            &format!("{volume}:/data:ro"),
            HELPER_IMAGE,
            "cat",
            &format!("/data/{filename}"),
        ],
        VOLUME_HELPER_TIMEOUT_SECS,
    )
    .await?;
    if output.status.success() && !output.stdout.is_empty() {
        std::fs::write(&dest_file, &output.stdout)?;
        tracing::info!(path = %dest_file.display(), "copied notebook from volume");
        return Ok(dest_file);
    }

    Err(TransferError::NotFound(PULL_REMEDY.into()))
}

/// Deposit `content` into the student's sandbox working directory.
///
/// Pushing requires an active session; there is no volume fallback. The file
/// lands as a single-entry tar with the ownership and mode the sandbox user
/// expects.
pub async fn push_to_sandbox(
    student_id: &str,
    content: &[u8],
    filename: &str,
) -> Result<(), TransferError> {
    let container = find_user_container(student_id).await?.ok_or_else(|| {
        TransferError::NotFound(format!(
            "No running container found for user {student_id}. Please start your JupyterHub session first."
        ))
    })?;

    let archive = pack_single_file_tar(filename, content)?;

    let mut cmd = docker_command();
    cmd.args(["cp", "-", &format!("{container}:{SANDBOX_WORK_DIR}")]);
    cmd.stdin(Stdio::piped());
    let mut child = cmd.spawn()?;

    let mut stdin = child.stdin.take().expect("stdin was piped");
    stdin.write_all(&archive).await?;
    drop(stdin);

    let output = timeout(
        Duration::from_secs(PUSH_TIMEOUT_SECS),
        child.wait_with_output(),
    )
    .await
    .map_err(|_| TransferError::Timeout(PUSH_TIMEOUT_SECS))??;

    if !output.status.success() {
        return Err(TransferError::Docker(
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ));
    }

    tracing::info!(student_id, filename, "copied notebook into sandbox workspace");
    Ok(())
}

/// Extract the first `.ipynb` entry from a tar stream.
fn extract_notebook_from_tar(bytes: &[u8]) -> Result<Option<Vec<u8>>, TransferError> {
    let mut archive = tar::Archive::new(Cursor::new(bytes));
    for entry in archive
        .entries()
        .map_err(|e| TransferError::Archive(e.to_string()))?
    {
        let mut entry = entry.map_err(|e| TransferError::Archive(e.to_string()))?;
        let is_notebook = entry
            .path()
            .map(|p| p.to_string_lossy().ends_with(".ipynb"))
            .unwrap_or(false);
        if is_notebook {
            let mut content = Vec::new();
            entry
                .read_to_end(&mut content)
                .map_err(|e| TransferError::Archive(e.to_string()))?;
            return Ok(Some(content));
        }
    }
    Ok(None)
}

/// Package one file into an in-memory tar with sandbox ownership attributes.
fn pack_single_file_tar(filename: &str, content: &[u8]) -> Result<Vec<u8>, TransferError> {
    let mut builder = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(SANDBOX_FILE_MODE);
    header.set_uid(SANDBOX_UID);
    header.set_gid(SANDBOX_GID);
    header.set_cksum();
    builder
        .append_data(&mut header, filename, content)
        .map_err(|e| TransferError::Archive(e.to_string()))?;
    builder
        .into_inner()
        .map_err(|e| TransferError::Archive(e.to_string()))
}
