//! Docker CLI plumbing: container discovery and bounded command execution.

use crate::error::TransferError;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use util::config::AppConfig;

/// Working directory inside every user sandbox.
pub const SANDBOX_WORK_DIR: &str = "/home/jovyan/work";

/// Ownership the sandbox expects on deposited files (jovyan user, users group).
pub const SANDBOX_UID: u64 = 1000;
pub const SANDBOX_GID: u64 = 100;
pub const SANDBOX_FILE_MODE: u32 = 0o644;

/// Bound on container listing/inspection calls.
const LOOKUP_TIMEOUT_SECS: u64 = 10;

/// A `docker` invocation pointed at the configured daemon.
pub fn docker_command() -> Command {
    let mut cmd = Command::new("docker");
    cmd.env("DOCKER_HOST", AppConfig::global().docker_host.clone());
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    cmd
}

/// Run a docker command to completion within `timeout_secs`.
pub async fn run_docker(
    args: &[&str],
    timeout_secs: u64,
) -> Result<std::process::Output, TransferError> {
    let mut cmd = docker_command();
    cmd.args(args);
    let child = cmd.spawn()?;
    timeout(Duration::from_secs(timeout_secs), child.wait_with_output())
        .await
        .map_err(|_| TransferError::Timeout(timeout_secs))?
        .map_err(TransferError::Io)
}

/// True when a container's environment declares the given owner.
///
/// Spawned container names are escaped and not reliably derived from the
/// username, so ownership is matched on the exact `JUPYTERHUB_USER` entry
/// rather than any name substring.
pub fn owner_matches(env_entries: &[String], student_id: &str) -> bool {
    let expected = format!("JUPYTERHUB_USER={student_id}");
    env_entries.iter().any(|entry| entry == &expected)
}

/// Locate the running sandbox container belonging to `student_id`.
///
/// Lists running containers under the fleet-wide name prefix (the course id),
/// then inspects each candidate's declared environment. Returns `Ok(None)`
/// when no container claims the user.
pub async fn find_user_container(student_id: &str) -> Result<Option<String>, TransferError> {
    let prefix = AppConfig::global().course_id.clone();
    tracing::info!(student_id, prefix, "looking for user sandbox container");

    let output = run_docker(
        &[
            "ps",
            "--filter",
            &format!("name={prefix}"),
            "--format",
            "{{.ID}}",
        ],
        LOOKUP_TIMEOUT_SECS,
    )
    .await?;
    if !output.status.success() {
        return Err(TransferError::Docker(
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ));
    }

    let ids = String::from_utf8_lossy(&output.stdout);
    for id in ids.lines().filter(|l| !l.is_empty()) {
        let inspect = run_docker(
            &["inspect", "--format", "{{json .Config.Env}}", id],
            LOOKUP_TIMEOUT_SECS,
        )
        .await?;
        if !inspect.status.success() {
            continue;
        }
        let env_entries: Vec<String> =
            serde_json::from_slice(&inspect.stdout).unwrap_or_default();
        if owner_matches(&env_entries, student_id) {
            tracing::info!(student_id, container = id, "found sandbox container");
            return Ok(Some(id.to_string()));
        }
    }

    tracing::info!(student_id, "no running sandbox container found");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_match_requires_exact_identity() {
        let envs = vec![
            "PATH=/usr/bin".to_string(),
            "JUPYTERHUB_USER=alice".to_string(),
        ];
        assert!(owner_matches(&envs, "alice"));
        // Substrings and prefixes must not match.
        assert!(!owner_matches(&envs, "ali"));
        assert!(!owner_matches(&envs, "alice2"));
        assert!(!owner_matches(&[], "alice"));
    }
}
