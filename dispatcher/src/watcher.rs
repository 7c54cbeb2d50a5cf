//! Poll-based watcher over the submission exchange tree.

use crate::dispatch::Dispatcher;
use std::path::{Path, PathBuf};
use std::time::Duration;
use util::{config::AppConfig, paths};
use walkdir::WalkDir;

/// Collect notebook files under `root` that sit below a `submitted` segment.
pub fn scan_submission_tree(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension().and_then(|e| e.to_str()) == Some("ipynb")
                && path.components().any(|c| c.as_os_str() == "submitted")
        })
        .collect()
}

/// Spawn the long-lived submission watcher.
///
/// Scans the exchange's `submitted` tree on a fixed cadence and dispatches
/// every notebook file it has not seen before. The first pass only primes the
/// dispatcher's ledger: files already on disk at startup are not re-graded.
/// Dispatch hands each file to a pooled worker, so a slow grading run never
/// stalls the scan loop.
pub fn spawn_submission_watcher(dispatcher: Dispatcher) -> tokio::task::JoinHandle<()> {
    let watch_root = paths::exchange_submitted_dir();
    let poll = Duration::from_secs(AppConfig::global().watch_poll_seconds.max(1));

    tokio::spawn(async move {
        if let Err(e) = std::fs::create_dir_all(&watch_root) {
            tracing::error!(error = %e, path = %watch_root.display(), "could not create watch directory");
            return;
        }
        tracing::info!(path = %watch_root.display(), "watching for submissions");

        for path in scan_submission_tree(&watch_root) {
            dispatcher.ledger().observe(&path);
        }

        loop {
            tokio::time::sleep(poll).await;
            for path in scan_submission_tree(&watch_root) {
                dispatcher.dispatch(path);
            }
        }
    })
}
