use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Process-lifetime record of submission paths already dispatched for grading.
///
/// The dedup key is the physical path, not a content hash: a second creation
/// event for the same file is a no-op, while a new file with identical
/// contents is still graded. The set does not survive a process restart.
#[derive(Debug, Clone, Default)]
pub struct SubmissionLedger {
    seen: Arc<Mutex<HashSet<PathBuf>>>,
}

impl SubmissionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path`, returning true only the first time it is seen.
    pub fn first_seen(&self, path: &Path) -> bool {
        self.seen
            .lock()
            .expect("ledger lock poisoned")
            .insert(path.to_path_buf())
    }

    /// Record `path` without caring whether it was new. Used to mark
    /// pre-existing files as already handled.
    pub fn observe(&self, path: &Path) {
        self.first_seen(path);
    }

    pub fn len(&self) -> usize {
        self.seen.lock().expect("ledger lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_path_is_first_seen_exactly_once() {
        let ledger = SubmissionLedger::new();
        let path = Path::new("/course/submitted/alice/week5/week5.ipynb");
        assert!(ledger.first_seen(path));
        assert!(!ledger.first_seen(path));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn distinct_paths_are_independent() {
        let ledger = SubmissionLedger::new();
        assert!(ledger.first_seen(Path::new("/a/submitted/x/y/a.ipynb")));
        assert!(ledger.first_seen(Path::new("/a/submitted/x/y/b.ipynb")));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn clones_share_the_backing_store() {
        let ledger = SubmissionLedger::new();
        let other = ledger.clone();
        assert!(ledger.first_seen(Path::new("/p.ipynb")));
        assert!(!other.first_seen(Path::new("/p.ipynb")));
    }
}
