use crate::config::AppConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Create a directory (and all parents) if it doesn't exist, and return the path.
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> io::Result<PathBuf> {
    let p = path.as_ref();
    fs::create_dir_all(p)?;
    Ok(p.to_path_buf())
}

/// Ensure the parent directory of a *file path* exists (no-op if none).
pub fn ensure_parent_dir<P: AsRef<Path>>(file_path: P) -> io::Result<()> {
    if let Some(parent) = file_path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Course root (absolute), from `AppConfig::global().course_root`.
/// If relative in env, resolve against current_dir().
pub fn course_root() -> PathBuf {
    let root = AppConfig::global().course_root.clone();
    let p = PathBuf::from(root);
    if p.is_absolute() {
        p
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(p)
    }
}

/// Exchange tree watched for arriving submissions:
/// {EXCHANGE_ROOT}/{COURSE_ID}/submitted
pub fn exchange_submitted_dir() -> PathBuf {
    let cfg = AppConfig::global();
    PathBuf::from(&cfg.exchange_root)
        .join(&cfg.course_id)
        .join("submitted")
}

// ─── Course directory layout (a contract, not an implementation detail) ───

/// Instructor copy with grading metadata: {COURSE_ROOT}/source/{assignment}
pub fn source_dir(assignment: &str) -> PathBuf {
    course_root().join("source").join(assignment)
}

/// Student copy with solutions stripped: {COURSE_ROOT}/release/{assignment}
pub fn release_dir(assignment: &str) -> PathBuf {
    course_root().join("release").join(assignment)
}

/// Landed submissions: {COURSE_ROOT}/submitted/{student}/{assignment}
pub fn submitted_dir(student_id: &str, assignment: &str) -> PathBuf {
    course_root()
        .join("submitted")
        .join(student_id)
        .join(assignment)
}

/// Full path of one submitted notebook (does not create).
pub fn submission_path(student_id: &str, assignment: &str, filename: &str) -> PathBuf {
    submitted_dir(student_id, assignment).join(filename)
}

static UUID_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-f0-9-]{36}_").expect("valid uuid prefix regex"));

/// Strip the 36-character UUID-plus-underscore prefix uploads carry,
/// yielding the canonical notebook filename.
pub fn clean_notebook_name(filename: &str) -> String {
    UUID_PREFIX.replace(filename, "").into_owned()
}

/// Resolve an uploaded notebook path against the notebooks volume.
///
/// Upload paths arrive relative to `uploads/`; the same files are mounted for
/// this service under {NOTEBOOKS_ROOT}. A flat `notebooks/` subdirectory is
/// tried as the alternate location.
pub fn resolve_uploaded_notebook(notebook_path: &str) -> Option<PathBuf> {
    let root = PathBuf::from(AppConfig::global().notebooks_root.clone());
    let primary = root.join(notebook_path.trim_start_matches("uploads/"));
    if primary.exists() {
        return Some(primary);
    }
    let file_name = Path::new(notebook_path).file_name()?;
    let alternate = root.join("notebooks").join(file_name);
    alternate.exists().then_some(alternate)
}
