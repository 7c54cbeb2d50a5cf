use std::path::Path;

/// Identity of one submission, derived from the physical path alone.
///
/// The canonical layout is `.../submitted/<student_id>/<assignment_name>/<file>.ipynb`;
/// the two segments after the first `submitted` component carry the identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionIdentity {
    pub student_id: String,
    pub assignment_name: String,
}

impl SubmissionIdentity {
    /// Parse a submission path. A path without a `submitted` segment, or with
    /// fewer than two segments after it, is a parse failure.
    pub fn from_path(path: &Path) -> Option<Self> {
        let parts: Vec<String> = path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        let submitted_idx = parts.iter().position(|p| p == "submitted")?;
        let student_id = parts.get(submitted_idx + 1)?.clone();
        let assignment_name = parts.get(submitted_idx + 2)?.clone();

        Some(Self {
            student_id,
            assignment_name,
        })
    }
}
