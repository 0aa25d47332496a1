// src/types.rs
use serde::Deserialize;

/// Lifecycle status of a file within a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    /// Statuses the hosting api may grow (renamed, copied, ...).
    #[serde(other)]
    Other,
}

/// One changed file of a pull request, as reported by the hosting api.
///
/// `patch` is absent for binary files and for changes with an empty diff
/// (e.g. adding an empty `__init__.py`).
#[derive(Debug, Clone, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    pub status: FileStatus,
    #[serde(default)]
    pub patch: Option<String>,
    pub blob_url: String,
}

impl ChangedFile {
    /// Returns true if the file still exists at the head of the change.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.status != FileStatus::Removed
    }
}

/// A review comment anchored inside a file's diff.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewComment {
    pub path: String,
    #[serde(default)]
    pub position: Option<u32>,
    pub body: String,
    #[serde(default)]
    pub diff_hunk: String,
}

/// A plain pull-request-level comment.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    pub body: String,
}

/// One linter-reported issue, decoded from the finding stream.
///
/// `line` is 1-based within the current file content, not the diff.
/// `source` is the literal text of that line on disk at analysis time,
/// end-of-line stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub path: String,
    pub line: u32,
    pub source: String,
    pub message: String,
}
