//! Data model for merge requests, their diffs and inline discussion positions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Target of every operation: a merge request inside a project.
///
/// * `project_id` – numeric GitLab project ID (`project.id` in webhooks).
/// * `iid`        – project-scoped MR number (`object_attributes.iid`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequestRef {
    pub project_id: u64,
    pub iid: u64,
}

impl fmt::Display for MergeRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "project {} !{}", self.project_id, self.iid)
    }
}

/// Triple of SHAs GitLab needs to bind an inline comment to a diff version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRefs {
    pub base_sha: String,
    pub start_sha: String,
    pub head_sha: String,
}

/// File-level change as returned by `GET .../merge_requests/:iid/diffs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    pub old_path: String,
    pub new_path: String,
    #[serde(default)]
    pub new_file: bool,
    #[serde(default)]
    pub renamed_file: bool,
    #[serde(default)]
    pub deleted_file: bool,
    /// GitLab omits the patch for files over its size limits.
    #[serde(default)]
    pub too_large: bool,
    /// Unified diff text; empty for binary or collapsed files.
    #[serde(default)]
    pub diff: String,
}

/// Snapshot of a merge request's current changes.
///
/// Fetched once per pipeline run and never cached. An MR without changes is
/// a valid, empty `DiffSet`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSet {
    pub iid: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_refs: Option<DiffRefs>,
    pub changes: Vec<FileDiff>,
}

impl DiffSet {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Kind of diff position GitLab understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionType {
    Text,
    Image,
}

/// Fully resolved `position` object for `POST .../discussions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscussionPosition {
    pub base_sha: String,
    pub start_sha: String,
    pub head_sha: String,
    pub position_type: PositionType,
    pub new_path: String,
    pub old_path: Option<String>,
    pub old_line: Option<u64>,
    pub new_line: u64,
    pub line_code: String,
}

/// Note created by `POST .../notes`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Note {
    pub id: u64,
}

/// Discussion created by `POST .../discussions`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Discussion {
    pub id: String,
}
