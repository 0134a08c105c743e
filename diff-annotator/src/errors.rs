//! Crate-wide error hierarchy for diff-annotator.
//!
//! Every variant carries a message that is safe to hand back to the webhook
//! caller verbatim; the HTTP layer turns it into `{"error": "..."}`.

use ai_llm_service::AiLlmError;
use gitlab_gateway::GitLabError;
use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type AnnotateResult<T> = Result<T, AnnotateError>;

/// Root error type for the annotation and summary flows.
#[derive(Debug, Error)]
pub enum AnnotateError {
    /// Webhook payload lacks a field needed to address the merge request.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The merge request diff could not be fetched.
    #[error("failed to fetch merge request diff: {0}")]
    UpstreamFetch(#[source] GitLabError),

    /// Structured completion still failing after the last retry.
    #[error("{last}")]
    LlmExhausted {
        attempts: u32,
        last: String,
    },

    /// The diff could not be serialized for the prompt.
    #[error("failed to encode diff for the model: {0}")]
    Encode(#[from] serde_json::Error),

    /// Single (non-retried) LLM call failed.
    #[error("LLM call failed: {0}")]
    Llm(#[from] AiLlmError),

    /// LLM output is not the JSON document we asked for.
    #[error("Failed to decode comment_data: {0}")]
    MalformedResponse(String),

    /// The model reported an error inside one of the comment entries.
    #[error("{0}")]
    Reported(String),

    /// `position` of a comment entry is present but not a JSON object.
    #[error("position is not a dictionary")]
    PositionNotObject,

    /// One or more mandatory position keys are absent.
    #[error("Missing required fields in position: {}", .missing_fields.join(", "))]
    Validation { missing_fields: Vec<String> },

    /// A position key is present but holds a value of the wrong type.
    #[error("Invalid value for position field {field}: expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    /// `new_path` is not present at `head_sha`.
    #[error("File {new_path} does not exist in the head branch.")]
    FileNotFound { new_path: String },

    /// Existence check for `new_path` itself failed.
    #[error("failed to look up {path}: {source}")]
    FileLookup {
        path: String,
        #[source]
        source: GitLabError,
    },

    /// Writing a note, description or discussion back to GitLab failed.
    #[error("failed to publish to GitLab: {0}")]
    Publish(#[source] GitLabError),
}
