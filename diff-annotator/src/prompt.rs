//! System prompts for the three flows.
//!
//! Each prompt lives in a JSON file of the form `{"system_prompt": "..."}`.
//! A missing file falls back to the built-in text below; a file that exists
//! but cannot be read or parsed is a startup error.

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_REVIEW_PROMPT: &str = r#"You are a senior engineer reviewing a GitLab merge request.
The user message is a JSON object with the merge request `iid`, `title`, `diff_refs` and `changes` (one entry per file with `old_path`, `new_path` and a unified `diff`).
Point out bugs, risky changes and unclear code. Only comment on added or modified lines.
Answer with a single JSON object and nothing else:
{"comments": [{"body": "<markdown comment>", "position": {"position_type": "text", "base_sha": "<diff_refs.base_sha>", "start_sha": "<diff_refs.start_sha>", "head_sha": "<diff_refs.head_sha>", "old_path": "<old_path>", "new_path": "<new_path>", "old_line": null, "new_line": <line number in the new file>}}]}
Return {"comments": []} when there is nothing worth saying. If the input cannot be reviewed, return {"comments": [{"error": "<reason>"}]}."#;

pub const DEFAULT_SUMMARIZE_PROMPT: &str = "You summarize GitLab merge requests for reviewers. \
The user message is the merge request diff as JSON. Write a short Markdown summary: \
what changed, why it likely changed, and anything a reviewer should double-check.";

pub const DEFAULT_DESCRIPTION_PROMPT: &str = "You write GitLab merge request descriptions. \
The user message is the merge request diff as JSON. Produce a Markdown description with a \
one-paragraph overview followed by a bullet list of notable changes. Do not invent context \
that is not visible in the diff.";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("failed to read prompt file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid prompt file {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Where to load prompts from.
#[derive(Debug, Clone)]
pub struct PromptFiles {
    pub review: PathBuf,
    pub summarize: PathBuf,
    pub description: Option<PathBuf>,
}

impl Default for PromptFiles {
    fn default() -> Self {
        Self {
            review: PathBuf::from("system_prompt.json"),
            summarize: PathBuf::from("system_prompt_summarize.json"),
            description: None,
        }
    }
}

/// Loaded prompts, shared read-only by every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPrompts {
    pub review: String,
    pub summarize: String,
    pub description: String,
}

impl Default for SystemPrompts {
    fn default() -> Self {
        Self {
            review: DEFAULT_REVIEW_PROMPT.to_string(),
            summarize: DEFAULT_SUMMARIZE_PROMPT.to_string(),
            description: DEFAULT_DESCRIPTION_PROMPT.to_string(),
        }
    }
}

impl SystemPrompts {
    pub fn load(files: &PromptFiles) -> Result<Self, PromptError> {
        let description = match &files.description {
            Some(p) => load_one(p, DEFAULT_DESCRIPTION_PROMPT)?,
            None => DEFAULT_DESCRIPTION_PROMPT.to_string(),
        };
        Ok(Self {
            review: load_one(&files.review, DEFAULT_REVIEW_PROMPT)?,
            summarize: load_one(&files.summarize, DEFAULT_SUMMARIZE_PROMPT)?,
            description,
        })
    }
}

#[derive(Deserialize)]
struct PromptFile {
    system_prompt: String,
}

fn load_one(path: &Path, fallback: &str) -> Result<String, PromptError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "prompt file not found, using built-in prompt");
            return Ok(fallback.to_string());
        }
        Err(source) => {
            return Err(PromptError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let file: PromptFile = serde_json::from_str(&raw).map_err(|e| PromptError::Invalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if file.system_prompt.trim().is_empty() {
        return Err(PromptError::Invalid {
            path: path.to_path_buf(),
            reason: "system_prompt is empty".into(),
        });
    }

    info!(path = %path.display(), len = file.system_prompt.len(), "prompt loaded");
    Ok(file.system_prompt)
}
