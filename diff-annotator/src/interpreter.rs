//! Interpretation of the model's structured answer.
//!
//! Expected shape:
//! ```json
//! {"comments": [{"body": "...", "position": {...}}, {"error": "..."}]}
//! ```
//! A missing `comments` key means "nothing to say". The first entry carrying
//! an `error` key aborts the whole batch, as does a non-object `position`.
//! Field completeness of `position` is checked later, when the comment is
//! about to be posted.

use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::{AnnotateError, AnnotateResult};

/// One comment the model wants to leave on the diff.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposedComment {
    pub body: String,
    /// Untrusted position object; see [`crate::position::CommentPosition`].
    pub position: Map<String, Value>,
}

/// Parses the raw completion into proposed comments.
///
/// # Errors
/// - [`AnnotateError::MalformedResponse`] if the text is not a JSON object
///   or `comments` is not a list of objects
/// - [`AnnotateError::Reported`] with the first entry-level `error`
/// - [`AnnotateError::PositionNotObject`] for a non-object `position`
pub fn interpret(raw: &str) -> AnnotateResult<Vec<ProposedComment>> {
    let cleaned = strip_code_fence(raw);
    let doc: Value = serde_json::from_str(cleaned)
        .map_err(|e| AnnotateError::MalformedResponse(e.to_string()))?;

    let Value::Object(mut root) = doc else {
        return Err(AnnotateError::MalformedResponse(
            "expected a JSON object at top level".into(),
        ));
    };

    let entries = match root.remove("comments") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(AnnotateError::MalformedResponse(
                "`comments` is not a list".into(),
            ));
        }
    };

    let mut out = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.into_iter().enumerate() {
        let Value::Object(mut entry) = entry else {
            return Err(AnnotateError::MalformedResponse(format!(
                "comment #{idx} is not an object"
            )));
        };

        if let Some(err) = entry.remove("error") {
            let msg = match err {
                Value::String(s) => s,
                other => other.to_string(),
            };
            debug!(index = idx, error = %msg, "model reported an error entry");
            return Err(AnnotateError::Reported(msg));
        }

        let body = match entry.remove("body") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
        };

        let position = match entry.remove("position") {
            None => Map::new(),
            Some(Value::Object(m)) => m,
            Some(_) => return Err(AnnotateError::PositionNotObject),
        };

        out.push(ProposedComment { body, position });
    }

    debug!(count = out.len(), "interpreted proposed comments");
    Ok(out)
}

/// Drops a surrounding Markdown code fence (```` ```json ... ``` ````) if present.
fn strip_code_fence(s: &str) -> &str {
    let t = s.trim().trim_start_matches('\u{feff}');
    let Some(rest) = t.strip_prefix("```") else {
        return t;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
