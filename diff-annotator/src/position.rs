//! Validation of LLM-proposed comment positions.
//!
//! A candidate arrives as an untyped JSON object. Presence of every mandatory
//! key is checked first so the caller gets the complete list of missing keys;
//! only then are the values type-checked and turned into a [`CommentPosition`].

use gitlab_gateway::{DiscussionPosition, PositionType};
use serde_json::{Map, Value};

use crate::errors::{AnnotateError, AnnotateResult};
use crate::line_code::compute_line_code;

/// Keys that must be present on every position, in reporting order.
///
/// `old_path` must be present but may be `null` (added files).
pub const REQUIRED_FIELDS: [&str; 7] = [
    "position_type",
    "new_line",
    "old_path",
    "new_path",
    "base_sha",
    "start_sha",
    "head_sha",
];

/// Validated anchor of an inline comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentPosition {
    pub position_type: PositionType,
    pub old_path: Option<String>,
    pub new_path: String,
    pub base_sha: String,
    pub start_sha: String,
    pub head_sha: String,
    pub old_line: Option<u64>,
    pub new_line: u64,
}

impl CommentPosition {
    /// Validates a candidate position object.
    ///
    /// # Errors
    /// - [`AnnotateError::Validation`] listing every absent mandatory key
    /// - [`AnnotateError::InvalidField`] for a present key of the wrong type
    pub fn from_candidate(candidate: &Map<String, Value>) -> AnnotateResult<Self> {
        let missing = missing_fields(candidate);
        if !missing.is_empty() {
            return Err(AnnotateError::Validation {
                missing_fields: missing,
            });
        }

        let position_type = match candidate.get("position_type").and_then(Value::as_str) {
            Some("text") => PositionType::Text,
            Some("image") => PositionType::Image,
            _ => {
                return Err(AnnotateError::InvalidField {
                    field: "position_type",
                    expected: "\"text\" or \"image\"",
                });
            }
        };

        let old_path = match candidate.get("old_path") {
            Some(Value::Null) | None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(AnnotateError::InvalidField {
                    field: "old_path",
                    expected: "string or null",
                });
            }
        };

        let new_line = match candidate.get("new_line").and_then(as_line) {
            Some(n) => n,
            None => {
                return Err(AnnotateError::InvalidField {
                    field: "new_line",
                    expected: "non-negative integer",
                });
            }
        };

        let old_line = match candidate.get("old_line") {
            Some(Value::Null) | None => None,
            Some(v) => Some(as_line(v).ok_or(AnnotateError::InvalidField {
                field: "old_line",
                expected: "non-negative integer or null",
            })?),
        };

        Ok(Self {
            position_type,
            old_path,
            new_path: string_field(candidate, "new_path")?,
            base_sha: string_field(candidate, "base_sha")?,
            start_sha: string_field(candidate, "start_sha")?,
            head_sha: string_field(candidate, "head_sha")?,
            old_line,
            new_line,
        })
    }

    /// Builds the GitLab discussion position, deriving the line code.
    pub fn to_discussion(&self) -> DiscussionPosition {
        DiscussionPosition {
            base_sha: self.base_sha.clone(),
            start_sha: self.start_sha.clone(),
            head_sha: self.head_sha.clone(),
            position_type: self.position_type,
            new_path: self.new_path.clone(),
            old_path: self.old_path.clone(),
            old_line: self.old_line,
            new_line: self.new_line,
            line_code: compute_line_code(&self.new_path, self.new_line),
        }
    }
}

/// Mandatory keys absent from `candidate`, in [`REQUIRED_FIELDS`] order.
pub fn missing_fields(candidate: &Map<String, Value>) -> Vec<String> {
    REQUIRED_FIELDS
        .iter()
        .filter(|k| !candidate.contains_key(**k))
        .map(|k| k.to_string())
        .collect()
}

fn string_field(candidate: &Map<String, Value>, field: &'static str) -> AnnotateResult<String> {
    candidate
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(AnnotateError::InvalidField {
            field,
            expected: "string",
        })
}

/// Accepts JSON integers and, since models sometimes quote numbers, numeric strings.
fn as_line(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full() -> Map<String, Value> {
        match json!({
            "position_type": "text",
            "new_line": 10,
            "old_path": "foo.py",
            "new_path": "foo.py",
            "base_sha": "aaa",
            "start_sha": "bbb",
            "head_sha": "ccc"
        }) {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn accepts_complete_position() {
        let p = CommentPosition::from_candidate(&full()).unwrap();
        assert_eq!(p.position_type, PositionType::Text);
        assert_eq!(p.new_line, 10);
        assert_eq!(p.old_line, None);
        assert_eq!(p.old_path.as_deref(), Some("foo.py"));
    }

    #[test]
    fn reports_exactly_the_missing_field() {
        for field in REQUIRED_FIELDS {
            let mut m = full();
            m.remove(field);
            match CommentPosition::from_candidate(&m) {
                Err(AnnotateError::Validation { missing_fields }) => {
                    assert_eq!(missing_fields, vec![field.to_string()]);
                }
                other => panic!("{field}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn reports_all_missing_fields_in_order() {
        let mut m = Map::new();
        m.insert("new_path".into(), json!("foo.py"));
        assert_eq!(
            missing_fields(&m),
            vec![
                "position_type",
                "new_line",
                "old_path",
                "base_sha",
                "start_sha",
                "head_sha"
            ]
        );
    }

    #[test]
    fn null_old_path_and_old_line_are_allowed() {
        let mut m = full();
        m.insert("old_path".into(), Value::Null);
        m.insert("old_line".into(), json!(9));
        let p = CommentPosition::from_candidate(&m).unwrap();
        assert_eq!(p.old_path, None);
        assert_eq!(p.old_line, Some(9));
    }

    #[test]
    fn quoted_line_numbers_are_tolerated() {
        let mut m = full();
        m.insert("new_line".into(), json!("12"));
        assert_eq!(CommentPosition::from_candidate(&m).unwrap().new_line, 12);
    }

    #[test]
    fn wrong_types_are_rejected() {
        let mut m = full();
        m.insert("new_line".into(), json!(-3));
        assert!(matches!(
            CommentPosition::from_candidate(&m),
            Err(AnnotateError::InvalidField { field: "new_line", .. })
        ));

        let mut m = full();
        m.insert("position_type".into(), json!("code"));
        assert!(matches!(
            CommentPosition::from_candidate(&m),
            Err(AnnotateError::InvalidField { field: "position_type", .. })
        ));

        let mut m = full();
        m.insert("head_sha".into(), json!(123));
        assert!(matches!(
            CommentPosition::from_candidate(&m),
            Err(AnnotateError::InvalidField { field: "head_sha", .. })
        ));
    }

    #[test]
    fn discussion_carries_line_code() {
        let d = CommentPosition::from_candidate(&full()).unwrap().to_discussion();
        assert_eq!(d.line_code, "dda9d95b25576a544fdab167e9074feaf08fdd71");
        assert_eq!(d.base_sha, "aaa");
        assert_eq!(d.start_sha, "bbb");
        assert_eq!(d.head_sha, "ccc");
    }
}
