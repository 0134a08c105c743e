//! Addressing a merge request from a GitLab merge-request webhook payload.

use gitlab_gateway::MergeRequestRef;
use serde_json::Value;

use crate::errors::{AnnotateError, AnnotateResult};

/// Reads `project.id` and `object_attributes.iid` from a webhook body.
///
/// Both must be non-negative integers (numeric strings are tolerated).
pub fn merge_request_ref(payload: &Value) -> AnnotateResult<MergeRequestRef> {
    let project_id = id_at(payload, "project", "id").ok_or(AnnotateError::MissingField("project.id"))?;
    let iid = id_at(payload, "object_attributes", "iid")
        .ok_or(AnnotateError::MissingField("object_attributes.iid"))?;
    Ok(MergeRequestRef { project_id, iid })
}

fn id_at(payload: &Value, object: &str, key: &str) -> Option<u64> {
    match payload.get(object)?.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
