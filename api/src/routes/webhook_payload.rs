use axum::body::Bytes;
use diff_annotator::merge_request_ref;
use gitlab_gateway::MergeRequestRef;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error_handler::{AppError, AppResult};

/// Parses a merge-request webhook body and addresses its merge request.
///
/// Any failure here is a request-shape error (422).
pub fn parse_webhook(body: &Bytes) -> AppResult<MergeRequestRef> {
    let payload: Value = serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "webhook body is not valid JSON");
        AppError::UnprocessableEntity(format!("Invalid JSON body: {e}"))
    })?;

    let kind = payload
        .get("object_kind")
        .and_then(Value::as_str)
        .unwrap_or("unknown");

    let mr = merge_request_ref(&payload).map_err(|e| {
        warn!(error = %e, object_kind = kind, "webhook body lacks merge request ids");
        AppError::from_request_shape(&e).unwrap_or_else(|| AppError::UnprocessableEntity(e.to_string()))
    })?;

    debug!(object_kind = kind, %mr, "webhook accepted");
    Ok(mr)
}
