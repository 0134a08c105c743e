//! Bodies returned by the webhook endpoints once the request is accepted.
//!
//! Flow failures are not HTTP errors: the endpoints answer 200 with
//! `{"error": "..."}` so GitLab does not disable the hook after retries.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use diff_annotator::{AnnotationReport, CommentOutcome};
use serde::Serialize;

pub const COMMENTS_POSTED: &str = "Comments posted successfully";

#[derive(Debug, Serialize)]
pub struct FlowError {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<CommentOutcome>,
}

#[derive(Debug, Serialize)]
pub struct FlowMessage {
    pub message: &'static str,
}

impl FlowError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            results: Vec::new(),
        }
    }
}

impl IntoResponse for FlowError {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Maps an annotate run to its response body.
pub fn report_response(report: AnnotationReport) -> Response {
    match report.error_message() {
        None => Json(FlowMessage {
            message: COMMENTS_POSTED,
        })
        .into_response(),
        Some(error) => FlowError {
            error,
            results: report.outcomes,
        }
        .into_response(),
    }
}
