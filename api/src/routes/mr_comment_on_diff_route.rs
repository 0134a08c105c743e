use std::sync::Arc;

use axum::{Extension, body::Bytes, extract::State, response::Response};
use diff_annotator::annotate_diff;
use tracing::{info, instrument, warn};

use crate::{
    core::{app_state::AppState, credentials::Caller},
    error_handler::AppResult,
    routes::{flow_response::report_response, webhook_payload::parse_webhook},
};

/// `POST /api/v1/mr_comment_on_diff`
///
/// Runs the inline review and posts the model's comments on the diff.
/// Returns `{"message": "Comments posted successfully"}` when every comment
/// landed, otherwise `{"error": ..., "results": [...]}` listing the comments
/// already handled.
#[instrument(name = "mr_comment_on_diff_route", skip_all, fields(caller = %caller))]
pub async fn mr_comment_on_diff(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    body: Bytes,
) -> AppResult<Response> {
    let mr = parse_webhook(&body)?;

    let report = annotate_diff(
        &state.gitlab,
        &state.llm,
        &state.prompts,
        state.retry,
        &mr,
    )
    .await;

    if report.is_success() {
        info!(%mr, posted = report.posted(), "inline review done");
    } else {
        warn!(%mr, posted = report.posted(), error = ?report.error_message(), "inline review incomplete");
    }

    Ok(report_response(report))
}
