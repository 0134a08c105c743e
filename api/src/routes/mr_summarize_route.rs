use std::sync::Arc;

use axum::{
    Extension, Json,
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
};
use diff_annotator::summarize;
use tracing::{error, instrument};

use crate::{
    core::{app_state::AppState, credentials::Caller},
    error_handler::AppResult,
    routes::{flow_response::FlowError, webhook_payload::parse_webhook},
};

/// `POST /api/v1/mr_summarize`
///
/// Summarizes the merge request, posts the summary as a note and returns it
/// as a JSON string.
#[instrument(name = "mr_summarize_route", skip_all, fields(caller = %caller))]
pub async fn mr_summarize(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    body: Bytes,
) -> AppResult<Response> {
    let mr = parse_webhook(&body)?;

    match summarize(&state.gitlab, &state.llm, &state.prompts, &mr).await {
        Ok(summary) => Ok(Json(summary).into_response()),
        Err(e) => {
            error!(%mr, error = %e, "Error summarizing merge request");
            Ok(FlowError::new(e.to_string()).into_response())
        }
    }
}
