use std::sync::Arc;

use axum::{
    Extension, Json,
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
};
use diff_annotator::describe;
use tracing::{error, instrument};

use crate::{
    core::{app_state::AppState, credentials::Caller},
    error_handler::AppResult,
    routes::{flow_response::FlowError, webhook_payload::parse_webhook},
};

/// `POST /api/v1/mr_description`
///
/// Writes a generated description onto the merge request and returns it.
#[instrument(name = "mr_description_route", skip_all, fields(caller = %caller))]
pub async fn mr_description(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    body: Bytes,
) -> AppResult<Response> {
    let mr = parse_webhook(&body)?;

    match describe(&state.gitlab, &state.llm, &state.prompts, &mr).await {
        Ok(description) => Ok(Json(description).into_response()),
        Err(e) => {
            error!(%mr, error = %e, "Error describing merge request");
            Ok(FlowError::new(e.to_string()).into_response())
        }
    }
}
