//! Webhook authentication.
//!
//! GitLab sends the webhook's secret token in `X-Gitlab-Token`. The value is
//! resolved through the [`CredentialStore`](crate::core::credentials::CredentialStore);
//! the resolved [`Caller`] is attached to the request extensions, where the
//! routes pick it up for their spans.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::{
    core::{app_state::AppState, credentials::Caller},
    error_handler::AppError,
};

pub const GITLAB_TOKEN_HEADER: &str = "x-gitlab-token";

pub async fn require_gitlab_token(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(GITLAB_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();

    if token.is_empty() {
        warn!(path = %request.uri().path(), "webhook without X-Gitlab-Token");
        return Err(AppError::Unauthorized);
    }

    let Some(caller) = state.credentials.resolve(token).await else {
        warn!(path = %request.uri().path(), token_present = true, "webhook token rejected");
        return Err(AppError::Unauthorized);
    };

    match &caller {
        Caller::Service => debug!("authenticated with shared secret"),
        Caller::User { id, username } => debug!(user_id = id, %username, "authenticated with API key"),
    }
    request.extensions_mut().insert(caller);

    Ok(next.run(request).await)
}
