use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use diff_annotator::{AnnotateError, PromptError};
use serde::Serialize;
use thiserror::Error;

use crate::core::app_config::ConfigError;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("failed to build {client} client: {message}")]
    Client {
        client: &'static str,
        message: String,
    },

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("Invalid API key")]
    Unauthorized,

    #[error("{0}")]
    UnprocessableEntity(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,

            // startup-only
            AppError::Config(_)
            | AppError::Prompt(_)
            | AppError::Client { .. }
            | AppError::Bind(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Prompt(_) => "PROMPT_ERROR",
            AppError::Client { .. } => "CLIENT_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::UnprocessableEntity(_) => "UNPROCESSABLE_ENTITY",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.error_code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Only request-shape problems become HTTP errors; everything else a flow
/// reports is answered with 200 and an `{"error": ...}` body.
impl AppError {
    pub fn from_request_shape(err: &AnnotateError) -> Option<Self> {
        match err {
            AnnotateError::MissingField(_) => Some(AppError::UnprocessableEntity(err.to_string())),
            _ => None,
        }
    }
}
