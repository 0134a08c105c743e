use ai_llm_service::ChatService;
use diff_annotator::{RetryPolicy, SystemPrompts};
use gitlab_gateway::GitLabClient;
use tracing::info;

use crate::{
    core::{app_config::AppConfig, credentials::CredentialStore},
    error_handler::AppError,
};

/// Shared state for all HTTP handlers. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub gitlab: GitLabClient,
    pub llm: ChatService,
    pub prompts: SystemPrompts,
    pub retry: RetryPolicy,
    pub credentials: CredentialStore,
}

impl AppState {
    /// Builds every collaborator from `cfg` and loads prompts from disk.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, AppError> {
        let gitlab = GitLabClient::new(&cfg.gitlab).map_err(|e| AppError::Client {
            client: "GitLab",
            message: e.to_string(),
        })?;
        let llm = ChatService::new(cfg.llm.clone()).map_err(|e| AppError::Client {
            client: "LLM",
            message: e.to_string(),
        })?;
        let credentials = CredentialStore::from_mode(&cfg.auth).map_err(|e| AppError::Client {
            client: "key store",
            message: e.to_string(),
        })?;
        let prompts = SystemPrompts::load(&cfg.prompts)?;

        info!(
            model = %llm.model(),
            auth = ?cfg.auth,
            max_attempts = cfg.retry.max_attempts,
            "application state ready"
        );

        Ok(Self {
            gitlab,
            llm,
            prompts,
            retry: cfg.retry,
            credentials,
        })
    }
}
