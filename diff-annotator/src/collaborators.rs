//! Seams between the pipeline and the outside world.
//!
//! Plain traits returning `impl Future + Send` so the pipeline stays generic
//! over real clients and in-memory fakes without boxing.

use std::future::Future;

use ai_llm_service::{AiLlmError, ChatService};
use gitlab_gateway::{DiffSet, DiscussionPosition, GitLabClient, GitLabResult, MergeRequestRef};

/// GitLab operations the flows need.
pub trait MergeRequestGateway: Send + Sync {
    fn get_diffs(
        &self,
        mr: &MergeRequestRef,
    ) -> impl Future<Output = GitLabResult<DiffSet>> + Send;

    fn post_comment(
        &self,
        mr: &MergeRequestRef,
        body: &str,
    ) -> impl Future<Output = GitLabResult<()>> + Send;

    fn update_description(
        &self,
        mr: &MergeRequestRef,
        body: &str,
    ) -> impl Future<Output = GitLabResult<()>> + Send;

    fn post_comment_on_diff(
        &self,
        mr: &MergeRequestRef,
        diff_id: u64,
        body: &str,
        position: &DiscussionPosition,
    ) -> impl Future<Output = GitLabResult<()>> + Send;

    fn file_exists(
        &self,
        project_id: u64,
        path: &str,
        git_ref: &str,
    ) -> impl Future<Output = GitLabResult<bool>> + Send;
}

/// Chat model operations the flows need.
pub trait CompletionClient: Send + Sync {
    fn complete_text(
        &self,
        system: &str,
        user: &str,
    ) -> impl Future<Output = Result<String, AiLlmError>> + Send;

    /// Must ask the provider for a JSON object.
    fn complete_structured(
        &self,
        system: &str,
        user: &str,
    ) -> impl Future<Output = Result<String, AiLlmError>> + Send;
}

impl MergeRequestGateway for GitLabClient {
    async fn get_diffs(&self, mr: &MergeRequestRef) -> GitLabResult<DiffSet> {
        GitLabClient::get_diffs(self, mr).await
    }

    async fn post_comment(&self, mr: &MergeRequestRef, body: &str) -> GitLabResult<()> {
        GitLabClient::post_comment(self, mr, body).await.map(|_| ())
    }

    async fn update_description(&self, mr: &MergeRequestRef, body: &str) -> GitLabResult<()> {
        GitLabClient::update_description(self, mr, body).await
    }

    async fn post_comment_on_diff(
        &self,
        mr: &MergeRequestRef,
        diff_id: u64,
        body: &str,
        position: &DiscussionPosition,
    ) -> GitLabResult<()> {
        GitLabClient::post_comment_on_diff(self, mr, diff_id, body, position)
            .await
            .map(|_| ())
    }

    async fn file_exists(&self, project_id: u64, path: &str, git_ref: &str) -> GitLabResult<bool> {
        GitLabClient::file_exists(self, project_id, path, git_ref).await
    }
}

impl CompletionClient for ChatService {
    async fn complete_text(&self, system: &str, user: &str) -> Result<String, AiLlmError> {
        ChatService::complete_text(self, system, user).await
    }

    async fn complete_structured(&self, system: &str, user: &str) -> Result<String, AiLlmError> {
        ChatService::complete_structured(self, system, user).await
    }
}
