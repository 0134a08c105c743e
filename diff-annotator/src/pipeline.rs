//! The three webhook flows: inline review, summary note and description.
//!
//! Inline review ("annotate"):
//! 1) fetch the diff (a failure is reported, never turned into an empty diff)
//! 2) structured completion, retried per [`RetryPolicy`]
//! 3) interpret the answer into proposed comments
//! 4) per comment: validate position, check `new_path` exists at `head_sha`,
//!    post the discussion with its line code
//!
//! Posting is not transactional. Comments that landed before a later failure
//! stay on the merge request; the [`AnnotationReport`] says which ones.

use gitlab_gateway::{DiffSet, MergeRequestRef};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::collaborators::{CompletionClient, MergeRequestGateway};
use crate::errors::{AnnotateError, AnnotateResult};
use crate::interpreter::{ProposedComment, interpret};
use crate::position::CommentPosition;
use crate::prompt::SystemPrompts;
use crate::retry::{RetryPolicy, call_with_retry};

/// Result of posting one proposed comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommentOutcome {
    Posted {
        new_path: String,
        new_line: u64,
    },
    Failed {
        new_path: String,
        new_line: u64,
        error: String,
    },
}

/// Outcome of an annotate run.
///
/// `outcomes` holds one entry per comment that reached the posting step.
/// `aborted` is set when the run stopped early (fetch, LLM, interpretation or
/// validation failure); comments after that point were not attempted.
#[derive(Debug, Default)]
pub struct AnnotationReport {
    pub outcomes: Vec<CommentOutcome>,
    pub aborted: Option<AnnotateError>,
}

impl AnnotationReport {
    fn abort(mut self, err: AnnotateError) -> Self {
        self.aborted = Some(err);
        self
    }

    /// Nothing aborted and every comment landed.
    pub fn is_success(&self) -> bool {
        self.aborted.is_none()
            && self
                .outcomes
                .iter()
                .all(|o| matches!(o, CommentOutcome::Posted { .. }))
    }

    pub fn posted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, CommentOutcome::Posted { .. }))
            .count()
    }

    /// Message describing why the run is not a full success.
    pub fn error_message(&self) -> Option<String> {
        if let Some(e) = &self.aborted {
            return Some(e.to_string());
        }
        let failed: Vec<&str> = self
            .outcomes
            .iter()
            .filter_map(|o| match o {
                CommentOutcome::Failed { error, .. } => Some(error.as_str()),
                CommentOutcome::Posted { .. } => None,
            })
            .collect();
        let first = failed.first()?;
        Some(format!(
            "{} of {} comments failed to post: {}",
            failed.len(),
            self.outcomes.len(),
            first
        ))
    }
}

/// Fetches the diff and renders the user message for the model.
async fn fetch_diff<G: MergeRequestGateway>(
    gitlab: &G,
    mr: &MergeRequestRef,
) -> AnnotateResult<(DiffSet, String)> {
    let diff = gitlab
        .get_diffs(mr)
        .await
        .map_err(AnnotateError::UpstreamFetch)?;
    if diff.is_empty() {
        info!(%mr, "merge request has no changes");
    }
    let payload = serde_json::to_string(&diff)?;
    debug!(%mr, files = diff.changes.len(), payload_len = payload.len(), "diff ready");
    Ok((diff, payload))
}

/// Runs the inline review flow for `mr`.
#[instrument(skip_all, fields(project = mr.project_id, iid = mr.iid))]
pub async fn annotate_diff<G, L>(
    gitlab: &G,
    llm: &L,
    prompts: &SystemPrompts,
    retry: RetryPolicy,
    mr: &MergeRequestRef,
) -> AnnotationReport
where
    G: MergeRequestGateway,
    L: CompletionClient,
{
    let report = AnnotationReport::default();

    let (diff, payload) = match fetch_diff(gitlab, mr).await {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "diff fetch failed");
            return report.abort(e);
        }
    };

    let raw = match call_with_retry(retry, "structured completion", || {
        llm.complete_structured(&prompts.review, &payload)
    })
    .await
    {
        Ok(raw) => raw,
        Err(exhausted) => {
            return report.abort(AnnotateError::LlmExhausted {
                attempts: exhausted.attempts,
                last: exhausted.last.to_string(),
            });
        }
    };
    debug!(raw_len = raw.len(), "raw comment data received");

    let proposed = match interpret(&raw) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "model answer rejected");
            return report.abort(e);
        }
    };
    info!(count = proposed.len(), "proposed comments");

    post_comments(gitlab, mr, &diff, proposed, report).await
}

async fn post_comments<G: MergeRequestGateway>(
    gitlab: &G,
    mr: &MergeRequestRef,
    diff: &DiffSet,
    proposed: Vec<ProposedComment>,
    mut report: AnnotationReport,
) -> AnnotationReport {
    for (idx, comment) in proposed.into_iter().enumerate() {
        let position = match prepare(gitlab, mr, &comment).await {
            Ok(p) => p,
            Err(e) => {
                warn!(index = idx, error = %e, "aborting comment batch");
                return report.abort(e);
            }
        };

        let discussion = position.to_discussion();
        match gitlab
            .post_comment_on_diff(mr, diff.iid, &comment.body, &discussion)
            .await
        {
            Ok(()) => {
                debug!(index = idx, path = %position.new_path, line = position.new_line, "comment posted");
                report.outcomes.push(CommentOutcome::Posted {
                    new_path: position.new_path,
                    new_line: position.new_line,
                });
            }
            Err(e) => {
                let e = AnnotateError::Publish(e);
                error!(index = idx, path = %position.new_path, line = position.new_line, error = %e, "comment not posted");
                report.outcomes.push(CommentOutcome::Failed {
                    new_path: position.new_path,
                    new_line: position.new_line,
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        posted = report.posted(),
        total = report.outcomes.len(),
        "comment batch finished"
    );
    report
}

/// Validates a proposed comment's position and checks its files.
///
/// The `old_path` lookup at `base_sha` is advisory: added files have no old
/// side, so a miss is only logged.
async fn prepare<G: MergeRequestGateway>(
    gitlab: &G,
    mr: &MergeRequestRef,
    comment: &ProposedComment,
) -> AnnotateResult<CommentPosition> {
    let position = CommentPosition::from_candidate(&comment.position)?;

    if let Some(old_path) = &position.old_path {
        match gitlab
            .file_exists(mr.project_id, old_path, &position.base_sha)
            .await
        {
            Ok(true) => {}
            Ok(false) => warn!(path = %old_path, "file does not exist in the base branch"),
            Err(e) => warn!(path = %old_path, error = %e, "base branch lookup failed"),
        }
    }

    match gitlab
        .file_exists(mr.project_id, &position.new_path, &position.head_sha)
        .await
    {
        Ok(true) => Ok(position),
        Ok(false) => Err(AnnotateError::FileNotFound {
            new_path: position.new_path,
        }),
        Err(source) => Err(AnnotateError::FileLookup {
            path: position.new_path,
            source,
        }),
    }
}

/// Summarizes `mr` and posts the summary as a note. Returns the summary.
#[instrument(skip_all, fields(project = mr.project_id, iid = mr.iid))]
pub async fn summarize<G, L>(
    gitlab: &G,
    llm: &L,
    prompts: &SystemPrompts,
    mr: &MergeRequestRef,
) -> AnnotateResult<String>
where
    G: MergeRequestGateway,
    L: CompletionClient,
{
    let (_, payload) = fetch_diff(gitlab, mr).await?;
    let summary = llm.complete_text(&prompts.summarize, &payload).await?;
    gitlab
        .post_comment(mr, &summary)
        .await
        .map_err(AnnotateError::Publish)?;
    info!(len = summary.len(), "summary posted");
    Ok(summary)
}

/// Generates a description for `mr` and writes it to the merge request.
#[instrument(skip_all, fields(project = mr.project_id, iid = mr.iid))]
pub async fn describe<G, L>(
    gitlab: &G,
    llm: &L,
    prompts: &SystemPrompts,
    mr: &MergeRequestRef,
) -> AnnotateResult<String>
where
    G: MergeRequestGateway,
    L: CompletionClient,
{
    let (_, payload) = fetch_diff(gitlab, mr).await?;
    let description = llm.complete_text(&prompts.description, &payload).await?;
    gitlab
        .update_description(mr, &description)
        .await
        .map_err(AnnotateError::Publish)?;
    info!(len = description.len(), "description updated");
    Ok(description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::AiLlmError;
    use ai_llm_service::error_handler::{Provider, ProviderError, ProviderErrorKind};
    use gitlab_gateway::{
        DiffRefs, DiscussionPosition, FileDiff, GitLabError, GitLabProviderError, GitLabResult,
    };
    use std::collections::{HashSet, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    const MR: MergeRequestRef = MergeRequestRef {
        project_id: 42,
        iid: 7,
    };

    #[derive(Debug, Clone, PartialEq)]
    struct PostedDiscussion {
        diff_id: u64,
        body: String,
        position: DiscussionPosition,
    }

    #[derive(Default)]
    struct FakeGitLab {
        fail_fetch: bool,
        empty: bool,
        /// `(path, ref)` pairs that exist.
        files: HashSet<(String, String)>,
        /// Bodies whose post is rejected.
        reject_bodies: HashSet<String>,
        /// `(path, ref)` pairs whose existence check fails with a 503.
        broken_lookups: HashSet<(String, String)>,
        discussions: Mutex<Vec<PostedDiscussion>>,
        notes: Mutex<Vec<String>>,
        descriptions: Mutex<Vec<String>>,
    }

    impl FakeGitLab {
        fn with_foo() -> Self {
            let mut files = HashSet::new();
            files.insert(("foo.py".to_string(), "aaa".to_string()));
            files.insert(("foo.py".to_string(), "ccc".to_string()));
            Self {
                files,
                ..Self::default()
            }
        }

        fn posted(&self) -> Vec<PostedDiscussion> {
            self.discussions.lock().unwrap().clone()
        }
    }

    impl MergeRequestGateway for FakeGitLab {
        async fn get_diffs(&self, mr: &MergeRequestRef) -> GitLabResult<DiffSet> {
            if self.fail_fetch {
                return Err(GitLabError::Provider(GitLabProviderError::Server(502)));
            }
            let changes = if self.empty {
                Vec::new()
            } else {
                vec![FileDiff {
                    old_path: "foo.py".into(),
                    new_path: "foo.py".into(),
                    new_file: false,
                    renamed_file: false,
                    deleted_file: false,
                    too_large: false,
                    diff: "@@ -9,1 +9,2 @@\n a = 1\n+b = 2\n".into(),
                }]
            };
            Ok(DiffSet {
                iid: mr.iid,
                title: "Add b".into(),
                diff_refs: Some(DiffRefs {
                    base_sha: "aaa".into(),
                    start_sha: "bbb".into(),
                    head_sha: "ccc".into(),
                }),
                changes,
            })
        }

        async fn post_comment(&self, _mr: &MergeRequestRef, body: &str) -> GitLabResult<()> {
            self.notes.lock().unwrap().push(body.to_string());
            Ok(())
        }

        async fn update_description(&self, _mr: &MergeRequestRef, body: &str) -> GitLabResult<()> {
            self.descriptions.lock().unwrap().push(body.to_string());
            Ok(())
        }

        async fn post_comment_on_diff(
            &self,
            _mr: &MergeRequestRef,
            diff_id: u64,
            body: &str,
            position: &DiscussionPosition,
        ) -> GitLabResult<()> {
            if self.reject_bodies.contains(body) {
                return Err(GitLabError::Provider(GitLabProviderError::HttpStatus(400)));
            }
            self.discussions.lock().unwrap().push(PostedDiscussion {
                diff_id,
                body: body.to_string(),
                position: position.clone(),
            });
            Ok(())
        }

        async fn file_exists(&self, _project_id: u64, path: &str, git_ref: &str) -> GitLabResult<bool> {
            let key = (path.to_string(), git_ref.to_string());
            if self.broken_lookups.contains(&key) {
                return Err(GitLabError::Provider(GitLabProviderError::Server(503)));
            }
            Ok(self.files.contains(&key))
        }
    }

    struct FakeLlm {
        answers: Mutex<VecDeque<Result<String, AiLlmError>>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl FakeLlm {
        fn new(answers: Vec<Result<String, AiLlmError>>) -> Self {
            Self {
                answers: Mutex::new(answers.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn answering(raw: &str) -> Self {
            Self::new(vec![Ok(raw.to_string())])
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn next(&self, system: &str, user: &str) -> Result<String, AiLlmError> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(provider_down()))
        }
    }

    impl CompletionClient for FakeLlm {
        async fn complete_text(&self, system: &str, user: &str) -> Result<String, AiLlmError> {
            self.next(system, user)
        }

        async fn complete_structured(&self, system: &str, user: &str) -> Result<String, AiLlmError> {
            self.next(system, user)
        }
    }

    fn provider_down() -> AiLlmError {
        ProviderError::new(Provider::Mistral, ProviderErrorKind::EmptyChoices).into()
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(1),
        }
    }

    const ONE_COMMENT: &str = r#"{"comments":[{"body":"nit","position":{"position_type":"text","new_line":10,"old_path":"foo.py","new_path":"foo.py","base_sha":"aaa","start_sha":"bbb","head_sha":"ccc"}}]}"#;

    #[tokio::test]
    async fn posts_one_comment_with_line_code() {
        let gitlab = FakeGitLab::with_foo();
        let llm = FakeLlm::answering(ONE_COMMENT);
        let report = annotate_diff(&gitlab, &llm, &SystemPrompts::default(), fast_retry(), &MR).await;

        assert!(report.is_success(), "{:?}", report.error_message());
        let posted = gitlab.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].diff_id, 7);
        assert_eq!(posted[0].body, "nit");
        assert_eq!(
            posted[0].position.line_code,
            "dda9d95b25576a544fdab167e9074feaf08fdd71"
        );
        assert_eq!(posted[0].position.new_line, 10);
        assert_eq!(
            report.outcomes,
            vec![CommentOutcome::Posted {
                new_path: "foo.py".into(),
                new_line: 10
            }]
        );
    }

    #[tokio::test]
    async fn user_message_is_the_serialized_diff() {
        let gitlab = FakeGitLab::with_foo();
        let llm = FakeLlm::answering(r#"{"comments":[]}"#);
        let prompts = SystemPrompts::default();
        let report = annotate_diff(&gitlab, &llm, &prompts, fast_retry(), &MR).await;
        assert!(report.is_success());

        let calls = llm.calls.lock().unwrap();
        assert_eq!(calls[0].0, prompts.review);
        let sent: DiffSet = serde_json::from_str(&calls[0].1).unwrap();
        assert_eq!(sent.iid, 7);
        assert_eq!(sent.changes[0].new_path, "foo.py");
    }

    #[tokio::test]
    async fn missing_base_sha_is_a_validation_error() {
        let gitlab = FakeGitLab::with_foo();
        let raw = ONE_COMMENT.replace(r#","base_sha":"aaa""#, "");
        let llm = FakeLlm::answering(&raw);
        let report = annotate_diff(&gitlab, &llm, &SystemPrompts::default(), fast_retry(), &MR).await;

        assert!(gitlab.posted().is_empty());
        assert_eq!(
            report.error_message().as_deref(),
            Some("Missing required fields in position: base_sha")
        );
    }

    #[tokio::test]
    async fn reported_error_posts_nothing() {
        let gitlab = FakeGitLab::with_foo();
        let llm = FakeLlm::answering(r#"{"comments":[{"error":"x"}]}"#);
        let report = annotate_diff(&gitlab, &llm, &SystemPrompts::default(), fast_retry(), &MR).await;
        assert!(gitlab.posted().is_empty());
        assert_eq!(report.error_message().as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn malformed_answer_posts_nothing() {
        let gitlab = FakeGitLab::with_foo();
        let llm = FakeLlm::answering("definitely not json");
        let report = annotate_diff(&gitlab, &llm, &SystemPrompts::default(), fast_retry(), &MR).await;
        assert!(gitlab.posted().is_empty());
        assert!(matches!(report.aborted, Some(AnnotateError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn retries_structured_call_then_gives_up() {
        let gitlab = FakeGitLab::with_foo();
        let llm = FakeLlm::new(vec![]);
        let report = annotate_diff(&gitlab, &llm, &SystemPrompts::default(), fast_retry(), &MR).await;
        assert_eq!(llm.call_count(), 3);
        assert!(matches!(
            report.aborted,
            Some(AnnotateError::LlmExhausted { attempts: 3, .. })
        ));
        assert!(gitlab.posted().is_empty());
    }

    #[tokio::test]
    async fn transient_llm_failure_is_retried() {
        let gitlab = FakeGitLab::with_foo();
        let llm = FakeLlm::new(vec![Err(provider_down()), Ok(ONE_COMMENT.to_string())]);
        let report = annotate_diff(&gitlab, &llm, &SystemPrompts::default(), fast_retry(), &MR).await;
        assert_eq!(llm.call_count(), 2);
        assert!(report.is_success());
        assert_eq!(gitlab.posted().len(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_is_reported_not_swallowed() {
        let gitlab = FakeGitLab {
            fail_fetch: true,
            ..FakeGitLab::with_foo()
        };
        let llm = FakeLlm::answering(ONE_COMMENT);
        let report = annotate_diff(&gitlab, &llm, &SystemPrompts::default(), fast_retry(), &MR).await;
        assert_eq!(llm.call_count(), 0);
        let msg = report.error_message().unwrap();
        assert!(msg.starts_with("failed to fetch merge request diff:"), "{msg}");
    }

    #[tokio::test]
    async fn empty_diff_is_still_sent_to_the_model() {
        let gitlab = FakeGitLab {
            empty: true,
            ..FakeGitLab::with_foo()
        };
        let llm = FakeLlm::answering(r#"{"comments":[]}"#);
        let report = annotate_diff(&gitlab, &llm, &SystemPrompts::default(), fast_retry(), &MR).await;
        assert!(report.is_success());
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn missing_head_file_aborts_remaining_batch() {
        let gitlab = FakeGitLab::with_foo();
        let raw = r#"{"comments":[
            {"body":"first","position":{"position_type":"text","new_line":10,"old_path":"foo.py","new_path":"foo.py","base_sha":"aaa","start_sha":"bbb","head_sha":"ccc"}},
            {"body":"ghost","position":{"position_type":"text","new_line":3,"old_path":null,"new_path":"gone.py","base_sha":"aaa","start_sha":"bbb","head_sha":"ccc"}},
            {"body":"never","position":{"position_type":"text","new_line":11,"old_path":"foo.py","new_path":"foo.py","base_sha":"aaa","start_sha":"bbb","head_sha":"ccc"}}
        ]}"#;
        let llm = FakeLlm::answering(raw);
        let report = annotate_diff(&gitlab, &llm, &SystemPrompts::default(), fast_retry(), &MR).await;

        let posted = gitlab.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].body, "first");
        assert_eq!(report.posted(), 1);
        assert_eq!(
            report.error_message().as_deref(),
            Some("File gone.py does not exist in the head branch.")
        );
    }

    #[tokio::test]
    async fn head_lookup_error_aborts_instead_of_counting_as_missing() {
        let mut gitlab = FakeGitLab::with_foo();
        gitlab
            .broken_lookups
            .insert(("foo.py".to_string(), "ccc".to_string()));
        let llm = FakeLlm::answering(ONE_COMMENT);
        let report = annotate_diff(&gitlab, &llm, &SystemPrompts::default(), fast_retry(), &MR).await;

        assert!(gitlab.posted().is_empty());
        assert!(report.outcomes.is_empty());
        match &report.aborted {
            Some(AnnotateError::FileLookup { path, .. }) => assert_eq!(path, "foo.py"),
            other => panic!("expected FileLookup, got {other:?}"),
        }
        let msg = report.error_message().unwrap();
        assert!(msg.starts_with("failed to look up foo.py:"), "{msg}");
        assert!(msg.contains("503"), "{msg}");
    }

    #[tokio::test]
    async fn base_lookup_error_is_only_a_warning() {
        let mut gitlab = FakeGitLab::with_foo();
        gitlab
            .broken_lookups
            .insert(("foo.py".to_string(), "aaa".to_string()));
        let llm = FakeLlm::answering(ONE_COMMENT);
        let report = annotate_diff(&gitlab, &llm, &SystemPrompts::default(), fast_retry(), &MR).await;

        assert!(report.is_success(), "{:?}", report.error_message());
        assert_eq!(gitlab.posted().len(), 1);
    }

    #[tokio::test]
    async fn added_file_without_old_side_is_posted() {
        let mut gitlab = FakeGitLab::with_foo();
        gitlab
            .files
            .insert(("new.rs".to_string(), "ccc".to_string()));
        let raw = r#"{"comments":[{"body":"hi","position":{"position_type":"text","new_line":1,"old_path":"new.rs","new_path":"new.rs","base_sha":"aaa","start_sha":"bbb","head_sha":"ccc"}}]}"#;
        let llm = FakeLlm::answering(raw);
        let report = annotate_diff(&gitlab, &llm, &SystemPrompts::default(), fast_retry(), &MR).await;
        assert!(report.is_success());
        assert_eq!(gitlab.posted().len(), 1);
    }

    #[tokio::test]
    async fn failed_post_is_recorded_and_batch_continues() {
        let mut gitlab = FakeGitLab::with_foo();
        gitlab.reject_bodies.insert("bad".to_string());
        let raw = r#"{"comments":[
            {"body":"bad","position":{"position_type":"text","new_line":10,"old_path":"foo.py","new_path":"foo.py","base_sha":"aaa","start_sha":"bbb","head_sha":"ccc"}},
            {"body":"good","position":{"position_type":"text","new_line":11,"old_path":"foo.py","new_path":"foo.py","base_sha":"aaa","start_sha":"bbb","head_sha":"ccc"}}
        ]}"#;
        let llm = FakeLlm::answering(raw);
        let report = annotate_diff(&gitlab, &llm, &SystemPrompts::default(), fast_retry(), &MR).await;

        assert!(!report.is_success());
        assert!(report.aborted.is_none());
        assert_eq!(report.outcomes.len(), 2);
        assert!(matches!(&report.outcomes[0], CommentOutcome::Failed { new_line: 10, .. }));
        assert_eq!(
            report.outcomes[1],
            CommentOutcome::Posted {
                new_path: "foo.py".into(),
                new_line: 11
            }
        );
        let msg = report.error_message().unwrap();
        assert!(msg.starts_with("1 of 2 comments failed to post:"), "{msg}");
        assert_eq!(gitlab.posted()[0].position.line_code, "7ad0fcac46b64b91eb7b1ffaddb6f48b679b1d99");
    }

    #[tokio::test]
    async fn summarize_posts_note_and_returns_text() {
        let gitlab = FakeGitLab::with_foo();
        let llm = FakeLlm::answering("Adds `b`.");
        let prompts = SystemPrompts::default();
        let out = summarize(&gitlab, &llm, &prompts, &MR).await.unwrap();
        assert_eq!(out, "Adds `b`.");
        assert_eq!(*gitlab.notes.lock().unwrap(), vec!["Adds `b`.".to_string()]);
        assert_eq!(llm.calls.lock().unwrap()[0].0, prompts.summarize);
    }

    #[tokio::test]
    async fn summarize_is_not_retried() {
        let gitlab = FakeGitLab::with_foo();
        let llm = FakeLlm::new(vec![Err(provider_down()), Ok("late".into())]);
        let err = summarize(&gitlab, &llm, &SystemPrompts::default(), &MR)
            .await
            .unwrap_err();
        assert!(matches!(err, AnnotateError::Llm(_)));
        assert_eq!(llm.call_count(), 1);
        assert!(gitlab.notes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn describe_updates_description() {
        let gitlab = FakeGitLab::with_foo();
        let llm = FakeLlm::answering("## Overview");
        let prompts = SystemPrompts::default();
        let out = describe(&gitlab, &llm, &prompts, &MR).await.unwrap();
        assert_eq!(out, "## Overview");
        assert_eq!(
            *gitlab.descriptions.lock().unwrap(),
            vec!["## Overview".to_string()]
        );
        assert_eq!(llm.calls.lock().unwrap()[0].0, prompts.description);
    }

    #[tokio::test]
    async fn describe_propagates_fetch_failure() {
        let gitlab = FakeGitLab {
            fail_fetch: true,
            ..FakeGitLab::with_foo()
        };
        let llm = FakeLlm::answering("unused");
        let err = describe(&gitlab, &llm, &SystemPrompts::default(), &MR)
            .await
            .unwrap_err();
        assert!(matches!(err, AnnotateError::UpstreamFetch(_)));
        assert_eq!(llm.call_count(), 0);
    }
}
