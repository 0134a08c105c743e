//! GitLab client (REST v4) for merge requests.
//!
//! Endpoints used:
//!   * GET  /projects/:id/merge_requests/:iid
//!   * GET  /projects/:id/merge_requests/:iid/diffs          (paginated)
//!   * PUT  /projects/:id/merge_requests/:iid                (description)
//!   * POST /projects/:id/merge_requests/:iid/notes
//!   * PUT  /projects/:id/merge_requests/:iid/notes/:note_id
//!   * POST /projects/:id/merge_requests/:iid/discussions
//!   * HEAD /projects/:id/repository/files/:path?ref=:ref

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{GitLabConfigError, GitLabError, GitLabProviderError, GitLabResult};
use crate::types::*;

const DIFFS_PER_PAGE: u32 = 100;

/// Connection settings for [`GitLabClient`].
#[derive(Debug, Clone)]
pub struct GitLabConfig {
    /// Instance URL, e.g. "https://gitlab.com" or "https://gitlab.com/api/v4".
    pub base_url: String,
    /// Personal/project access token sent as `PRIVATE-TOKEN`.
    pub token: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl GitLabConfig {
    /// API root with `/api/v4` appended unless it is already there.
    pub fn api_base(&self) -> String {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.ends_with("/api/v4") {
            trimmed.to_string()
        } else {
            format!("{trimmed}/api/v4")
        }
    }
}

/// GitLab HTTP client wrapper. Cheap to clone; share one per process.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: Client,
    base_api: String,
}

impl GitLabClient {
    /// Builds the client with auth headers and timeouts baked in.
    pub fn new(cfg: &GitLabConfig) -> GitLabResult<Self> {
        if cfg.token.trim().is_empty() {
            return Err(GitLabConfigError::MissingToken.into());
        }
        let base = cfg.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(GitLabConfigError::InvalidBaseUrl(cfg.base_url.clone()).into());
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            "PRIVATE-TOKEN",
            HeaderValue::from_str(cfg.token.trim()).map_err(|_| GitLabConfigError::InvalidToken)?,
        );

        let http = Client::builder()
            .user_agent("mr-bridge/0.1")
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()?;

        let base_api = cfg.api_base();
        debug!("Creating GitLabClient with base_api={}", base_api);

        Ok(Self { http, base_api })
    }

    fn mr_url(&self, mr: &MergeRequestRef) -> String {
        format!(
            "{}/projects/{}/merge_requests/{}",
            self.base_api, mr.project_id, mr.iid
        )
    }

    /// Fetches the MR's current changes: metadata (iid, title, diff refs)
    /// plus every page of file diffs.
    pub async fn get_diffs(&self, mr: &MergeRequestRef) -> GitLabResult<DiffSet> {
        info!(project = mr.project_id, iid = mr.iid, "fetching merge request diffs");

        let meta: GitLabMr = self
            .http
            .get(self.mr_url(mr))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let url = format!("{}/diffs", self.mr_url(mr));
        let mut changes: Vec<FileDiff> = Vec::new();
        let mut page: u32 = 1;

        loop {
            debug!("GitLab get_diffs: {} page={}", url, page);
            let resp = self
                .http
                .get(&url)
                .query(&[("page", page), ("per_page", DIFFS_PER_PAGE)])
                .send()
                .await?
                .error_for_status()?;

            let next = next_page(resp.headers());
            let files: Vec<FileDiff> = resp.json().await?;
            changes.extend(files);

            match next {
                Some(n) if n > page => page = n,
                _ => break,
            }
        }

        if changes.iter().any(|f| f.too_large) {
            warn!(
                project = mr.project_id,
                iid = mr.iid,
                "GitLab omitted at least one diff as too large"
            );
        }

        debug!(
            project = mr.project_id,
            iid = meta.iid,
            files = changes.len(),
            "diffs fetched"
        );

        Ok(DiffSet {
            iid: meta.iid,
            title: meta.title,
            diff_refs: meta.diff_refs,
            changes,
        })
    }

    /// Posts a general MR note.
    pub async fn post_comment(&self, mr: &MergeRequestRef, body: &str) -> GitLabResult<Note> {
        let url = format!("{}/notes", self.mr_url(mr));
        debug!("GitLab post_comment: {} len={}", url, body.len());

        let note: Note = self
            .http
            .post(url)
            .json(&NoteBody { body })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        info!(project = mr.project_id, iid = mr.iid, note_id = note.id, "comment posted");
        Ok(note)
    }

    /// Replaces the body of an existing MR note.
    pub async fn edit_comment(
        &self,
        mr: &MergeRequestRef,
        note_id: u64,
        body: &str,
    ) -> GitLabResult<Note> {
        let url = format!("{}/notes/{}", self.mr_url(mr), note_id);
        debug!("GitLab edit_comment: {}", url);

        let note: Note = self
            .http
            .put(url)
            .json(&NoteBody { body })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        info!(project = mr.project_id, iid = mr.iid, note_id, "comment edited");
        Ok(note)
    }

    /// Overwrites the MR description.
    pub async fn update_description(&self, mr: &MergeRequestRef, body: &str) -> GitLabResult<()> {
        let url = self.mr_url(mr);
        debug!("GitLab update_description: {} len={}", url, body.len());

        self.http
            .put(url)
            .json(&DescriptionBody { description: body })
            .send()
            .await?
            .error_for_status()?;

        info!(project = mr.project_id, iid = mr.iid, "description updated");
        Ok(())
    }

    /// Starts an inline discussion anchored at `position`.
    ///
    /// `diff_id` is the MR iid carried by the fetched [`DiffSet`]; it is only
    /// used for log correlation.
    pub async fn post_comment_on_diff(
        &self,
        mr: &MergeRequestRef,
        diff_id: u64,
        body: &str,
        position: &DiscussionPosition,
    ) -> GitLabResult<Discussion> {
        let url = format!("{}/discussions", self.mr_url(mr));
        debug!(
            "Posting GitLab inline discussion: path={}, line={}, line_code={}",
            position.new_path, position.new_line, position.line_code
        );

        let resp = self
            .http
            .post(url)
            .json(&DiscussionCreate { body, position })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(%status, body = %text, "Failed to post GitLab discussion");
            return Err(GitLabProviderError::from_status(status).into());
        }

        let discussion: Discussion = resp.json().await?;
        info!(
            project = mr.project_id,
            iid = mr.iid,
            diff_id,
            discussion = %discussion.id,
            "comment posted on diff"
        );
        Ok(discussion)
    }

    /// Checks whether `path` exists at `git_ref` in the project repository.
    ///
    /// Returns `Ok(false)` on 404; other non-success statuses are errors.
    pub async fn file_exists(
        &self,
        project_id: u64,
        path: &str,
        git_ref: &str,
    ) -> GitLabResult<bool> {
        let url = format!(
            "{}/projects/{}/repository/files/{}",
            self.base_api,
            project_id,
            urlencoding::encode(path),
        );
        debug!("GitLab file_exists: {} ref={}", url, git_ref);

        let resp = self
            .http
            .head(url)
            .query(&[("ref", git_ref)])
            .send()
            .await?;

        match resp.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            s => Err(GitLabError::Provider(GitLabProviderError::from_status(s))),
        }
    }
}

/// Reads GitLab's `x-next-page` pagination header (empty on the last page).
fn next_page(headers: &HeaderMap) -> Option<u32> {
    headers
        .get("x-next-page")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u32>().ok())
}

/// GitLab MR response (subset).
#[derive(Debug, Deserialize)]
struct GitLabMr {
    iid: u64,
    title: String,
    #[serde(default)]
    diff_refs: Option<DiffRefs>,
}

#[derive(Debug, Serialize)]
struct NoteBody<'a> {
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct DescriptionBody<'a> {
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct DiscussionCreate<'a> {
    body: &'a str,
    position: &'a DiscussionPosition,
}
