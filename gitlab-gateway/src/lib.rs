//! GitLab gateway for the webhook bridge.
//!
//! A thin REST v4 client ([`gitlab::GitLabClient`]) plus the data model it
//! exchanges ([`types`]). Nothing here knows about LLMs or webhooks.

pub mod errors;
pub mod gitlab;
pub mod types;

pub use errors::{GitLabConfigError, GitLabError, GitLabProviderError, GitLabResult};
pub use gitlab::{GitLabClient, GitLabConfig};
pub use types::{
    DiffRefs, DiffSet, Discussion, DiscussionPosition, FileDiff, MergeRequestRef, Note,
    PositionType,
};
