//! Merge-request diff annotation.
//!
//! Turns a GitLab merge request into LLM-authored feedback and writes it back:
//!
//! - [`pipeline::annotate_diff`]: inline review comments anchored on diff lines
//! - [`pipeline::summarize`]: summary posted as a note
//! - [`pipeline::describe`]: generated merge request description
//!
//! The building blocks are usable on their own: [`position`] validates the
//! model's proposed anchors, [`line_code`] derives GitLab line codes,
//! [`interpreter`] parses the model's JSON answer and [`retry`] wraps the
//! structured completion call.
//!
//! GitLab and the model are reached through the traits in [`collaborators`];
//! plain generics, no `async-trait` and no `Box<dyn ...>`.

pub mod collaborators;
pub mod errors;
pub mod interpreter;
pub mod line_code;
pub mod pipeline;
pub mod position;
pub mod prompt;
pub mod retry;
pub mod webhook;

pub use collaborators::{CompletionClient, MergeRequestGateway};
pub use errors::{AnnotateError, AnnotateResult};
pub use pipeline::{AnnotationReport, CommentOutcome, annotate_diff, describe, summarize};
pub use prompt::{PromptError, PromptFiles, SystemPrompts};
pub use retry::RetryPolicy;
pub use webhook::merge_request_ref;
