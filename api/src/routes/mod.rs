pub mod flow_response;
pub mod health_route;
pub mod mr_comment_on_diff_route;
pub mod mr_description_route;
pub mod mr_summarize_route;
pub mod webhook_payload;
