//! Chat-completions client shared by the webhook bridge.
//!
//! - [`config`]: provider/model configuration and env loading.
//! - [`services::chat_service`]: the HTTP client (text and JSON-object modes).
//! - [`error_handler`]: unified [`AiLlmError`] and env helpers.

pub mod config;
pub mod error_handler;
pub mod services;

pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::AiLlmError;
pub use services::chat_service::{ChatService, ResponseFormat};
