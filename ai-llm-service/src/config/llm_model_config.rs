use crate::config::llm_provider::LlmProvider;

/// Configuration for an LLM model invocation.
///
/// # Fields
///
/// - `provider`: Which backend to use (Mistral, OpenAI).
/// - `model`: The model identifier (e.g., `"mistral-large-latest"`).
/// - `endpoint`: API base URL without the `/v1/...` suffix.
/// - `api_key`: Bearer key for the provider.
/// - `max_tokens`: Maximum number of tokens to generate (if supported).
/// - `temperature`: Controls randomness (0.0 = deterministic).
/// - `top_p`: Nucleus sampling cutoff (alternative to temperature).
/// - `timeout_secs`: Optional request timeout in seconds.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::Mistral,
///     model: "mistral-large-latest".to_string(),
///     endpoint: "https://api.mistral.ai".to_string(),
///     api_key: Some("sk-...".to_string()),
///     max_tokens: None,
///     temperature: Some(0.2),
///     top_p: None,
///     timeout_secs: Some(120),
/// };
/// assert_eq!(cfg.provider, LlmProvider::Mistral);
/// ```
#[derive(Debug, Clone)]
pub struct LlmModelConfig {
    /// The LLM provider/backend.
    pub provider: LlmProvider,

    /// Model identifier string.
    pub model: String,

    /// API base URL.
    pub endpoint: String,

    /// API key for authentication.
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}
