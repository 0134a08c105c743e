use std::str::FromStr;

use crate::error_handler::{ConfigError, Provider};

/// Represents the provider (backend) used for chat completions.
///
/// Both speak the OpenAI-style `/v1/chat/completions` protocol; they differ
/// in default endpoint and in how errors are attributed in logs.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::llm_provider::LlmProvider;
///
/// let p: LlmProvider = "mistral".parse().unwrap();
/// assert_eq!(p, LlmProvider::Mistral);
/// assert_eq!(p.default_endpoint(), "https://api.mistral.ai");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// Mistral La Plateforme API.
    Mistral,
    /// OpenAI or any OpenAI-compatible gateway.
    OpenAI,
}

impl LlmProvider {
    /// Base URL used when `LLM_ENDPOINT` is not set.
    pub fn default_endpoint(self) -> &'static str {
        match self {
            LlmProvider::Mistral => "https://api.mistral.ai",
            LlmProvider::OpenAI => "https://api.openai.com",
        }
    }

    pub(crate) fn tag(self) -> Provider {
        match self {
            LlmProvider::Mistral => Provider::Mistral,
            LlmProvider::OpenAI => Provider::OpenAI,
        }
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mistral" => Ok(LlmProvider::Mistral),
            "openai" | "chatgpt" => Ok(LlmProvider::OpenAI),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}
