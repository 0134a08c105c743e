//! LLM config loaded from environment variables.
//!
//! # Environment variables
//!
//! - `LLM_PROVIDER`     = `mistral` (default) or `openai`
//! - `MODEL`            = model identifier (mandatory)
//! - `API_KEY`          = provider API key (mandatory)
//! - `TEMPERATURE`      = sampling temperature, `0.0..=2.0` (default `0.2`)
//! - `LLM_TOP_P`        = optional nucleus sampling cutoff, `0.0..=1.0`
//! - `LLM_ENDPOINT`     = API base URL (default depends on provider)
//! - `LLM_MAX_TOKENS`   = optional max tokens (u32)
//! - `LLM_TIMEOUT_SECS` = request timeout (default `120`)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, must_var, opt_f32_var, opt_u32_var, opt_u64_var,
        validate_http_endpoint, validate_range_f32, var_or,
    },
};

const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Builds the chat model config from an arbitrary variable lookup.
///
/// # Errors
/// - [`crate::error_handler::ConfigError::MissingVar`] for `MODEL` / `API_KEY`
/// - [`crate::error_handler::ConfigError::InvalidNumber`] for unparsable numbers
/// - [`crate::error_handler::ConfigError::OutOfRange`] for a temperature outside `0.0..=2.0`
/// - [`crate::error_handler::ConfigError::InvalidFormat`] for a non-http endpoint
pub fn config_from_lookup<F>(get: &F) -> Result<LlmModelConfig, AiLlmError>
where
    F: Fn(&str) -> Option<String>,
{
    let provider: LlmProvider = var_or(get, "LLM_PROVIDER", "mistral").parse()?;
    let model = must_var(get, "MODEL")?;
    let api_key = must_var(get, "API_KEY")?;

    let temperature = opt_f32_var(get, "TEMPERATURE")?.unwrap_or(DEFAULT_TEMPERATURE);
    validate_range_f32("temperature", temperature, 0.0, 2.0)?;

    let top_p = opt_f32_var(get, "LLM_TOP_P")?;
    if let Some(p) = top_p {
        validate_range_f32("top_p", p, 0.0, 1.0)?;
    }

    let endpoint = var_or(get, "LLM_ENDPOINT", provider.default_endpoint());
    validate_http_endpoint("LLM_ENDPOINT", &endpoint)?;

    let max_tokens = opt_u32_var(get, "LLM_MAX_TOKENS")?;
    let timeout_secs = opt_u64_var(get, "LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key: Some(api_key),
        max_tokens,
        temperature: Some(temperature),
        top_p,
        timeout_secs: Some(timeout_secs),
    })
}
