//! Process configuration, read once at startup and handed to constructors.
//!
//! # Environment variables
//!
//! - `API_ADDRESS`             = listen address (default `0.0.0.0:8080`)
//! - `MODEL`, `API_KEY`, `TEMPERATURE`, `LLM_*` = see `ai_llm_service::config::default_config`
//! - `GITLAB_URL`              = GitLab instance (mandatory; `/api/v4` is appended if absent)
//! - `GITLAB_TOKEN`            = GitLab access token (mandatory)
//! - `GITLAB_TIMEOUT_SECS`     = GitLab request timeout (default `30`)
//! - `SECRET_TOKEN`            = shared webhook secret (mandatory unless API-key mode)
//! - `SUPABASE_URL` + `SUPABASE_KEY` = both set switches to API-key mode
//! - `SYSTEM_PROMPT_FILE`      = review prompt (default `system_prompt.json`)
//! - `SUMMARIZE_PROMPT_FILE`   = summary prompt (default `system_prompt_summarize.json`)
//! - `DESCRIPTION_PROMPT_FILE` = description prompt (optional)
//! - `LLM_MAX_ATTEMPTS`        = structured completion attempts (default `3`)
//! - `LLM_RETRY_DELAY_SECS`    = pause between attempts (default `2`)

use std::path::PathBuf;
use std::time::Duration;

use ai_llm_service::{
    AiLlmError, LlmModelConfig,
    config::default_config::config_from_lookup,
    error_handler::{env_lookup, must_var, opt_u32_var, opt_u64_var, validate_http_endpoint, var_or},
};
use diff_annotator::{PromptFiles, RetryPolicy};
use gitlab_gateway::GitLabConfig;
use thiserror::Error;

const DEFAULT_API_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_GITLAB_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment validation errors share the LLM crate's helpers and messages.
    #[error(transparent)]
    Env(#[from] AiLlmError),

    #[error("only one of SUPABASE_URL / SUPABASE_KEY is set; set both or neither")]
    PartialApiKeyStore,
}

/// How webhook callers are authenticated.
#[derive(Clone)]
pub enum AuthMode {
    /// `X-Gitlab-Token` must equal this secret.
    SharedSecret(String),
    /// `X-Gitlab-Token` is an API key looked up in the managed user store.
    ApiKeys { url: String, key: String },
}

impl std::fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMode::SharedSecret(_) => f.write_str("SharedSecret(***)"),
            AuthMode::ApiKeys { url, .. } => write!(f, "ApiKeys {{ url: {url}, key: *** }}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_address: String,
    pub llm: LlmModelConfig,
    pub gitlab: GitLabConfig,
    pub auth: AuthMode,
    pub prompts: PromptFiles,
    pub retry: RetryPolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup<F>(get: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let llm = config_from_lookup(get)?;

        let gitlab_url = must_var(get, "GITLAB_URL")?;
        validate_http_endpoint("GITLAB_URL", gitlab_url.trim())?;
        let gitlab = GitLabConfig {
            base_url: gitlab_url,
            token: must_var(get, "GITLAB_TOKEN")?,
            timeout_secs: opt_u64_var(get, "GITLAB_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_GITLAB_TIMEOUT_SECS),
        };

        let supabase_url = get("SUPABASE_URL").filter(|v| !v.trim().is_empty());
        let supabase_key = get("SUPABASE_KEY").filter(|v| !v.trim().is_empty());
        let auth = match (supabase_url, supabase_key) {
            (Some(url), Some(key)) => {
                validate_http_endpoint("SUPABASE_URL", url.trim())?;
                AuthMode::ApiKeys { url, key }
            }
            (None, None) => AuthMode::SharedSecret(must_var(get, "SECRET_TOKEN")?),
            _ => return Err(ConfigError::PartialApiKeyStore),
        };

        let prompts = PromptFiles {
            review: PathBuf::from(var_or(get, "SYSTEM_PROMPT_FILE", "system_prompt.json")),
            summarize: PathBuf::from(var_or(
                get,
                "SUMMARIZE_PROMPT_FILE",
                "system_prompt_summarize.json",
            )),
            description: get("DESCRIPTION_PROMPT_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        };

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: opt_u32_var(get, "LLM_MAX_ATTEMPTS")?.unwrap_or(defaults.max_attempts),
            delay: opt_u64_var(get, "LLM_RETRY_DELAY_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.delay),
        };

        Ok(Self {
            api_address: var_or(get, "API_ADDRESS", DEFAULT_API_ADDRESS),
            llm,
            gitlab,
            auth,
            prompts,
            retry,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    const BASE: [(&str, &str); 5] = [
        ("MODEL", "mistral-large-latest"),
        ("API_KEY", "llm-key"),
        ("GITLAB_URL", "https://gitlab.example.com"),
        ("GITLAB_TOKEN", "glpat-x"),
        ("SECRET_TOKEN", "hook-secret"),
    ];

    #[test]
    fn shared_secret_mode_with_defaults() {
        let cfg = AppConfig::from_lookup(&vars(&BASE)).unwrap();
        assert_eq!(cfg.api_address, "0.0.0.0:8080");
        assert_eq!(cfg.gitlab.api_base(), "https://gitlab.example.com/api/v4");
        assert_eq!(cfg.gitlab.timeout_secs, 30);
        assert!(matches!(cfg.auth, AuthMode::SharedSecret(ref s) if s == "hook-secret"));
        assert_eq!(cfg.retry, RetryPolicy::default());
        assert_eq!(cfg.prompts.review, PathBuf::from("system_prompt.json"));
        assert!(cfg.prompts.description.is_none());
        assert_eq!(cfg.llm.temperature, Some(0.2));
    }

    #[test]
    fn api_key_mode_when_store_configured() {
        let mut pairs = BASE[..4].to_vec();
        pairs.push(("SUPABASE_URL", "https://abc.supabase.co"));
        pairs.push(("SUPABASE_KEY", "service-role"));
        let cfg = AppConfig::from_lookup(&vars(&pairs)).unwrap();
        assert!(matches!(cfg.auth, AuthMode::ApiKeys { ref url, .. } if url == "https://abc.supabase.co"));
        assert!(!format!("{:?}", cfg.auth).contains("service-role"));
    }

    #[test]
    fn half_configured_store_is_rejected() {
        let mut pairs = BASE.to_vec();
        pairs.push(("SUPABASE_URL", "https://abc.supabase.co"));
        assert!(matches!(
            AppConfig::from_lookup(&vars(&pairs)),
            Err(ConfigError::PartialApiKeyStore)
        ));
    }

    #[test]
    fn missing_secret_is_reported() {
        let err = AppConfig::from_lookup(&vars(&BASE[..4])).unwrap_err();
        assert!(err.to_string().contains("SECRET_TOKEN"), "{err}");
    }

    #[test]
    fn retry_overrides() {
        let mut pairs = BASE.to_vec();
        pairs.push(("LLM_MAX_ATTEMPTS", "5"));
        pairs.push(("LLM_RETRY_DELAY_SECS", "0"));
        let cfg = AppConfig::from_lookup(&vars(&pairs)).unwrap();
        assert_eq!(cfg.retry.max_attempts, 5);
        assert_eq!(cfg.retry.delay, Duration::ZERO);
    }
}
