//! Resolution of the `X-Gitlab-Token` header to a caller.
//!
//! Two deployment modes:
//! - shared secret: one token configured in the environment
//! - API keys: tokens issued per user by a managed Supabase backend and
//!   looked up through its REST interface (`/rest/v1/users`)

use std::{fmt, time::Duration};

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::app_config::AuthMode;

/// Who is calling a webhook endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// Authenticated by the shared secret.
    Service,
    /// Authenticated by a registered API key.
    User { id: i64, username: String },
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Caller::Service => f.write_str("service"),
            Caller::User { id, username } => write!(f, "user {id} ({username})"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("invalid key store credentials")]
    InvalidKey,

    #[error("key store request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub enum CredentialStore {
    SharedSecret(String),
    ApiKeys(SupabaseKeyStore),
}

impl CredentialStore {
    pub fn from_mode(mode: &AuthMode) -> Result<Self, CredentialError> {
        Ok(match mode {
            AuthMode::SharedSecret(s) => CredentialStore::SharedSecret(s.clone()),
            AuthMode::ApiKeys { url, key } => {
                CredentialStore::ApiKeys(SupabaseKeyStore::new(url, key)?)
            }
        })
    }

    /// Returns the caller for `token`, or `None` if it grants no access.
    ///
    /// A key store outage is logged and denies access.
    pub async fn resolve(&self, token: &str) -> Option<Caller> {
        if token.is_empty() {
            return None;
        }
        match self {
            CredentialStore::SharedSecret(secret) => {
                constant_time_eq(secret.as_bytes(), token.as_bytes()).then_some(Caller::Service)
            }
            CredentialStore::ApiKeys(store) => match store.lookup(token).await {
                Ok(caller) => caller,
                Err(e) => {
                    warn!(error = %e, "API key lookup failed");
                    None
                }
            },
        }
    }
}

/// Best-effort constant-time comparison for secrets.
///
/// Runs over all of `a` regardless of where the first mismatch is; the bounds
/// check on `b` still branches on its length.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let mut diff = a.len() ^ b.len();
    for (i, x) in a.iter().enumerate() {
        diff |= usize::from(x ^ b.get(i).copied().unwrap_or(0));
    }
    diff == 0
}

/// Read-only client for the managed users table.
#[derive(Debug, Clone)]
pub struct SupabaseKeyStore {
    http: reqwest::Client,
    users_url: String,
}

#[derive(Debug, Deserialize)]
struct UserRow {
    id: i64,
    username: String,
}

impl SupabaseKeyStore {
    pub fn new(base_url: &str, service_key: &str) -> Result<Self, CredentialError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(service_key).map_err(|_| CredentialError::InvalidKey)?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {service_key}"))
                .map_err(|_| CredentialError::InvalidKey)?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            users_url: format!("{}/rest/v1/users", base_url.trim().trim_end_matches('/')),
        })
    }

    /// Looks up the user owning `api_key`.
    pub async fn lookup(&self, api_key: &str) -> Result<Option<Caller>, CredentialError> {
        let rows: Vec<UserRow> = self
            .http
            .get(&self.users_url)
            .query(&[
                ("api_key", format!("eq.{api_key}")),
                ("select", "id,username".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(matches = rows.len(), "API key lookup");
        Ok(rows.into_iter().next().map(|r| Caller::User {
            id: r.id,
            username: r.username,
        }))
    }
}
