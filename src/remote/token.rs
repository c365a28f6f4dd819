//! OAuth 2.0 client-credentials token cache for the remote RMM API.

use crate::errors::{AppError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Lifetime in seconds; the platform issues long-lived (100h) tokens
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    100 * 60 * 60
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// True once the token is inside the refresh grace window
    fn is_expired(&self, grace: Duration) -> bool {
        Utc::now() + grace >= self.expires_at
    }
}

/// Caches one tenant's access token, refreshing it through the
/// client-credentials flow when it nears expiry.
pub struct TokenCache {
    token_url: String,
    api_key: String,
    api_secret: String,
    http: reqwest::Client,
    cached: RwLock<Option<CachedToken>>,
    grace: Duration,
}

impl TokenCache {
    pub fn new(
        base_url: &str,
        api_key: String,
        api_secret: String,
        http: reqwest::Client,
        grace_seconds: i64,
    ) -> Self {
        Self {
            token_url: format!("{}/auth/oauth/token", base_url.trim_end_matches('/')),
            api_key,
            api_secret,
            http,
            cached: RwLock::new(None),
            grace: Duration::seconds(grace_seconds),
        }
    }

    /// Get a valid access token, refreshing if necessary
    pub async fn get_token(&self) -> Result<String> {
        {
            let cache = self.cached.read().await;
            if let Some(ref token) = *cache {
                if !token.is_expired(self.grace) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        debug!("Requesting new access token from {}", self.token_url);
        let token = self.acquire_token().await?;

        let access_token = token.access_token.clone();
        {
            let mut cache = self.cached.write().await;
            *cache = Some(token);
        }

        Ok(access_token)
    }

    /// Drop the cached token so the next call re-authenticates
    pub async fn invalidate(&self) {
        let mut cache = self.cached.write().await;
        *cache = None;
    }

    async fn acquire_token(&self) -> Result<CachedToken> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.api_key.as_str()),
            ("client_secret", self.api_secret.as_str()),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::RemoteAuth(format!("token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RemoteAuth(format!(
                "token request failed with status {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::RemoteAuth(format!("invalid token response: {}", e)))?;

        let expires_at = Utc::now() + Duration::seconds(token.expires_in);
        debug!("Acquired access token, expires at {}", expires_at);

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at,
        })
    }
}
