// HTTP implementation of the remote adapter.
//
// One client per tenant, configured once at construction; nothing here is
// mutated between calls, so clients are safe to share across tasks.

use crate::config::RemoteConfig;
use crate::db::schema::Tenant;
use crate::errors::{AppError, Result};
use crate::remote::token::TokenCache;
use crate::remote::{Payload, RmmClient, RmmClientFactory};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Connection settings for one tenant's remote account
#[derive(Debug, Clone)]
pub struct RemoteCredentials {
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
}

pub struct HttpRmmClient {
    base_url: String,
    http: reqwest::Client,
    token: TokenCache,
}

impl HttpRmmClient {
    pub fn new(credentials: RemoteCredentials, config: &RemoteConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(&config.user_agent)
            .build()?;

        let base_url = credentials.base_url.trim_end_matches('/').to_string();
        let token = TokenCache::new(
            &base_url,
            credentials.api_key,
            credentials.api_secret,
            http.clone(),
            config.token_grace_seconds,
        );

        Ok(Self {
            base_url,
            http,
            token,
        })
    }

    /// GET an authenticated API path; the `/api/v2` prefix is added when
    /// not already present
    pub async fn get(&self, path: &str) -> Result<Value> {
        let full_path = if path.starts_with("/api/v2/") {
            path.to_string()
        } else {
            format!("/api/v2{}", path)
        };
        let url = format!("{}{}", self.base_url, full_path);

        let token = self.token.get_token().await?;

        debug!("GET {}", url);
        let response = self.http.get(&url).bearer_auth(token).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            // The token was rejected; force re-authentication on the next call
            self.token.invalidate().await;
            return Err(AppError::RemoteApi {
                status: status.as_u16(),
                message: "access token rejected".to_string(),
            });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AppError::RemoteApi {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    async fn list(&self, path: &str, envelope_key: &str) -> Result<Vec<Payload>> {
        let body = self.get(path).await?;
        Ok(extract_records(body, envelope_key))
    }
}

#[async_trait]
impl RmmClient for HttpRmmClient {
    async fn account(&self) -> Result<Value> {
        self.get("/account").await
    }

    async fn list_devices(&self) -> Result<Vec<Payload>> {
        self.list("/device", "devices").await
    }

    async fn list_sites(&self) -> Result<Vec<Payload>> {
        self.list("/site", "sites").await
    }

    async fn list_alerts(&self) -> Result<Vec<Payload>> {
        self.list("/alert", "alerts").await
    }
}

/// Pull the record array out of a listing response. Listing bodies come as
/// `{"<key>": [...]}` envelopes; some platforms return a bare array.
fn extract_records(body: Value, key: &str) -> Vec<Payload> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect()
}

/// Builds an [`HttpRmmClient`] from the credentials stored on a tenant row
pub struct HttpClientFactory {
    config: RemoteConfig,
}

impl HttpClientFactory {
    pub fn new(config: RemoteConfig) -> Self {
        Self { config }
    }
}

impl RmmClientFactory for HttpClientFactory {
    fn client_for(&self, tenant: &Tenant) -> Result<Arc<dyn RmmClient>> {
        let (base_url, api_key, api_secret) = match (
            tenant.api_url.clone(),
            tenant.api_key.clone(),
            tenant.api_secret.clone(),
        ) {
            (Some(url), Some(key), Some(secret)) => (url, key, secret),
            _ => return Err(AppError::TenantNotConfigured(tenant.slug.clone())),
        };

        let client = HttpRmmClient::new(
            RemoteCredentials {
                base_url,
                api_key,
                api_secret,
            },
            &self.config,
        )?;

        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_records_from_envelope() {
        let body = json!({
            "pageDetails": { "count": 2 },
            "devices": [
                { "uid": "d1", "name": "A" },
                { "uid": "d2", "name": "B" }
            ]
        });

        let records = extract_records(body, "devices");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("uid").unwrap(), "d1");
    }

    #[test]
    fn test_extract_records_from_bare_array() {
        let body = json!([{ "uid": "s1" }]);
        let records = extract_records(body, "sites");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_extract_records_missing_key_is_empty() {
        let body = json!({ "sites": [{ "uid": "s1" }] });
        assert!(extract_records(body, "devices").is_empty());
    }

    #[test]
    fn test_extract_records_skips_non_objects() {
        let body = json!({ "alerts": [{ "uid": "a1" }, "junk", 42] });
        assert_eq!(extract_records(body, "alerts").len(), 1);
    }
}
