// Remote RMM API adapter: per-tenant HTTP clients behind a trait seam

pub mod http;
pub mod payload;
pub mod token;

#[cfg(test)]
pub mod testing;

use crate::db::schema::Tenant;
use crate::errors::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub use http::{HttpClientFactory, HttpRmmClient, RemoteCredentials};
pub use payload::Payload;

/// Read-only client for one tenant's remote RMM account.
///
/// Every listing returns the full current snapshot for the tenant; any call
/// may fail on network or auth errors.
#[async_trait]
pub trait RmmClient: Send + Sync {
    /// Connection probe, returns the raw account document
    async fn account(&self) -> Result<serde_json::Value>;

    async fn list_devices(&self) -> Result<Vec<Payload>>;

    async fn list_sites(&self) -> Result<Vec<Payload>>;

    async fn list_alerts(&self) -> Result<Vec<Payload>>;
}

/// Builds a client from a tenant's stored credentials. Each tenant gets its
/// own immutable client; adapter state is never shared across tenants.
pub trait RmmClientFactory: Send + Sync {
    fn client_for(&self, tenant: &Tenant) -> Result<Arc<dyn RmmClient>>;
}
