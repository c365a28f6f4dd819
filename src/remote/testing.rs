// Scripted remote client used by engine and scheduler tests

use crate::db::schema::Tenant;
use crate::errors::{AppError, Result};
use crate::remote::{Payload, RmmClient, RmmClientFactory};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Returns canned snapshots and counts every fetch; can be switched into a
/// failing mode to script remote outages.
#[derive(Default)]
struct Endpoint {
    records: Vec<Payload>,
    failure: Option<String>,
}

#[derive(Default)]
pub struct MockRmmClient {
    devices: Mutex<Endpoint>,
    sites: Mutex<Endpoint>,
    alerts: Mutex<Endpoint>,
    fetches: AtomicUsize,
}

impl MockRmmClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_devices(&self, records: Vec<Payload>) {
        self.devices.lock().unwrap().records = records;
    }

    pub fn set_sites(&self, records: Vec<Payload>) {
        self.sites.lock().unwrap().records = records;
    }

    pub fn set_alerts(&self, records: Vec<Payload>) {
        self.alerts.lock().unwrap().records = records;
    }

    /// Make every subsequent fetch fail with the given message
    pub fn fail_with(&self, message: &str) {
        self.fail_devices_with(message);
        self.fail_sites_with(message);
        self.fail_alerts_with(message);
    }

    pub fn fail_devices_with(&self, message: &str) {
        self.devices.lock().unwrap().failure = Some(message.to_string());
    }

    pub fn fail_sites_with(&self, message: &str) {
        self.sites.lock().unwrap().failure = Some(message.to_string());
    }

    pub fn fail_alerts_with(&self, message: &str) {
        self.alerts.lock().unwrap().failure = Some(message.to_string());
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn fetch(&self, endpoint: &Mutex<Endpoint>) -> Result<Vec<Payload>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let endpoint = endpoint.lock().unwrap();
        if let Some(message) = &endpoint.failure {
            return Err(AppError::RemoteApi {
                status: 500,
                message: message.clone(),
            });
        }

        Ok(endpoint.records.clone())
    }
}

#[async_trait]
impl RmmClient for MockRmmClient {
    async fn account(&self) -> Result<serde_json::Value> {
        Ok(json!({ "uid": "account-1" }))
    }

    async fn list_devices(&self) -> Result<Vec<Payload>> {
        self.fetch(&self.devices)
    }

    async fn list_sites(&self) -> Result<Vec<Payload>> {
        self.fetch(&self.sites)
    }

    async fn list_alerts(&self) -> Result<Vec<Payload>> {
        self.fetch(&self.alerts)
    }
}

/// Hands out pre-registered mock clients per tenant
#[derive(Default)]
pub struct MockClientFactory {
    clients: Mutex<HashMap<Uuid, Arc<MockRmmClient>>>,
}

impl MockClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, tenant_id: Uuid, client: Arc<MockRmmClient>) {
        self.clients.lock().unwrap().insert(tenant_id, client);
    }
}

impl RmmClientFactory for MockClientFactory {
    fn client_for(&self, tenant: &Tenant) -> Result<Arc<dyn RmmClient>> {
        self.clients
            .lock()
            .unwrap()
            .get(&tenant.id)
            .cloned()
            .map(|c| c as Arc<dyn RmmClient>)
            .ok_or_else(|| AppError::TenantNotConfigured(tenant.slug.clone()))
    }
}
