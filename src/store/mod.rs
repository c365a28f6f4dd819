// Persistent store port consumed by the reconciliation engine.
//
// The engine only needs tenant-scoped reads, upserts, deactivations, and
// ledger appends; any store with equivalent per-tenant filtering works.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use crate::db::schema::{Alert, Device, EntityRef, Site, Tenant};
use crate::domain::alert::{AlertUpdate, NewAlert};
use crate::domain::device::{DeviceUpdate, NewDevice};
use crate::domain::site::{NewSite, SiteUpdate};
use crate::domain::sync::{NewHistoryEntry, SyncRunFinish, SyncType};
use crate::errors::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use postgres::PgStore;

#[async_trait]
pub trait SyncStore: Send + Sync {
    // Tenants
    async fn get_tenant(&self, id: Uuid) -> Result<Option<Tenant>>;
    async fn due_tenants(&self, now: DateTime<Utc>) -> Result<Vec<Tenant>>;
    async fn touch_last_sync(&self, tenant_id: Uuid, at: DateTime<Utc>) -> Result<()>;

    // Sync run ledger
    async fn open_sync_run(
        &self,
        tenant_id: Uuid,
        sync_type: SyncType,
        started_at: DateTime<Utc>,
    ) -> Result<Uuid>;
    async fn finish_sync_run(&self, run_id: Uuid, finish: &SyncRunFinish) -> Result<()>;

    // Devices
    async fn device_refs(&self, tenant_id: Uuid) -> Result<Vec<EntityRef>>;
    async fn get_device(&self, tenant_id: Uuid, uid: &str) -> Result<Option<Device>>;
    async fn insert_device(&self, device: &NewDevice) -> Result<()>;
    async fn update_device(&self, tenant_id: Uuid, uid: &str, update: &DeviceUpdate)
        -> Result<()>;
    async fn deactivate_device(&self, tenant_id: Uuid, uid: &str) -> Result<()>;
    async fn insert_device_history(&self, entry: &NewHistoryEntry) -> Result<()>;

    // Sites
    async fn site_refs(&self, tenant_id: Uuid) -> Result<Vec<EntityRef>>;
    async fn get_site(&self, tenant_id: Uuid, uid: &str) -> Result<Option<Site>>;
    async fn insert_site(&self, site: &NewSite) -> Result<()>;
    async fn update_site(&self, tenant_id: Uuid, uid: &str, update: &SiteUpdate) -> Result<()>;
    async fn deactivate_site(&self, tenant_id: Uuid, uid: &str) -> Result<()>;

    // Alerts
    async fn alert_refs(&self, tenant_id: Uuid) -> Result<Vec<EntityRef>>;
    async fn get_alert(&self, tenant_id: Uuid, uid: &str) -> Result<Option<Alert>>;
    async fn insert_alert(&self, alert: &NewAlert) -> Result<()>;
    async fn update_alert(&self, tenant_id: Uuid, uid: &str, update: &AlertUpdate) -> Result<()>;
    async fn deactivate_alert(&self, tenant_id: Uuid, uid: &str) -> Result<()>;
    async fn insert_alert_history(&self, entry: &NewHistoryEntry) -> Result<()>;
}
