// PostgreSQL implementation of the store port, delegating to the query
// modules in `db`

use crate::db;
use crate::db::schema::{Alert, Device, EntityRef, Site, Tenant};
use crate::domain::alert::{AlertUpdate, NewAlert};
use crate::domain::device::{DeviceUpdate, NewDevice};
use crate::domain::site::{NewSite, SiteUpdate};
use crate::domain::sync::{NewHistoryEntry, SyncRunFinish, SyncType};
use crate::errors::Result;
use crate::store::SyncStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SyncStore for PgStore {
    async fn get_tenant(&self, id: Uuid) -> Result<Option<Tenant>> {
        db::tenants::get(&self.pool, id).await
    }

    async fn due_tenants(&self, now: DateTime<Utc>) -> Result<Vec<Tenant>> {
        db::tenants::due_for_sync(&self.pool, now).await
    }

    async fn touch_last_sync(&self, tenant_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        db::tenants::touch_last_sync(&self.pool, tenant_id, at).await
    }

    async fn open_sync_run(
        &self,
        tenant_id: Uuid,
        sync_type: SyncType,
        started_at: DateTime<Utc>,
    ) -> Result<Uuid> {
        db::sync_runs::open(&self.pool, tenant_id, sync_type, started_at).await
    }

    async fn finish_sync_run(&self, run_id: Uuid, finish: &SyncRunFinish) -> Result<()> {
        db::sync_runs::finish(&self.pool, run_id, finish).await
    }

    async fn device_refs(&self, tenant_id: Uuid) -> Result<Vec<EntityRef>> {
        db::devices::refs(&self.pool, tenant_id).await
    }

    async fn get_device(&self, tenant_id: Uuid, uid: &str) -> Result<Option<Device>> {
        db::devices::get(&self.pool, tenant_id, uid).await
    }

    async fn insert_device(&self, device: &NewDevice) -> Result<()> {
        db::devices::insert(&self.pool, device).await
    }

    async fn update_device(
        &self,
        tenant_id: Uuid,
        uid: &str,
        update: &DeviceUpdate,
    ) -> Result<()> {
        db::devices::update(&self.pool, tenant_id, uid, update).await
    }

    async fn deactivate_device(&self, tenant_id: Uuid, uid: &str) -> Result<()> {
        db::devices::deactivate(&self.pool, tenant_id, uid).await
    }

    async fn insert_device_history(&self, entry: &NewHistoryEntry) -> Result<()> {
        db::history::insert_device(&self.pool, entry).await
    }

    async fn site_refs(&self, tenant_id: Uuid) -> Result<Vec<EntityRef>> {
        db::sites::refs(&self.pool, tenant_id).await
    }

    async fn get_site(&self, tenant_id: Uuid, uid: &str) -> Result<Option<Site>> {
        db::sites::get(&self.pool, tenant_id, uid).await
    }

    async fn insert_site(&self, site: &NewSite) -> Result<()> {
        db::sites::insert(&self.pool, site).await
    }

    async fn update_site(&self, tenant_id: Uuid, uid: &str, update: &SiteUpdate) -> Result<()> {
        db::sites::update(&self.pool, tenant_id, uid, update).await
    }

    async fn deactivate_site(&self, tenant_id: Uuid, uid: &str) -> Result<()> {
        db::sites::deactivate(&self.pool, tenant_id, uid).await
    }

    async fn alert_refs(&self, tenant_id: Uuid) -> Result<Vec<EntityRef>> {
        db::alerts::refs(&self.pool, tenant_id).await
    }

    async fn get_alert(&self, tenant_id: Uuid, uid: &str) -> Result<Option<Alert>> {
        db::alerts::get(&self.pool, tenant_id, uid).await
    }

    async fn insert_alert(&self, alert: &NewAlert) -> Result<()> {
        db::alerts::insert(&self.pool, alert).await
    }

    async fn update_alert(&self, tenant_id: Uuid, uid: &str, update: &AlertUpdate) -> Result<()> {
        db::alerts::update(&self.pool, tenant_id, uid, update).await
    }

    async fn deactivate_alert(&self, tenant_id: Uuid, uid: &str) -> Result<()> {
        db::alerts::deactivate(&self.pool, tenant_id, uid).await
    }

    async fn insert_alert_history(&self, entry: &NewHistoryEntry) -> Result<()> {
        db::history::insert_alert(&self.pool, entry).await
    }
}
