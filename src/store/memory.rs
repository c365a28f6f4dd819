// In-memory store used by engine and scheduler tests

use crate::db::schema::{Alert, AlertHistory, Device, DeviceHistory, EntityRef, Site, SyncRun, Tenant};
use crate::domain::alert::{AlertUpdate, NewAlert};
use crate::domain::device::{DeviceUpdate, NewDevice};
use crate::domain::site::{NewSite, SiteUpdate};
use crate::domain::sync::{NewHistoryEntry, SyncRunFinish, SyncRunStatus, SyncType};
use crate::errors::Result;
use crate::store::SyncStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    tenants: HashMap<Uuid, Tenant>,
    devices: HashMap<(Uuid, String), Device>,
    sites: HashMap<(Uuid, String), Site>,
    alerts: HashMap<(Uuid, String), Alert>,
    device_history: Vec<DeviceHistory>,
    alert_history: Vec<AlertHistory>,
    sync_runs: Vec<SyncRun>,
}

#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tenant(&self, tenant: Tenant) {
        self.inner
            .lock()
            .unwrap()
            .tenants
            .insert(tenant.id, tenant);
    }

    pub fn devices(&self) -> Vec<Device> {
        self.inner.lock().unwrap().devices.values().cloned().collect()
    }

    pub fn sites(&self) -> Vec<Site> {
        self.inner.lock().unwrap().sites.values().cloned().collect()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.inner.lock().unwrap().alerts.values().cloned().collect()
    }

    pub fn device(&self, tenant_id: Uuid, uid: &str) -> Option<Device> {
        self.inner
            .lock()
            .unwrap()
            .devices
            .get(&(tenant_id, uid.to_string()))
            .cloned()
    }

    pub fn tenant(&self, id: Uuid) -> Option<Tenant> {
        self.inner.lock().unwrap().tenants.get(&id).cloned()
    }

    pub fn device_history_rows(&self) -> Vec<DeviceHistory> {
        self.inner.lock().unwrap().device_history.clone()
    }

    pub fn alert_history_rows(&self) -> Vec<AlertHistory> {
        self.inner.lock().unwrap().alert_history.clone()
    }

    pub fn sync_run_rows(&self) -> Vec<SyncRun> {
        self.inner.lock().unwrap().sync_runs.clone()
    }
}

#[async_trait]
impl SyncStore for MemStore {
    async fn get_tenant(&self, id: Uuid) -> Result<Option<Tenant>> {
        Ok(self.inner.lock().unwrap().tenants.get(&id).cloned())
    }

    async fn due_tenants(&self, now: DateTime<Utc>) -> Result<Vec<Tenant>> {
        let inner = self.inner.lock().unwrap();
        let mut due: Vec<Tenant> = inner
            .tenants
            .values()
            .filter(|t| {
                t.is_active
                    && t.sync_enabled
                    && t.status == "active"
                    && match t.last_sync {
                        None => true,
                        Some(last) => {
                            last < now - chrono::Duration::minutes(t.sync_interval_minutes as i64)
                        }
                    }
            })
            .cloned()
            .collect();

        // Oldest-synced first; never-synced tenants lead
        due.sort_by_key(|t| t.last_sync);
        Ok(due)
    }

    async fn touch_last_sync(&self, tenant_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        if let Some(tenant) = self.inner.lock().unwrap().tenants.get_mut(&tenant_id) {
            tenant.last_sync = Some(at);
        }
        Ok(())
    }

    async fn open_sync_run(
        &self,
        tenant_id: Uuid,
        sync_type: SyncType,
        started_at: DateTime<Utc>,
    ) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.inner.lock().unwrap().sync_runs.push(SyncRun {
            id,
            tenant_id,
            sync_type: sync_type.as_str().to_string(),
            status: SyncRunStatus::Running.as_str().to_string(),
            items_processed: 0,
            items_created: 0,
            items_updated: 0,
            items_deactivated: 0,
            error_message: None,
            started_at,
            completed_at: None,
            duration_ms: None,
        });
        Ok(id)
    }

    async fn finish_sync_run(&self, run_id: Uuid, finish: &SyncRunFinish) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(run) = inner.sync_runs.iter_mut().find(|r| r.id == run_id) {
            run.status = finish.status.as_str().to_string();
            run.items_processed = finish.counts.total;
            run.items_created = finish.counts.created;
            run.items_updated = finish.counts.updated;
            run.items_deactivated = finish.counts.deactivated;
            run.error_message = finish.error_message.clone();
            run.completed_at = Some(finish.completed_at);
            run.duration_ms = Some(finish.duration_ms);
        }
        Ok(())
    }

    async fn device_refs(&self, tenant_id: Uuid) -> Result<Vec<EntityRef>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .devices
            .values()
            .filter(|d| d.tenant_id == tenant_id)
            .map(|d| EntityRef {
                uid: d.uid.clone(),
                is_active: d.is_active,
            })
            .collect())
    }

    async fn get_device(&self, tenant_id: Uuid, uid: &str) -> Result<Option<Device>> {
        Ok(self.device(tenant_id, uid))
    }

    async fn insert_device(&self, device: &NewDevice) -> Result<()> {
        let now = Utc::now();
        let row = Device {
            id: Uuid::new_v4(),
            tenant_id: device.tenant_id,
            uid: device.uid.clone(),
            remote_id: device.remote_id.clone(),
            name: device.name.clone(),
            device_type: device.device_type.clone(),
            status: device.status.clone(),
            is_active: device.is_active,
            last_seen_at: device.last_seen_at,
            os: device.os.clone(),
            os_version: device.os_version.clone(),
            ip_address: device.ip_address.clone(),
            mac_address: device.mac_address.clone(),
            hostname: device.hostname.clone(),
            site_uid: device.site_uid.clone(),
            site_name: device.site_name.clone(),
            metadata: device.metadata.clone(),
            last_sync: now,
            created_at: now,
            updated_at: now,
        };
        self.inner
            .lock()
            .unwrap()
            .devices
            .insert((device.tenant_id, device.uid.clone()), row);
        Ok(())
    }

    async fn update_device(
        &self,
        tenant_id: Uuid,
        uid: &str,
        update: &DeviceUpdate,
    ) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(row) = inner.devices.get_mut(&(tenant_id, uid.to_string())) {
            row.name = update.name.clone();
            row.device_type = update.device_type.clone();
            row.status = update.status.clone();
            row.is_active = update.is_active;
            row.last_seen_at = update.last_seen_at;
            row.os = update.os.clone();
            row.os_version = update.os_version.clone();
            row.ip_address = update.ip_address.clone();
            row.mac_address = update.mac_address.clone();
            row.hostname = update.hostname.clone();
            row.site_uid = update.site_uid.clone();
            row.site_name = update.site_name.clone();
            row.metadata = update.metadata.clone();
            row.last_sync = update.last_sync;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn deactivate_device(&self, tenant_id: Uuid, uid: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(row) = inner.devices.get_mut(&(tenant_id, uid.to_string())) {
            row.is_active = false;
            row.status = crate::domain::device::INACTIVE_STATUS.to_string();
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn insert_device_history(&self, entry: &NewHistoryEntry) -> Result<()> {
        self.inner.lock().unwrap().device_history.push(DeviceHistory {
            id: Uuid::new_v4(),
            tenant_id: entry.tenant_id,
            device_uid: entry.entity_uid.clone(),
            action: entry.action.as_str().to_string(),
            old_status: entry.old_status.clone(),
            new_status: entry.new_status.clone(),
            old_data: entry.old_data.clone(),
            new_data: entry.new_data.clone(),
            changed_fields: entry.changed_fields.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn site_refs(&self, tenant_id: Uuid) -> Result<Vec<EntityRef>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .sites
            .values()
            .filter(|s| s.tenant_id == tenant_id)
            .map(|s| EntityRef {
                uid: s.uid.clone(),
                is_active: s.is_active,
            })
            .collect())
    }

    async fn get_site(&self, tenant_id: Uuid, uid: &str) -> Result<Option<Site>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .sites
            .get(&(tenant_id, uid.to_string()))
            .cloned())
    }

    async fn insert_site(&self, site: &NewSite) -> Result<()> {
        let now = Utc::now();
        let row = Site {
            id: Uuid::new_v4(),
            tenant_id: site.tenant_id,
            uid: site.uid.clone(),
            remote_id: site.remote_id.clone(),
            name: site.name.clone(),
            description: site.description.clone(),
            status: site.status.clone(),
            is_active: site.is_active,
            address: site.address.clone(),
            contact_name: site.contact_name.clone(),
            contact_email: site.contact_email.clone(),
            contact_phone: site.contact_phone.clone(),
            device_count: site.device_count,
            online_devices: site.online_devices,
            offline_devices: site.offline_devices,
            metadata: site.metadata.clone(),
            last_sync: now,
            created_at: now,
            updated_at: now,
        };
        self.inner
            .lock()
            .unwrap()
            .sites
            .insert((site.tenant_id, site.uid.clone()), row);
        Ok(())
    }

    async fn update_site(&self, tenant_id: Uuid, uid: &str, update: &SiteUpdate) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(row) = inner.sites.get_mut(&(tenant_id, uid.to_string())) {
            row.name = update.name.clone();
            row.description = update.description.clone();
            row.status = update.status.clone();
            row.is_active = update.is_active;
            row.address = update.address.clone();
            row.contact_name = update.contact_name.clone();
            row.contact_email = update.contact_email.clone();
            row.contact_phone = update.contact_phone.clone();
            row.device_count = update.device_count;
            row.online_devices = update.online_devices;
            row.offline_devices = update.offline_devices;
            row.metadata = update.metadata.clone();
            row.last_sync = update.last_sync;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn deactivate_site(&self, tenant_id: Uuid, uid: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(row) = inner.sites.get_mut(&(tenant_id, uid.to_string())) {
            row.is_active = false;
            row.status = crate::domain::site::INACTIVE_STATUS.to_string();
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn alert_refs(&self, tenant_id: Uuid) -> Result<Vec<EntityRef>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .alerts
            .values()
            .filter(|a| a.tenant_id == tenant_id)
            .map(|a| EntityRef {
                uid: a.uid.clone(),
                is_active: a.is_active,
            })
            .collect())
    }

    async fn get_alert(&self, tenant_id: Uuid, uid: &str) -> Result<Option<Alert>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .alerts
            .get(&(tenant_id, uid.to_string()))
            .cloned())
    }

    async fn insert_alert(&self, alert: &NewAlert) -> Result<()> {
        let now = Utc::now();
        let row = Alert {
            id: Uuid::new_v4(),
            tenant_id: alert.tenant_id,
            uid: alert.uid.clone(),
            remote_id: alert.remote_id.clone(),
            title: alert.title.clone(),
            message: alert.message.clone(),
            severity: alert.severity.clone(),
            category: alert.category.clone(),
            source: alert.source.clone(),
            status: alert.status.clone(),
            is_active: alert.is_active,
            acknowledged: alert.acknowledged,
            resolved: alert.resolved,
            device_uid: alert.device_uid.clone(),
            device_name: alert.device_name.clone(),
            site_uid: alert.site_uid.clone(),
            site_name: alert.site_name.clone(),
            acknowledged_at: alert.acknowledged_at,
            resolved_at: alert.resolved_at,
            metadata: alert.metadata.clone(),
            last_sync: now,
            created_at: now,
            updated_at: now,
        };
        self.inner
            .lock()
            .unwrap()
            .alerts
            .insert((alert.tenant_id, alert.uid.clone()), row);
        Ok(())
    }

    async fn update_alert(&self, tenant_id: Uuid, uid: &str, update: &AlertUpdate) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(row) = inner.alerts.get_mut(&(tenant_id, uid.to_string())) {
            row.title = update.title.clone();
            row.message = update.message.clone();
            row.severity = update.severity.clone();
            row.category = update.category.clone();
            row.source = update.source.clone();
            row.status = update.status.clone();
            row.is_active = update.is_active;
            row.acknowledged = update.acknowledged;
            row.resolved = update.resolved;
            row.device_uid = update.device_uid.clone();
            row.device_name = update.device_name.clone();
            row.site_uid = update.site_uid.clone();
            row.site_name = update.site_name.clone();
            row.acknowledged_at = update.acknowledged_at;
            row.resolved_at = update.resolved_at;
            row.metadata = update.metadata.clone();
            row.last_sync = update.last_sync;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn deactivate_alert(&self, tenant_id: Uuid, uid: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(row) = inner.alerts.get_mut(&(tenant_id, uid.to_string())) {
            row.is_active = false;
            row.status = crate::domain::alert::INACTIVE_STATUS.to_string();
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn insert_alert_history(&self, entry: &NewHistoryEntry) -> Result<()> {
        self.inner.lock().unwrap().alert_history.push(AlertHistory {
            id: Uuid::new_v4(),
            tenant_id: entry.tenant_id,
            alert_uid: entry.entity_uid.clone(),
            action: entry.action.as_str().to_string(),
            old_status: entry.old_status.clone(),
            new_status: entry.new_status.clone(),
            old_data: entry.old_data.clone(),
            new_data: entry.new_data.clone(),
            changed_fields: entry.changed_fields.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }
}
