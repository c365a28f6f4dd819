// Reconciliation engine.
//
// Brings the persisted snapshot of one entity type for one tenant into
// agreement with the remote snapshot without destroying history: entities
// that leave the remote snapshot are deactivated, never deleted, and every
// observed transition lands in the history ledger.

use crate::db::schema::Tenant;
use crate::domain::alert::{AlertUpdate, NewAlert, INACTIVE_STATUS as ALERT_INACTIVE};
use crate::domain::device::{DeviceUpdate, NewDevice, INACTIVE_STATUS as DEVICE_INACTIVE};
use crate::domain::site::{NewSite, SiteUpdate};
use crate::domain::sync::{
    FullSyncReport, HistoryAction, NewHistoryEntry, SyncCounts, SyncRunFinish, SyncRunStatus,
    SyncType,
};
use crate::errors::{AppError, Result};
use crate::remote::{payload, RmmClientFactory};
use crate::store::SyncStore;
use crate::sync::diff;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

pub struct SyncEngine {
    store: Arc<dyn SyncStore>,
    clients: Arc<dyn RmmClientFactory>,
    /// Tenants with a reconciliation currently running. Nothing in the data
    /// model prevents a double invocation, so the engine itself enforces
    /// one reconciliation per tenant at a time.
    in_flight: Mutex<HashSet<Uuid>>,
}

impl SyncEngine {
    pub fn new(store: Arc<dyn SyncStore>, clients: Arc<dyn RmmClientFactory>) -> Self {
        Self {
            store,
            clients,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Full sync for one tenant: sites first so device rows can carry site
    /// names, devices second, alerts last. Completed passes stay committed
    /// when a later pass fails.
    pub async fn sync_tenant(&self, tenant_id: Uuid) -> Result<FullSyncReport> {
        let tenant = self.load_active_tenant(tenant_id).await?;
        let _guard = self.begin(tenant.id)?;

        tracing::info!("Starting full sync for tenant {} ({})", tenant.name, tenant.id);

        let started = Utc::now();
        let run_id = self
            .store
            .open_sync_run(tenant.id, SyncType::Full, started)
            .await?;

        let result = self.full_pass(&tenant).await;

        match result {
            Ok(report) => {
                self.close_run(run_id, started, report.totals(), None).await?;
                self.store.touch_last_sync(tenant.id, Utc::now()).await?;

                let totals = report.totals();
                tracing::info!(
                    "Full sync for tenant {} finished: {} created, {} updated, {} deactivated",
                    tenant.name,
                    totals.created,
                    totals.updated,
                    totals.deactivated
                );
                Ok(report)
            }
            Err(e) => {
                tracing::error!("Full sync for tenant {} failed: {}", tenant.name, e);
                self.close_run_after_error(run_id, started, SyncCounts::default(), &e)
                    .await;
                Err(e)
            }
        }
    }

    /// Reconcile devices only
    pub async fn sync_devices(&self, tenant_id: Uuid) -> Result<SyncCounts> {
        let tenant = self.load_active_tenant(tenant_id).await?;
        let _guard = self.begin(tenant.id)?;
        self.device_pass(&tenant).await
    }

    /// Reconcile sites only
    pub async fn sync_sites(&self, tenant_id: Uuid) -> Result<SyncCounts> {
        let tenant = self.load_active_tenant(tenant_id).await?;
        let _guard = self.begin(tenant.id)?;
        self.site_pass(&tenant).await
    }

    /// Reconcile alerts only
    pub async fn sync_alerts(&self, tenant_id: Uuid) -> Result<SyncCounts> {
        let tenant = self.load_active_tenant(tenant_id).await?;
        let _guard = self.begin(tenant.id)?;
        self.alert_pass(&tenant).await
    }

    async fn full_pass(&self, tenant: &Tenant) -> Result<FullSyncReport> {
        let sites = self.site_pass(tenant).await?;
        let devices = self.device_pass(tenant).await?;
        let alerts = self.alert_pass(tenant).await?;

        Ok(FullSyncReport {
            sites,
            devices,
            alerts,
        })
    }

    // ------------------------------------------------------------------
    // Per-entity-type passes
    // ------------------------------------------------------------------

    async fn device_pass(&self, tenant: &Tenant) -> Result<SyncCounts> {
        if !tenant.sync_devices {
            tracing::debug!("Device sync disabled for tenant {}", tenant.slug);
            return Ok(SyncCounts::default());
        }

        let started = Utc::now();
        let run_id = self
            .store
            .open_sync_run(tenant.id, SyncType::Devices, started)
            .await?;

        let mut counts = SyncCounts::default();
        match self.reconcile_devices(tenant, &mut counts).await {
            Ok(()) => {
                self.close_run(run_id, started, counts, None).await?;
                Ok(counts)
            }
            Err(e) => {
                self.close_run_after_error(run_id, started, counts, &e).await;
                Err(e)
            }
        }
    }

    async fn reconcile_devices(&self, tenant: &Tenant, counts: &mut SyncCounts) -> Result<()> {
        let client = self.clients.client_for(tenant)?;
        let remote = client.list_devices().await?;
        counts.total = remote.len() as i32;

        let remote_uids: HashSet<&str> = remote.iter().filter_map(payload::uid).collect();
        let local = self.store.device_refs(tenant.id).await?;

        for record in &remote {
            let Some(uid) = payload::uid(record) else {
                tracing::warn!("Skipping device record without uid for tenant {}", tenant.slug);
                continue;
            };

            match self.store.get_device(tenant.id, uid).await? {
                None => {
                    let device = NewDevice::from_payload(tenant.id, record);
                    self.store.insert_device(&device).await?;
                    self.store
                        .insert_device_history(&NewHistoryEntry {
                            tenant_id: tenant.id,
                            entity_uid: uid.to_string(),
                            action: HistoryAction::Created,
                            old_status: None,
                            new_status: Some(device.status.clone()),
                            old_data: None,
                            new_data: Some(Value::Object(record.clone())),
                            changed_fields: Some(Value::Object(diff::changed_fields(
                                &Map::new(),
                                record,
                            ))),
                        })
                        .await?;
                    counts.created += 1;
                }
                Some(old) => {
                    let update = DeviceUpdate::merge(&old, record, Utc::now());
                    self.store.update_device(tenant.id, uid, &update).await?;

                    let changes = diff::changed_fields(
                        &DeviceUpdate::from_row(&old).diffable(),
                        &update.diffable(),
                    );
                    if !changes.is_empty() {
                        self.store
                            .insert_device_history(&NewHistoryEntry {
                                tenant_id: tenant.id,
                                entity_uid: uid.to_string(),
                                action: HistoryAction::Updated,
                                old_status: Some(old.status.clone()),
                                new_status: Some(update.status.clone()),
                                old_data: Some(serde_json::to_value(&old)?),
                                new_data: Some(Value::Object(record.clone())),
                                changed_fields: Some(Value::Object(changes)),
                            })
                            .await?;
                    }
                    counts.updated += 1;
                }
            }
        }

        // Rows that left the snapshot are deactivated, never deleted
        for entry in local.iter().filter(|r| r.is_active && !remote_uids.contains(r.uid.as_str())) {
            let Some(old) = self.store.get_device(tenant.id, &entry.uid).await? else {
                continue;
            };

            self.store.deactivate_device(tenant.id, &entry.uid).await?;
            self.store
                .insert_device_history(&NewHistoryEntry {
                    tenant_id: tenant.id,
                    entity_uid: entry.uid.clone(),
                    action: HistoryAction::Deactivated,
                    old_status: Some(old.status.clone()),
                    new_status: Some(DEVICE_INACTIVE.to_string()),
                    old_data: Some(serde_json::to_value(&old)?),
                    new_data: Some(json!({ "status": DEVICE_INACTIVE, "is_active": false })),
                    changed_fields: Some(deactivation_diff(&old.status, old.is_active, DEVICE_INACTIVE)),
                })
                .await?;
            counts.deactivated += 1;
        }

        Ok(())
    }

    async fn site_pass(&self, tenant: &Tenant) -> Result<SyncCounts> {
        if !tenant.sync_sites {
            tracing::debug!("Site sync disabled for tenant {}", tenant.slug);
            return Ok(SyncCounts::default());
        }

        let started = Utc::now();
        let run_id = self
            .store
            .open_sync_run(tenant.id, SyncType::Sites, started)
            .await?;

        let mut counts = SyncCounts::default();
        match self.reconcile_sites(tenant, &mut counts).await {
            Ok(()) => {
                self.close_run(run_id, started, counts, None).await?;
                Ok(counts)
            }
            Err(e) => {
                self.close_run_after_error(run_id, started, counts, &e).await;
                Err(e)
            }
        }
    }

    async fn reconcile_sites(&self, tenant: &Tenant, counts: &mut SyncCounts) -> Result<()> {
        let client = self.clients.client_for(tenant)?;
        let remote = client.list_sites().await?;
        counts.total = remote.len() as i32;

        let remote_uids: HashSet<&str> = remote.iter().filter_map(payload::uid).collect();
        let local = self.store.site_refs(tenant.id).await?;

        for record in &remote {
            let Some(uid) = payload::uid(record) else {
                tracing::warn!("Skipping site record without uid for tenant {}", tenant.slug);
                continue;
            };

            match self.store.get_site(tenant.id, uid).await? {
                None => {
                    let site = NewSite::from_payload(tenant.id, record);
                    self.store.insert_site(&site).await?;
                    counts.created += 1;
                }
                Some(old) => {
                    let update = SiteUpdate::merge(&old, record, Utc::now());
                    self.store.update_site(tenant.id, uid, &update).await?;
                    counts.updated += 1;
                }
            }
        }

        for entry in local.iter().filter(|r| r.is_active && !remote_uids.contains(r.uid.as_str())) {
            self.store.deactivate_site(tenant.id, &entry.uid).await?;
            counts.deactivated += 1;
        }

        Ok(())
    }

    async fn alert_pass(&self, tenant: &Tenant) -> Result<SyncCounts> {
        if !tenant.sync_alerts {
            tracing::debug!("Alert sync disabled for tenant {}", tenant.slug);
            return Ok(SyncCounts::default());
        }

        let started = Utc::now();
        let run_id = self
            .store
            .open_sync_run(tenant.id, SyncType::Alerts, started)
            .await?;

        let mut counts = SyncCounts::default();
        match self.reconcile_alerts(tenant, &mut counts).await {
            Ok(()) => {
                self.close_run(run_id, started, counts, None).await?;
                Ok(counts)
            }
            Err(e) => {
                self.close_run_after_error(run_id, started, counts, &e).await;
                Err(e)
            }
        }
    }

    async fn reconcile_alerts(&self, tenant: &Tenant, counts: &mut SyncCounts) -> Result<()> {
        let client = self.clients.client_for(tenant)?;
        let remote = client.list_alerts().await?;
        counts.total = remote.len() as i32;

        let remote_uids: HashSet<&str> = remote.iter().filter_map(payload::uid).collect();
        let local = self.store.alert_refs(tenant.id).await?;

        for record in &remote {
            let Some(uid) = payload::uid(record) else {
                tracing::warn!("Skipping alert record without uid for tenant {}", tenant.slug);
                continue;
            };

            match self.store.get_alert(tenant.id, uid).await? {
                None => {
                    let alert = NewAlert::from_payload(tenant.id, record);
                    self.store.insert_alert(&alert).await?;
                    self.store
                        .insert_alert_history(&NewHistoryEntry {
                            tenant_id: tenant.id,
                            entity_uid: uid.to_string(),
                            action: HistoryAction::Created,
                            old_status: None,
                            new_status: Some(alert.status.clone()),
                            old_data: None,
                            new_data: Some(Value::Object(record.clone())),
                            changed_fields: Some(Value::Object(diff::changed_fields(
                                &Map::new(),
                                record,
                            ))),
                        })
                        .await?;
                    counts.created += 1;
                }
                Some(old) => {
                    let update = AlertUpdate::merge(&old, record, Utc::now());
                    self.store.update_alert(tenant.id, uid, &update).await?;

                    let changes = diff::changed_fields(
                        &AlertUpdate::from_row(&old).diffable(),
                        &update.diffable(),
                    );
                    if !changes.is_empty() {
                        // Flag flips get their own action so acknowledgement
                        // and resolution stand out in the ledger
                        let action = update.history_action(&old);
                        self.store
                            .insert_alert_history(&NewHistoryEntry {
                                tenant_id: tenant.id,
                                entity_uid: uid.to_string(),
                                action,
                                old_status: Some(old.status.clone()),
                                new_status: Some(update.status.clone()),
                                old_data: Some(serde_json::to_value(&old)?),
                                new_data: Some(Value::Object(record.clone())),
                                changed_fields: Some(Value::Object(changes)),
                            })
                            .await?;
                    }
                    counts.updated += 1;
                }
            }
        }

        for entry in local.iter().filter(|r| r.is_active && !remote_uids.contains(r.uid.as_str())) {
            let Some(old) = self.store.get_alert(tenant.id, &entry.uid).await? else {
                continue;
            };

            self.store.deactivate_alert(tenant.id, &entry.uid).await?;
            self.store
                .insert_alert_history(&NewHistoryEntry {
                    tenant_id: tenant.id,
                    entity_uid: entry.uid.clone(),
                    action: HistoryAction::Deactivated,
                    old_status: Some(old.status.clone()),
                    new_status: Some(ALERT_INACTIVE.to_string()),
                    old_data: Some(serde_json::to_value(&old)?),
                    new_data: Some(json!({ "status": ALERT_INACTIVE, "is_active": false })),
                    changed_fields: Some(deactivation_diff(&old.status, old.is_active, ALERT_INACTIVE)),
                })
                .await?;
            counts.deactivated += 1;
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    async fn load_active_tenant(&self, tenant_id: Uuid) -> Result<Tenant> {
        let tenant = self
            .store
            .get_tenant(tenant_id)
            .await?
            .ok_or(AppError::TenantNotFound)?;

        if !tenant.is_active {
            return Err(AppError::TenantInactive);
        }

        Ok(tenant)
    }

    fn begin(&self, tenant_id: Uuid) -> Result<InFlightGuard<'_>> {
        let mut in_flight = self.lock_in_flight();
        if !in_flight.insert(tenant_id) {
            return Err(AppError::SyncInProgress);
        }

        Ok(InFlightGuard {
            engine: self,
            tenant_id,
        })
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, HashSet<Uuid>> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Finalize a run as successful; a store failure here propagates
    async fn close_run(
        &self,
        run_id: Uuid,
        started: DateTime<Utc>,
        counts: SyncCounts,
        error_message: Option<String>,
    ) -> Result<()> {
        let status = if error_message.is_some() {
            SyncRunStatus::Error
        } else {
            SyncRunStatus::Success
        };
        let completed = Utc::now();

        self.store
            .finish_sync_run(
                run_id,
                &SyncRunFinish {
                    status,
                    counts,
                    error_message,
                    completed_at: completed,
                    duration_ms: (completed - started).num_milliseconds(),
                },
            )
            .await
    }

    /// Finalize a run after a pass failure; the pass error is what the
    /// caller sees, so a secondary ledger failure is only logged
    async fn close_run_after_error(
        &self,
        run_id: Uuid,
        started: DateTime<Utc>,
        counts: SyncCounts,
        error: &AppError,
    ) {
        if let Err(ledger_err) = self
            .close_run(run_id, started, counts, Some(error.to_string()))
            .await
        {
            tracing::warn!("Failed to finalize sync run {}: {}", run_id, ledger_err);
        }
    }
}

/// Releases the per-tenant reconciliation slot when a pass ends
struct InFlightGuard<'a> {
    engine: &'a SyncEngine,
    tenant_id: Uuid,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.engine.lock_in_flight().remove(&self.tenant_id);
    }
}

/// status/is_active projection diff used for deactivation history rows
fn deactivation_diff(old_status: &str, old_is_active: bool, inactive_status: &str) -> Value {
    let mut old_map = Map::new();
    old_map.insert("status".to_string(), json!(old_status));
    old_map.insert("is_active".to_string(), json!(old_is_active));

    let mut new_map = Map::new();
    new_map.insert("status".to_string(), json!(inactive_status));
    new_map.insert("is_active".to_string(), json!(false));

    Value::Object(diff::changed_fields(&old_map, &new_map))
}
