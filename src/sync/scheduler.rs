// Due-tenant selection and batch sync.
//
// Tenants are processed one at a time, and one tenant's failure never
// aborts the batch: it is caught and recorded as a per-tenant outcome.

use crate::db::schema::Tenant;
use crate::domain::sync::TenantSyncOutcome;
use crate::errors::Result;
use crate::store::SyncStore;
use crate::sync::SyncEngine;
use chrono::Utc;
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};

pub struct SyncScheduler {
    store: Arc<dyn SyncStore>,
    engine: Arc<SyncEngine>,
}

impl SyncScheduler {
    pub fn new(store: Arc<dyn SyncStore>, engine: Arc<SyncEngine>) -> Self {
        Self { store, engine }
    }

    /// Tenants eligible for a sync pass right now, oldest-synced first
    pub async fn due_tenants(&self) -> Result<Vec<Tenant>> {
        self.store.due_tenants(Utc::now()).await
    }

    /// Full-sync every due tenant sequentially, recording each outcome
    pub async fn sync_all_due(&self) -> Result<Vec<TenantSyncOutcome>> {
        let tenants = self.due_tenants().await?;

        if !tenants.is_empty() {
            tracing::info!("{} tenant(s) due for sync", tenants.len());
        }

        let mut outcomes = Vec::with_capacity(tenants.len());

        for tenant in tenants {
            match self.engine.sync_tenant(tenant.id).await {
                Ok(report) => {
                    outcomes.push(TenantSyncOutcome {
                        tenant_id: tenant.id,
                        tenant_name: tenant.name,
                        success: true,
                        result: Some(report),
                        error: None,
                    });
                }
                Err(e) => {
                    tracing::error!("Sync failed for tenant {}: {}", tenant.name, e);
                    outcomes.push(TenantSyncOutcome {
                        tenant_id: tenant.id,
                        tenant_name: tenant.name,
                        success: false,
                        result: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        Ok(outcomes)
    }

    /// Background task scanning for due tenants on a fixed interval
    pub fn spawn(self: Arc<Self>, tick_seconds: u64) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(tick_seconds));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!("Sync scheduler started (tick every {}s)", tick_seconds);

            loop {
                ticker.tick().await;

                match self.sync_all_due().await {
                    Ok(outcomes) => {
                        let failed = outcomes.iter().filter(|o| !o.success).count();
                        if failed > 0 {
                            tracing::warn!(
                                "Batch sync finished: {} tenant(s), {} failed",
                                outcomes.len(),
                                failed
                            );
                        }
                    }
                    Err(e) => {
                        tracing::error!("Batch sync scan failed: {}", e);
                    }
                }
            }
        })
    }
}
