// Sync trigger and ledger endpoints

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    api::routes::AppState,
    db,
    domain::sync::SyncType,
    errors::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct TriggerQuery {
    /// devices | sites | alerts | full (default)
    #[serde(rename = "type")]
    pub sync_type: Option<String>,
}

/// POST /v1/tenants/:id/sync
pub async fn trigger(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Query(query): Query<TriggerQuery>,
) -> Result<impl IntoResponse> {
    let sync_type = match query.sync_type.as_deref() {
        None => SyncType::Full,
        Some(s) => SyncType::from_str(s)
            .ok_or_else(|| AppError::ValidationError(format!("unknown sync type: {}", s)))?,
    };

    let body = match sync_type {
        SyncType::Full => {
            let report = state.engine.sync_tenant(tenant_id).await?;
            json!({ "sync_type": "full", "result": report })
        }
        SyncType::Devices => {
            let counts = state.engine.sync_devices(tenant_id).await?;
            json!({ "sync_type": "devices", "result": counts })
        }
        SyncType::Sites => {
            let counts = state.engine.sync_sites(tenant_id).await?;
            json!({ "sync_type": "sites", "result": counts })
        }
        SyncType::Alerts => {
            let counts = state.engine.sync_alerts(tenant_id).await?;
            json!({ "sync_type": "alerts", "result": counts })
        }
    };

    Ok(Json(body))
}

#[derive(Debug, Deserialize)]
pub struct RunsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /v1/tenants/:id/sync-runs
pub async fn runs(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Query(query): Query<RunsQuery>,
) -> Result<impl IntoResponse> {
    db::tenants::get(&state.db_pool, tenant_id)
        .await?
        .ok_or(AppError::TenantNotFound)?;

    let runs = db::sync_runs::list(
        &state.db_pool,
        tenant_id,
        query.limit.unwrap_or(50),
        query.offset.unwrap_or(0),
    )
    .await?;

    Ok(Json(runs))
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub tenant_id: Option<Uuid>,
}

/// GET /v1/sync/stats
pub async fn stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<impl IntoResponse> {
    let rows = db::sync_runs::stats(&state.db_pool, query.tenant_id).await?;
    Ok(Json(rows))
}
