// Device query endpoints

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::routes::AppState,
    db,
    errors::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /v1/tenants/:id/devices
pub async fn list(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Query(filters): Query<db::devices::DeviceFilters>,
) -> Result<impl IntoResponse> {
    db::tenants::get(&state.db_pool, tenant_id)
        .await?
        .ok_or(AppError::TenantNotFound)?;

    let devices = db::devices::list(&state.db_pool, tenant_id, &filters).await?;
    Ok(Json(devices))
}

/// GET /v1/tenants/:id/devices/:uid
pub async fn get_one(
    State(state): State<AppState>,
    Path((tenant_id, uid)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse> {
    let device = db::devices::get(&state.db_pool, tenant_id, &uid)
        .await?
        .ok_or(AppError::DeviceNotFound)?;

    Ok(Json(device))
}

/// GET /v1/tenants/:id/devices/:uid/history
pub async fn history(
    State(state): State<AppState>,
    Path((tenant_id, uid)): Path<(Uuid, String)>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse> {
    let rows = db::history::device_history(
        &state.db_pool,
        tenant_id,
        &uid,
        query.limit.unwrap_or(100),
        query.offset.unwrap_or(0),
    )
    .await?;

    Ok(Json(rows))
}
