// Alert query and management endpoints

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::{
    api::routes::AppState,
    db,
    db::schema::Alert,
    domain::sync::{HistoryAction, NewHistoryEntry},
    errors::{AppError, Result},
    sync::diff,
};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /v1/tenants/:id/alerts
pub async fn list(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Query(filters): Query<db::alerts::AlertFilters>,
) -> Result<impl IntoResponse> {
    db::tenants::get(&state.db_pool, tenant_id)
        .await?
        .ok_or(AppError::TenantNotFound)?;

    let alerts = db::alerts::list(&state.db_pool, tenant_id, &filters).await?;
    Ok(Json(alerts))
}

/// GET /v1/tenants/:id/alerts/:uid
pub async fn get_one(
    State(state): State<AppState>,
    Path((tenant_id, uid)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse> {
    let alert = db::alerts::get(&state.db_pool, tenant_id, &uid)
        .await?
        .ok_or(AppError::AlertNotFound)?;

    Ok(Json(alert))
}

/// GET /v1/tenants/:id/alerts/:uid/history
pub async fn history(
    State(state): State<AppState>,
    Path((tenant_id, uid)): Path<(Uuid, String)>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse> {
    let rows = db::history::alert_history(
        &state.db_pool,
        tenant_id,
        &uid,
        query.limit.unwrap_or(100),
        query.offset.unwrap_or(0),
    )
    .await?;

    Ok(Json(rows))
}

/// POST /v1/tenants/:id/alerts/:uid/acknowledge
pub async fn acknowledge(
    State(state): State<AppState>,
    Path((tenant_id, uid)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse> {
    let old = db::alerts::get(&state.db_pool, tenant_id, &uid)
        .await?
        .ok_or(AppError::AlertNotFound)?;

    let updated = db::alerts::set_acknowledged(&state.db_pool, tenant_id, &uid, Utc::now())
        .await?
        .ok_or(AppError::AlertNotFound)?;

    if !old.acknowledged {
        record_flag_history(
            &state,
            tenant_id,
            &uid,
            HistoryAction::Acknowledged,
            &old,
            &updated,
        )
        .await?;
    }

    Ok(Json(updated))
}

/// POST /v1/tenants/:id/alerts/:uid/resolve
pub async fn resolve(
    State(state): State<AppState>,
    Path((tenant_id, uid)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse> {
    let old = db::alerts::get(&state.db_pool, tenant_id, &uid)
        .await?
        .ok_or(AppError::AlertNotFound)?;

    let updated = db::alerts::set_resolved(&state.db_pool, tenant_id, &uid, Utc::now())
        .await?
        .ok_or(AppError::AlertNotFound)?;

    if !old.resolved {
        record_flag_history(
            &state,
            tenant_id,
            &uid,
            HistoryAction::Resolved,
            &old,
            &updated,
        )
        .await?;
    }

    Ok(Json(updated))
}

async fn record_flag_history(
    state: &AppState,
    tenant_id: Uuid,
    uid: &str,
    action: HistoryAction,
    old: &Alert,
    updated: &Alert,
) -> Result<()> {
    let old_map = flag_map(old);
    let new_map = flag_map(updated);

    db::history::insert_alert(
        &state.db_pool,
        &NewHistoryEntry {
            tenant_id,
            entity_uid: uid.to_string(),
            action,
            old_status: Some(old.status.clone()),
            new_status: Some(updated.status.clone()),
            old_data: Some(serde_json::to_value(old)?),
            new_data: Some(serde_json::to_value(updated)?),
            changed_fields: Some(Value::Object(diff::changed_fields(&old_map, &new_map))),
        },
    )
    .await
}

fn flag_map(alert: &Alert) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("status".to_string(), json!(alert.status));
    map.insert("acknowledged".to_string(), json!(alert.acknowledged));
    map.insert("resolved".to_string(), json!(alert.resolved));
    map
}
