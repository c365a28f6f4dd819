// Site query endpoints

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    api::routes::AppState,
    db,
    errors::{AppError, Result},
};

/// GET /v1/tenants/:id/sites
pub async fn list(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Query(filters): Query<db::sites::SiteFilters>,
) -> Result<impl IntoResponse> {
    db::tenants::get(&state.db_pool, tenant_id)
        .await?
        .ok_or(AppError::TenantNotFound)?;

    let sites = db::sites::list(&state.db_pool, tenant_id, &filters).await?;
    Ok(Json(sites))
}

/// GET /v1/tenants/:id/sites/:uid
pub async fn get_one(
    State(state): State<AppState>,
    Path((tenant_id, uid)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse> {
    let site = db::sites::get(&state.db_pool, tenant_id, &uid)
        .await?
        .ok_or(AppError::SiteNotFound)?;

    Ok(Json(site))
}
