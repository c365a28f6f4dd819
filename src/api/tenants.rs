// Tenant registry endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::routes::AppState,
    db,
    db::schema::Tenant,
    domain::tenant::{
        generate_slug, LimitStatus, NewTenant, SyncPolicy, TenantLimits, TenantUpdate,
    },
    errors::{AppError, Result},
};

/// Tenant as exposed over the API; remote credentials stay server-side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantView {
    pub id: Uuid,
    pub uid: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub api_url: Option<String>,
    pub platform: Option<String>,
    pub status: String,
    pub is_active: bool,
    pub sync_enabled: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub sync_interval_minutes: i32,
    pub sync_devices: bool,
    pub sync_sites: bool,
    pub sync_alerts: bool,
    pub max_devices: i32,
    pub max_sites: i32,
    pub max_alerts_history: i32,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Tenant> for TenantView {
    fn from(t: Tenant) -> Self {
        Self {
            id: t.id,
            uid: t.uid,
            name: t.name,
            slug: t.slug,
            description: t.description,
            api_url: t.api_url,
            platform: t.platform,
            status: t.status,
            is_active: t.is_active,
            sync_enabled: t.sync_enabled,
            last_sync: t.last_sync,
            sync_interval_minutes: t.sync_interval_minutes,
            sync_devices: t.sync_devices,
            sync_sites: t.sync_sites,
            sync_alerts: t.sync_alerts,
            max_devices: t.max_devices,
            max_sites: t.max_sites,
            max_alerts_history: t.max_alerts_history,
            contact_name: t.contact_name,
            contact_email: t.contact_email,
            contact_phone: t.contact_phone,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub platform: Option<String>,
    pub sync_enabled: Option<bool>,
    pub sync_interval_minutes: Option<i32>,
    pub sync_devices: Option<bool>,
    pub sync_sites: Option<bool>,
    pub sync_alerts: Option<bool>,
    pub max_devices: Option<i32>,
    pub max_sites: Option<i32>,
    pub max_alerts_history: Option<i32>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// GET /v1/tenants
pub async fn list(
    State(state): State<AppState>,
    Query(filters): Query<db::tenants::TenantFilters>,
) -> Result<impl IntoResponse> {
    let tenants = db::tenants::list(&state.db_pool, &filters).await?;
    let views: Vec<TenantView> = tenants.into_iter().map(TenantView::from).collect();
    Ok(Json(views))
}

/// POST /v1/tenants
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateTenantRequest>,
) -> Result<impl IntoResponse> {
    if request.name.trim().is_empty() {
        return Err(AppError::ValidationError("name is required".to_string()));
    }

    let mut tenant = NewTenant::new(request.name.trim());
    if let Some(slug) = request.slug {
        tenant.slug = generate_slug(&slug);
    }
    if tenant.slug.is_empty() {
        return Err(AppError::ValidationError(
            "name must contain at least one alphanumeric character".to_string(),
        ));
    }

    tenant.description = request.description;
    tenant.api_url = request.api_url;
    tenant.api_key = request.api_key;
    tenant.api_secret = request.api_secret;
    tenant.platform = request.platform;
    if let Some(sync_enabled) = request.sync_enabled {
        tenant.sync_enabled = sync_enabled;
    }
    if let Some(minutes) = request.sync_interval_minutes {
        tenant.sync_interval_minutes = minutes;
    }
    if let Some(sync_devices) = request.sync_devices {
        tenant.sync_devices = sync_devices;
    }
    if let Some(sync_sites) = request.sync_sites {
        tenant.sync_sites = sync_sites;
    }
    if let Some(sync_alerts) = request.sync_alerts {
        tenant.sync_alerts = sync_alerts;
    }
    if let Some(max_devices) = request.max_devices {
        tenant.max_devices = max_devices;
    }
    if let Some(max_sites) = request.max_sites {
        tenant.max_sites = max_sites;
    }
    if let Some(max_alerts_history) = request.max_alerts_history {
        tenant.max_alerts_history = max_alerts_history;
    }
    tenant.contact_name = request.contact_name;
    tenant.contact_email = request.contact_email;
    tenant.contact_phone = request.contact_phone;
    if let Some(metadata) = request.metadata {
        tenant.metadata = metadata;
    }

    if !db::tenants::slug_available(&state.db_pool, &tenant.slug, None).await? {
        return Err(AppError::TenantAlreadyExists);
    }

    let created = db::tenants::create(&state.db_pool, &tenant).await?;
    tracing::info!("Created tenant {} ({})", created.name, created.id);

    Ok((StatusCode::CREATED, Json(TenantView::from(created))))
}

/// GET /v1/tenants/:id
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let tenant = db::tenants::get(&state.db_pool, id)
        .await?
        .ok_or(AppError::TenantNotFound)?;

    Ok(Json(TenantView::from(tenant)))
}

/// PUT /v1/tenants/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<TenantUpdate>,
) -> Result<impl IntoResponse> {
    let tenant = db::tenants::update(&state.db_pool, id, &update).await?;
    Ok(Json(TenantView::from(tenant)))
}

/// POST /v1/tenants/:id/deactivate
pub async fn deactivate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let tenant = db::tenants::deactivate(&state.db_pool, id)
        .await?
        .ok_or(AppError::TenantNotFound)?;

    tracing::info!("Deactivated tenant {} ({})", tenant.name, tenant.id);
    Ok(Json(TenantView::from(tenant)))
}

/// DELETE /v1/tenants/:id — removes the tenant and everything it owns
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    if !db::tenants::delete(&state.db_pool, id).await? {
        return Err(AppError::TenantNotFound);
    }

    tracing::info!("Deleted tenant {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/tenants/:id/stats
pub async fn stats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    db::tenants::get(&state.db_pool, id)
        .await?
        .ok_or(AppError::TenantNotFound)?;

    let stats = db::tenants::stats(&state.db_pool, id).await?;
    Ok(Json(stats))
}

/// GET /v1/tenants/:id/limits
pub async fn limits(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let tenant = db::tenants::get(&state.db_pool, id)
        .await?
        .ok_or(AppError::TenantNotFound)?;

    let stats = db::tenants::stats(&state.db_pool, id).await?;
    let limits = TenantLimits {
        devices: LimitStatus::evaluate(stats.total_devices, tenant.max_devices as i64),
        sites: LimitStatus::evaluate(stats.total_sites, tenant.max_sites as i64),
        alerts_history: LimitStatus::evaluate(
            stats.total_alerts,
            tenant.max_alerts_history as i64,
        ),
    };

    Ok(Json(limits))
}

/// GET /v1/tenants/:id/sync-config
pub async fn get_sync_config(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let tenant = db::tenants::get(&state.db_pool, id)
        .await?
        .ok_or(AppError::TenantNotFound)?;

    Ok(Json(SyncPolicy {
        sync_enabled: tenant.sync_enabled,
        sync_interval_minutes: tenant.sync_interval_minutes,
        sync_devices: tenant.sync_devices,
        sync_sites: tenant.sync_sites,
        sync_alerts: tenant.sync_alerts,
        api_url: tenant.api_url,
        platform: tenant.platform,
        last_sync: tenant.last_sync,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SyncConfigRequest {
    pub sync_enabled: Option<bool>,
    pub sync_interval_minutes: Option<i32>,
    pub sync_devices: Option<bool>,
    pub sync_sites: Option<bool>,
    pub sync_alerts: Option<bool>,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub platform: Option<String>,
}

/// PUT /v1/tenants/:id/sync-config
pub async fn put_sync_config(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SyncConfigRequest>,
) -> Result<impl IntoResponse> {
    let update = TenantUpdate {
        sync_enabled: request.sync_enabled,
        sync_interval_minutes: request.sync_interval_minutes,
        sync_devices: request.sync_devices,
        sync_sites: request.sync_sites,
        sync_alerts: request.sync_alerts,
        api_url: request.api_url,
        api_key: request.api_key,
        api_secret: request.api_secret,
        platform: request.platform,
        ..TenantUpdate::default()
    };

    let tenant = db::tenants::update(&state.db_pool, id, &update).await?;

    Ok(Json(SyncPolicy {
        sync_enabled: tenant.sync_enabled,
        sync_interval_minutes: tenant.sync_interval_minutes,
        sync_devices: tenant.sync_devices,
        sync_sites: tenant.sync_sites,
        sync_alerts: tenant.sync_alerts,
        api_url: tenant.api_url,
        platform: tenant.platform,
        last_sync: tenant.last_sync,
    }))
}

/// GET /v1/stats
pub async fn global_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats = db::tenants::global_stats(&state.db_pool).await?;
    Ok(Json(stats))
}
