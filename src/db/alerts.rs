// Database queries for alerts

use crate::db::schema::{Alert, EntityRef};
use crate::domain::alert::{AlertUpdate, NewAlert, INACTIVE_STATUS};
use crate::errors::Result;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// (uid, is_active) projection of every alert row for one tenant
pub async fn refs(pool: &PgPool, tenant_id: Uuid) -> Result<Vec<EntityRef>> {
    let refs =
        sqlx::query_as::<_, EntityRef>("SELECT uid, is_active FROM alerts WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_all(pool)
            .await?;

    Ok(refs)
}

pub async fn get(pool: &PgPool, tenant_id: Uuid, uid: &str) -> Result<Option<Alert>> {
    let alert = sqlx::query_as::<_, Alert>("SELECT * FROM alerts WHERE tenant_id = $1 AND uid = $2")
        .bind(tenant_id)
        .bind(uid)
        .fetch_optional(pool)
        .await?;

    Ok(alert)
}

pub async fn insert(pool: &PgPool, alert: &NewAlert) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO alerts (
            id, tenant_id, uid, remote_id, title, message, severity, category, source,
            status, is_active, acknowledged, resolved,
            device_uid, device_name, site_uid, site_name,
            acknowledged_at, resolved_at, metadata
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(alert.tenant_id)
    .bind(&alert.uid)
    .bind(&alert.remote_id)
    .bind(&alert.title)
    .bind(&alert.message)
    .bind(&alert.severity)
    .bind(&alert.category)
    .bind(&alert.source)
    .bind(&alert.status)
    .bind(alert.is_active)
    .bind(alert.acknowledged)
    .bind(alert.resolved)
    .bind(&alert.device_uid)
    .bind(&alert.device_name)
    .bind(&alert.site_uid)
    .bind(&alert.site_name)
    .bind(alert.acknowledged_at)
    .bind(alert.resolved_at)
    .bind(&alert.metadata)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn update(pool: &PgPool, tenant_id: Uuid, uid: &str, update: &AlertUpdate) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE alerts SET
            title = $3, message = $4, severity = $5, category = $6, source = $7,
            status = $8, is_active = $9, acknowledged = $10, resolved = $11,
            device_uid = $12, device_name = $13, site_uid = $14, site_name = $15,
            acknowledged_at = $16, resolved_at = $17, metadata = $18, last_sync = $19,
            updated_at = now()
        WHERE tenant_id = $1 AND uid = $2
        "#,
    )
    .bind(tenant_id)
    .bind(uid)
    .bind(&update.title)
    .bind(&update.message)
    .bind(&update.severity)
    .bind(&update.category)
    .bind(&update.source)
    .bind(&update.status)
    .bind(update.is_active)
    .bind(update.acknowledged)
    .bind(update.resolved)
    .bind(&update.device_uid)
    .bind(&update.device_name)
    .bind(&update.site_uid)
    .bind(&update.site_name)
    .bind(update.acknowledged_at)
    .bind(update.resolved_at)
    .bind(&update.metadata)
    .bind(update.last_sync)
    .execute(pool)
    .await?;

    Ok(())
}

/// Mark an alert no longer reported by the remote API; the row is kept
pub async fn deactivate(pool: &PgPool, tenant_id: Uuid, uid: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE alerts SET is_active = false, status = $3, updated_at = now()
        WHERE tenant_id = $1 AND uid = $2
        "#,
    )
    .bind(tenant_id)
    .bind(uid)
    .bind(INACTIVE_STATUS)
    .execute(pool)
    .await?;

    Ok(())
}

/// Locally acknowledge an alert; returns the updated row
pub async fn set_acknowledged(
    pool: &PgPool,
    tenant_id: Uuid,
    uid: &str,
    at: DateTime<Utc>,
) -> Result<Option<Alert>> {
    let alert = sqlx::query_as::<_, Alert>(
        r#"
        UPDATE alerts
        SET acknowledged = true, status = 'acknowledged', acknowledged_at = $3,
            updated_at = now()
        WHERE tenant_id = $1 AND uid = $2
        RETURNING *
        "#,
    )
    .bind(tenant_id)
    .bind(uid)
    .bind(at)
    .fetch_optional(pool)
    .await?;

    Ok(alert)
}

/// Locally resolve an alert; returns the updated row
pub async fn set_resolved(
    pool: &PgPool,
    tenant_id: Uuid,
    uid: &str,
    at: DateTime<Utc>,
) -> Result<Option<Alert>> {
    let alert = sqlx::query_as::<_, Alert>(
        r#"
        UPDATE alerts
        SET resolved = true, status = 'resolved', resolved_at = $3, updated_at = now()
        WHERE tenant_id = $1 AND uid = $2
        RETURNING *
        "#,
    )
    .bind(tenant_id)
    .bind(uid)
    .bind(at)
    .fetch_optional(pool)
    .await?;

    Ok(alert)
}

/// Listing filters; all optional, combined with AND
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertFilters {
    pub severity: Option<String>,
    pub status: Option<String>,
    pub is_active: Option<bool>,
    pub acknowledged: Option<bool>,
    pub resolved: Option<bool>,
    pub device_uid: Option<String>,
    pub site_uid: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list(pool: &PgPool, tenant_id: Uuid, filters: &AlertFilters) -> Result<Vec<Alert>> {
    let mut query: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT * FROM alerts WHERE tenant_id = ");
    query.push_bind(tenant_id);

    if let Some(severity) = &filters.severity {
        query.push(" AND severity = ").push_bind(severity);
    }
    if let Some(status) = &filters.status {
        query.push(" AND status = ").push_bind(status);
    }
    if let Some(is_active) = filters.is_active {
        query.push(" AND is_active = ").push_bind(is_active);
    }
    if let Some(acknowledged) = filters.acknowledged {
        query.push(" AND acknowledged = ").push_bind(acknowledged);
    }
    if let Some(resolved) = filters.resolved {
        query.push(" AND resolved = ").push_bind(resolved);
    }
    if let Some(device_uid) = &filters.device_uid {
        query.push(" AND device_uid = ").push_bind(device_uid);
    }
    if let Some(site_uid) = &filters.site_uid {
        query.push(" AND site_uid = ").push_bind(site_uid);
    }
    if let Some(search) = &filters.search {
        let pattern = format!("%{}%", search);
        query
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR message ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    query.push(" ORDER BY created_at DESC");
    query
        .push(" LIMIT ")
        .push_bind(filters.limit.unwrap_or(100));
    query
        .push(" OFFSET ")
        .push_bind(filters.offset.unwrap_or(0));

    let alerts = query.build_query_as::<Alert>().fetch_all(pool).await?;
    Ok(alerts)
}
