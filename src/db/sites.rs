// Database queries for sites

use crate::db::schema::{EntityRef, Site};
use crate::domain::site::{NewSite, SiteUpdate, INACTIVE_STATUS};
use crate::errors::Result;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// (uid, is_active) projection of every site row for one tenant
pub async fn refs(pool: &PgPool, tenant_id: Uuid) -> Result<Vec<EntityRef>> {
    let refs =
        sqlx::query_as::<_, EntityRef>("SELECT uid, is_active FROM sites WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_all(pool)
            .await?;

    Ok(refs)
}

pub async fn get(pool: &PgPool, tenant_id: Uuid, uid: &str) -> Result<Option<Site>> {
    let site = sqlx::query_as::<_, Site>("SELECT * FROM sites WHERE tenant_id = $1 AND uid = $2")
        .bind(tenant_id)
        .bind(uid)
        .fetch_optional(pool)
        .await?;

    Ok(site)
}

pub async fn insert(pool: &PgPool, site: &NewSite) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO sites (
            id, tenant_id, uid, remote_id, name, description, status, is_active,
            address, contact_name, contact_email, contact_phone,
            device_count, online_devices, offline_devices, metadata
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(site.tenant_id)
    .bind(&site.uid)
    .bind(&site.remote_id)
    .bind(&site.name)
    .bind(&site.description)
    .bind(&site.status)
    .bind(site.is_active)
    .bind(&site.address)
    .bind(&site.contact_name)
    .bind(&site.contact_email)
    .bind(&site.contact_phone)
    .bind(site.device_count)
    .bind(site.online_devices)
    .bind(site.offline_devices)
    .bind(&site.metadata)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn update(pool: &PgPool, tenant_id: Uuid, uid: &str, update: &SiteUpdate) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE sites SET
            name = $3, description = $4, status = $5, is_active = $6, address = $7,
            contact_name = $8, contact_email = $9, contact_phone = $10,
            device_count = $11, online_devices = $12, offline_devices = $13,
            metadata = $14, last_sync = $15, updated_at = now()
        WHERE tenant_id = $1 AND uid = $2
        "#,
    )
    .bind(tenant_id)
    .bind(uid)
    .bind(&update.name)
    .bind(&update.description)
    .bind(&update.status)
    .bind(update.is_active)
    .bind(&update.address)
    .bind(&update.contact_name)
    .bind(&update.contact_email)
    .bind(&update.contact_phone)
    .bind(update.device_count)
    .bind(update.online_devices)
    .bind(update.offline_devices)
    .bind(&update.metadata)
    .bind(update.last_sync)
    .execute(pool)
    .await?;

    Ok(())
}

/// Mark a site no longer reported by the remote API; the row is kept
pub async fn deactivate(pool: &PgPool, tenant_id: Uuid, uid: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE sites SET is_active = false, status = $3, updated_at = now()
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

/// Listing filters; all optional, combined with AND
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteFilters {
    pub status: Option<String>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list(pool: &PgPool, tenant_id: Uuid, filters: &SiteFilters) -> Result<Vec<Site>> {
    let mut query: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT * FROM sites WHERE tenant_id = ");
    query.push_bind(tenant_id);

    if let Some(status) = &filters.status {
        query.push(" AND status = ").push_bind(status);
    }
    if let Some(is_active) = filters.is_active {
        query.push(" AND is_active = ").push_bind(is_active);
    }
    if let Some(search) = &filters.search {
        let pattern = format!("%{}%", search);
        query
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    query.push(" ORDER BY name ASC");
    query
        .push(" LIMIT ")
        .push_bind(filters.limit.unwrap_or(100));
    query
        .push(" OFFSET ")
        .push_bind(filters.offset.unwrap_or(0));

    let sites = query.build_query_as::<Site>().fetch_all(pool).await?;
    Ok(sites)
}
