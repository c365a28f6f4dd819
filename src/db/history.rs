// Append-only history ledgers for devices and alerts.
//
// Rows are inserted by the reconciliation engine and by the local alert
// acknowledge/resolve operations; nothing ever updates or deletes them.

use crate::db::schema::{AlertHistory, DeviceHistory};
use crate::domain::sync::NewHistoryEntry;
use crate::errors::Result;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn insert_device(pool: &PgPool, entry: &NewHistoryEntry) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO device_history (
            id, tenant_id, device_uid, action, old_status, new_status,
            old_data, new_data, changed_fields
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(entry.tenant_id)
    .bind(&entry.entity_uid)
    .bind(entry.action.as_str())
    .bind(&entry.old_status)
    .bind(&entry.new_status)
    .bind(&entry.old_data)
    .bind(&entry.new_data)
    .bind(&entry.changed_fields)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn insert_alert(pool: &PgPool, entry: &NewHistoryEntry) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO alert_history (
            id, tenant_id, alert_uid, action, old_status, new_status,
            old_data, new_data, changed_fields
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(entry.tenant_id)
    .bind(&entry.entity_uid)
    .bind(entry.action.as_str())
    .bind(&entry.old_status)
    .bind(&entry.new_status)
    .bind(&entry.old_data)
    .bind(&entry.new_data)
    .bind(&entry.changed_fields)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn device_history(
    pool: &PgPool,
    tenant_id: Uuid,
    device_uid: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<DeviceHistory>> {
    let rows = sqlx::query_as::<_, DeviceHistory>(
        r#"
        SELECT * FROM device_history
        WHERE tenant_id = $1 AND device_uid = $2
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(tenant_id)
    .bind(device_uid)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn alert_history(
    pool: &PgPool,
    tenant_id: Uuid,
    alert_uid: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<AlertHistory>> {
    let rows = sqlx::query_as::<_, AlertHistory>(
        r#"
        SELECT * FROM alert_history
        WHERE tenant_id = $1 AND alert_uid = $2
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(tenant_id)
    .bind(alert_uid)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
