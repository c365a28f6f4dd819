// Sync run ledger queries

use crate::db::schema::SyncRun;
use crate::domain::sync::{SyncRunFinish, SyncType};
use crate::errors::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Open a run row with status `running`; called before the first remote
/// fetch so aborted passes still leave a trace
pub async fn open(
    pool: &PgPool,
    tenant_id: Uuid,
    sync_type: SyncType,
    started_at: DateTime<Utc>,
) -> Result<Uuid> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO sync_runs (id, tenant_id, sync_type, status, started_at)
        VALUES ($1, $2, $3, 'running', $4)
        "#,
    )
    .bind(id)
    .bind(tenant_id)
    .bind(sync_type.as_str())
    .bind(started_at)
    .execute(pool)
    .await?;

    Ok(id)
}

/// Finalize a run row; happens exactly once per run
pub async fn finish(pool: &PgPool, run_id: Uuid, finish: &SyncRunFinish) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE sync_runs SET
            status = $2, items_processed = $3, items_created = $4, items_updated = $5,
            items_deactivated = $6, error_message = $7, completed_at = $8, duration_ms = $9
        WHERE id = $1
        "#,
    )
    .bind(run_id)
    .bind(finish.status.as_str())
    .bind(finish.counts.total)
    .bind(finish.counts.created)
    .bind(finish.counts.updated)
    .bind(finish.counts.deactivated)
    .bind(&finish.error_message)
    .bind(finish.completed_at)
    .bind(finish.duration_ms)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn list(pool: &PgPool, tenant_id: Uuid, limit: i64, offset: i64) -> Result<Vec<SyncRun>> {
    let runs = sqlx::query_as::<_, SyncRun>(
        r#"
        SELECT * FROM sync_runs
        WHERE tenant_id = $1
        ORDER BY started_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(tenant_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(runs)
}

/// Aggregated run outcomes grouped by tenant, type, and status
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SyncStatsRow {
    pub tenant_id: Uuid,
    pub sync_type: String,
    pub status: String,
    pub runs: i64,
    pub avg_duration_ms: Option<f64>,
    pub last_started_at: Option<DateTime<Utc>>,
    pub total_processed: Option<i64>,
    pub total_created: Option<i64>,
    pub total_updated: Option<i64>,
    pub total_deactivated: Option<i64>,
}

pub async fn stats(pool: &PgPool, tenant_id: Option<Uuid>) -> Result<Vec<SyncStatsRow>> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
        r#"
        SELECT
            tenant_id,
            sync_type,
            status,
            COUNT(*) AS runs,
            AVG(duration_ms)::double precision AS avg_duration_ms,
            MAX(started_at) AS last_started_at,
            SUM(items_processed)::bigint AS total_processed,
            SUM(items_created)::bigint AS total_created,
            SUM(items_updated)::bigint AS total_updated,
            SUM(items_deactivated)::bigint AS total_deactivated
        FROM sync_runs
        "#,
    );

    if let Some(tenant_id) = tenant_id {
        query.push(" WHERE tenant_id = ").push_bind(tenant_id);
    }

    query.push(" GROUP BY tenant_id, sync_type, status ORDER BY tenant_id, sync_type, status");

    let rows = query.build_query_as::<SyncStatsRow>().fetch_all(pool).await?;
    Ok(rows)
}
