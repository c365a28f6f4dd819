use crate::{
    api::{alerts, devices, health, sites, sync, tenants},
    sync::SyncEngine,
};
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub engine: Arc<SyncEngine>,
}

pub fn create_router(db_pool: PgPool, engine: Arc<SyncEngine>) -> Router {
    let state = AppState { db_pool, engine };

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health endpoints
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        // API v1 routes
        .nest("/v1", v1_routes())
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Add state
        .with_state(state)
}

fn v1_routes() -> Router<AppState> {
    Router::new()
        // Tenant registry
        .route("/tenants", get(tenants::list).post(tenants::create))
        .route(
            "/tenants/:id",
            get(tenants::get_one)
                .put(tenants::update)
                .delete(tenants::delete),
        )
        .route("/tenants/:id/deactivate", post(tenants::deactivate))
        .route("/tenants/:id/stats", get(tenants::stats))
        .route("/tenants/:id/limits", get(tenants::limits))
        .route(
            "/tenants/:id/sync-config",
            get(tenants::get_sync_config).put(tenants::put_sync_config),
        )
        // Sync
        .route("/tenants/:id/sync", post(sync::trigger))
        .route("/tenants/:id/sync-runs", get(sync::runs))
        .route("/sync/stats", get(sync::stats))
        // Devices
        .route("/tenants/:id/devices", get(devices::list))
        .route("/tenants/:id/devices/:uid", get(devices::get_one))
        .route("/tenants/:id/devices/:uid/history", get(devices::history))
        // Sites
        .route("/tenants/:id/sites", get(sites::list))
        .route("/tenants/:id/sites/:uid", get(sites::get_one))
        // Alerts
        .route("/tenants/:id/alerts", get(alerts::list))
        .route("/tenants/:id/alerts/:uid", get(alerts::get_one))
        .route("/tenants/:id/alerts/:uid/history", get(alerts::history))
        .route(
            "/tenants/:id/alerts/:uid/acknowledge",
            post(alerts::acknowledge),
        )
        .route("/tenants/:id/alerts/:uid/resolve", post(alerts::resolve))
        // Global aggregates
        .route("/stats", get(tenants::global_stats))
}
