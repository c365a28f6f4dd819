use rmm_sync::{
    api::create_router,
    config::Config,
    db::{create_pool, run_migrations},
    observability::init_tracing,
    remote::HttpClientFactory,
    store::PgStore,
    sync::{SyncEngine, SyncScheduler},
};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;
    config.validate()?;

    // Initialize tracing/logging
    init_tracing(&config.observability);

    tracing::info!("Starting RMM sync service");

    // Create database connection pool
    let db_pool = create_pool(&config.database).await?;

    // Run database migrations
    run_migrations(&db_pool).await?;

    // Wire the reconciliation engine
    let store = Arc::new(PgStore::new(db_pool.clone()));
    let clients = Arc::new(HttpClientFactory::new(config.remote.clone()));
    let engine = Arc::new(SyncEngine::new(store.clone(), clients));

    // Background sync scheduler
    if config.scheduler.enabled {
        let scheduler = Arc::new(SyncScheduler::new(store.clone(), engine.clone()));
        scheduler.spawn(config.scheduler.tick_seconds);
    } else {
        tracing::info!("Sync scheduler disabled by configuration");
    }

    // Create router
    let app = create_router(db_pool.clone(), engine);

    // Bind server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("RMM sync service is ready to accept requests");

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
