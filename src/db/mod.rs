pub mod alerts;
pub mod devices;
pub mod history;
pub mod pool;
pub mod schema;
pub mod sites;
pub mod sync_runs;
pub mod tenants;

pub use pool::{create_pool, health_check, run_migrations};
