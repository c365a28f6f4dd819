pub mod alerts;
pub mod devices;
pub mod health;
pub mod routes;
pub mod sites;
pub mod sync;
pub mod tenants;

pub use routes::{create_router, AppState};
