use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub enum AppError {
    // Database errors
    Database(sqlx::Error),
    DatabaseMigration(sqlx::migrate::MigrateError),

    // Remote API errors
    Network(reqwest::Error),
    RemoteApi { status: u16, message: String },
    RemoteAuth(String),

    // Tenant errors
    TenantNotFound,
    TenantInactive,
    TenantAlreadyExists,
    TenantNotConfigured(String),

    // Entity errors
    DeviceNotFound,
    SiteNotFound,
    AlertNotFound,

    // Sync errors
    SyncInProgress,

    // Validation errors
    ValidationError(String),

    // Configuration errors
    Configuration(String),

    // Internal errors
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::DatabaseMigration(e) => write!(f, "Database migration error: {}", e),
            AppError::Network(e) => write!(f, "Network error: {}", e),
            AppError::RemoteApi { status, message } => {
                write!(f, "API error {}: {}", status, message)
            }
            AppError::RemoteAuth(msg) => write!(f, "OAuth 2.0 authentication failed: {}", msg),
            AppError::TenantNotFound => write!(f, "Tenant not found"),
            AppError::TenantInactive => write!(f, "Tenant is not active"),
            AppError::TenantAlreadyExists => write!(f, "Tenant already exists"),
            AppError::TenantNotConfigured(slug) => {
                write!(f, "Tenant {} has no remote API credentials", slug)
            }
            AppError::DeviceNotFound => write!(f, "Device not found"),
            AppError::SiteNotFound => write!(f, "Site not found"),
            AppError::AlertNotFound => write!(f, "Alert not found"),
            AppError::SyncInProgress => write!(f, "A sync for this tenant is already running"),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// Convert from various error types
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::DatabaseMigration(err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("Serialization error: {}", err))
    }
}

// Implement IntoResponse for Axum
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Database(_) | AppError::DatabaseMigration(_) => {
                tracing::error!("Database error: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Network(_) => {
                tracing::error!("Remote API network error: {:?}", self);
                (StatusCode::BAD_GATEWAY, "Remote API unreachable".to_string())
            }
            AppError::RemoteApi { .. } => {
                tracing::error!("Remote API error: {:?}", self);
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            AppError::RemoteAuth(_) => {
                tracing::error!("Remote API auth error: {:?}", self);
                (
                    StatusCode::BAD_GATEWAY,
                    "Remote API authentication failed".to_string(),
                )
            }
            AppError::TenantNotFound => (StatusCode::NOT_FOUND, "Tenant not found".to_string()),
            AppError::TenantInactive => (StatusCode::CONFLICT, "Tenant is not active".to_string()),
            AppError::TenantAlreadyExists => {
                (StatusCode::CONFLICT, "Tenant already exists".to_string())
            }
            AppError::TenantNotConfigured(_) => (StatusCode::CONFLICT, self.to_string()),
            AppError::DeviceNotFound => (StatusCode::NOT_FOUND, "Device not found".to_string()),
            AppError::SiteNotFound => (StatusCode::NOT_FOUND, "Site not found".to_string()),
            AppError::AlertNotFound => (StatusCode::NOT_FOUND, "Alert not found".to_string()),
            AppError::SyncInProgress => (StatusCode::CONFLICT, self.to_string()),
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Configuration(_) => {
                tracing::error!("Configuration error: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(_) => {
                tracing::error!("Internal error: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;
