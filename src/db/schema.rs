// Database schema types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================================================
// Tenant
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub id: Uuid,
    pub uid: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
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
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TenantStatus {
    Active,
    Inactive,
    Suspended,
}

impl TenantStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TenantStatus::Active => "active",
            TenantStatus::Inactive => "inactive",
            TenantStatus::Suspended => "suspended",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(TenantStatus::Active),
            "inactive" => Some(TenantStatus::Inactive),
            "suspended" => Some(TenantStatus::Suspended),
            _ => None,
        }
    }
}

// ============================================================================
// Device
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Device {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub uid: String,
    pub remote_id: Option<String>,
    pub name: String,
    pub device_type: Option<String>,
    pub status: String,
    pub is_active: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub os: Option<String>,
    pub os_version: Option<String>,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub hostname: Option<String>,
    pub site_uid: Option<String>,
    pub site_name: Option<String>,
    pub metadata: serde_json::Value,
    pub last_sync: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Projection of an entity row to what reconciliation needs up front
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EntityRef {
    pub uid: String,
    pub is_active: bool,
}

// ============================================================================
// Site
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Site {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub uid: String,
    pub remote_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub is_active: bool,
    pub address: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub device_count: i32,
    pub online_devices: i32,
    pub offline_devices: i32,
    pub metadata: serde_json::Value,
    pub last_sync: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Alert
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Alert {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub uid: String,
    pub remote_id: Option<String>,
    pub title: String,
    pub message: Option<String>,
    pub severity: String,
    pub category: Option<String>,
    pub source: Option<String>,
    pub status: String,
    pub is_active: bool,
    pub acknowledged: bool,
    pub resolved: bool,
    pub device_uid: Option<String>,
    pub device_name: Option<String>,
    pub site_uid: Option<String>,
    pub site_name: Option<String>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub metadata: serde_json::Value,
    pub last_sync: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// History
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeviceHistory {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub device_uid: String,
    pub action: String,
    pub old_status: Option<String>,
    pub new_status: Option<String>,
    pub old_data: Option<serde_json::Value>,
    pub new_data: Option<serde_json::Value>,
    pub changed_fields: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AlertHistory {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub alert_uid: String,
    pub action: String,
    pub old_status: Option<String>,
    pub new_status: Option<String>,
    pub old_data: Option<serde_json::Value>,
    pub new_data: Option<serde_json::Value>,
    pub changed_fields: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Sync Run
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SyncRun {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub sync_type: String,
    pub status: String,
    pub items_processed: i32,
    pub items_created: i32,
    pub items_updated: i32,
    pub items_deactivated: i32,
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
}
