// Tenant domain model: creation defaults, slug/uid generation, limit checks

use crate::db::schema::TenantStatus;
use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Values for a new tenant row. `new()` fills the defaults the registry
/// guarantees; callers override fields before inserting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTenant {
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
}

impl NewTenant {
    pub fn new(name: &str) -> Self {
        Self {
            uid: generate_uid(),
            name: name.to_string(),
            slug: generate_slug(name),
            description: None,
            api_url: None,
            api_key: None,
            api_secret: None,
            platform: None,
            status: TenantStatus::Active.as_str().to_string(),
            is_active: true,
            sync_enabled: true,
            sync_interval_minutes: 60,
            sync_devices: true,
            sync_sites: true,
            sync_alerts: true,
            max_devices: 1000,
            max_sites: 100,
            max_alerts_history: 10000,
            contact_name: None,
            contact_email: None,
            contact_phone: None,
            metadata: json!({}),
        }
    }
}

/// Partial update for a tenant row; `None` fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenantUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub platform: Option<String>,
    pub status: Option<String>,
    pub is_active: Option<bool>,
    pub sync_enabled: Option<bool>,
    pub sync_interval_minutes: Option<i32>,
    pub sync_devices: Option<bool>,
    pub sync_sites: Option<bool>,
    pub sync_alerts: Option<bool>,
    pub max_devices: Option<i32>,
    pub max_sites: Option<i32>,
    pub max_alerts_history: Option<i32>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl TenantUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.api_url.is_none()
            && self.api_key.is_none()
            && self.api_secret.is_none()
            && self.platform.is_none()
            && self.status.is_none()
            && self.is_active.is_none()
            && self.sync_enabled.is_none()
            && self.sync_interval_minutes.is_none()
            && self.sync_devices.is_none()
            && self.sync_sites.is_none()
            && self.sync_alerts.is_none()
            && self.max_devices.is_none()
            && self.max_sites.is_none()
            && self.max_alerts_history.is_none()
            && self.contact_name.is_none()
            && self.contact_email.is_none()
            && self.contact_phone.is_none()
            && self.metadata.is_none()
    }
}

/// The sync policy subset of a tenant, as exposed by the sync-config API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPolicy {
    pub sync_enabled: bool,
    pub sync_interval_minutes: i32,
    pub sync_devices: bool,
    pub sync_sites: bool,
    pub sync_alerts: bool,
    pub api_url: Option<String>,
    pub platform: Option<String>,
    pub last_sync: Option<DateTime<Utc>>,
}

/// Usage of one limited resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitStatus {
    pub current: i64,
    pub limit: i64,
    pub percentage: i64,
    pub exceeded: bool,
}

impl LimitStatus {
    pub fn evaluate(current: i64, limit: i64) -> Self {
        let percentage = if limit > 0 {
            ((current as f64 / limit as f64) * 100.0).round() as i64
        } else {
            100
        };

        Self {
            current,
            limit,
            percentage,
            exceeded: current >= limit,
        }
    }
}

/// Limit status across all limited resources of a tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantLimits {
    pub devices: LimitStatus,
    pub sites: LimitStatus,
    pub alerts_history: LimitStatus,
}

/// Generate a unique tenant uid, e.g. `org_1712345678901_x7f3k2m9q`
pub fn generate_uid() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect();

    format!("org_{}_{}", Utc::now().timestamp_millis(), suffix)
}

/// Derive a URL-safe slug from a tenant name
pub fn generate_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());

    for c in name.to_lowercase().chars() {
        match c {
            'a'..='z' | '0'..='9' => slug.push(c),
            ' ' | '-' | '_' => {
                if !slug.ends_with('-') {
                    slug.push('-');
                }
            }
            _ => {}
        }
    }

    slug.trim_matches('-').to_string()
}
