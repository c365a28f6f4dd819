// Shared fixtures for engine and scheduler tests

use crate::db::schema::Tenant;
use crate::remote::Payload;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

/// An active tenant with sync fully enabled and remote credentials set
pub fn tenant(name: &str) -> Tenant {
    let now = Utc::now();
    let slug = crate::domain::tenant::generate_slug(name);

    Tenant {
        id: Uuid::new_v4(),
        uid: format!("org_test_{}", slug),
        name: name.to_string(),
        slug,
        description: None,
        api_url: Some("https://api.example.net".to_string()),
        api_key: Some("key".to_string()),
        api_secret: Some("secret".to_string()),
        platform: None,
        status: "active".to_string(),
        is_active: true,
        sync_enabled: true,
        last_sync: None,
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
        created_at: now,
        updated_at: now,
    }
}

pub fn record(value: Value) -> Payload {
    value.as_object().expect("fixture must be an object").clone()
}
