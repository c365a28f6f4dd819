// Site mapping between remote payloads and persisted rows

use crate::db::schema::Site;
use crate::remote::payload::{self, Payload};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Terminal status for sites that left the remote snapshot
pub const INACTIVE_STATUS: &str = "inactive";

#[derive(Debug, Clone)]
pub struct NewSite {
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
    pub metadata: Value,
}

impl NewSite {
    pub fn from_payload(tenant_id: Uuid, record: &Payload) -> Self {
        let uid = payload::uid(record).unwrap_or_default().to_string();

        Self {
            tenant_id,
            remote_id: Some(remote_id(record).unwrap_or_else(|| uid.clone())),
            name: payload::str_field(record, "name").unwrap_or_else(|| uid.clone()),
            description: payload::str_field(record, "description"),
            status: payload::str_field(record, "status")
                .unwrap_or_else(|| INACTIVE_STATUS.to_string()),
            is_active: true,
            address: payload::str_field(record, "address"),
            contact_name: payload::str_field(record, "contactName"),
            contact_email: payload::str_field(record, "contactEmail"),
            contact_phone: payload::str_field(record, "contactPhone"),
            device_count: payload::int_field(record, "deviceCount").unwrap_or(0) as i32,
            online_devices: payload::int_field(record, "onlineDevices").unwrap_or(0) as i32,
            offline_devices: payload::int_field(record, "offlineDevices").unwrap_or(0) as i32,
            metadata: Value::Object(record.clone()),
            uid,
        }
    }
}

/// Merged column values for an existing site; absent payload fields keep
/// their persisted values
#[derive(Debug, Clone, Serialize)]
pub struct SiteUpdate {
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
    pub metadata: Value,
    pub last_sync: DateTime<Utc>,
}

impl SiteUpdate {
    pub fn merge(old: &Site, record: &Payload, now: DateTime<Utc>) -> Self {
        Self {
            name: payload::str_field(record, "name").unwrap_or_else(|| old.name.clone()),
            description: payload::str_field(record, "description")
                .or_else(|| old.description.clone()),
            status: payload::str_field(record, "status").unwrap_or_else(|| old.status.clone()),
            is_active: true,
            address: payload::str_field(record, "address").or_else(|| old.address.clone()),
            contact_name: payload::str_field(record, "contactName")
                .or_else(|| old.contact_name.clone()),
            contact_email: payload::str_field(record, "contactEmail")
                .or_else(|| old.contact_email.clone()),
            contact_phone: payload::str_field(record, "contactPhone")
                .or_else(|| old.contact_phone.clone()),
            device_count: payload::int_field(record, "deviceCount")
                .map(|n| n as i32)
                .unwrap_or(old.device_count),
            online_devices: payload::int_field(record, "onlineDevices")
                .map(|n| n as i32)
                .unwrap_or(old.online_devices),
            offline_devices: payload::int_field(record, "offlineDevices")
                .map(|n| n as i32)
                .unwrap_or(old.offline_devices),
            metadata: Value::Object(record.clone()),
            last_sync: now,
        }
    }

    pub fn from_row(old: &Site) -> Self {
        Self {
            name: old.name.clone(),
            description: old.description.clone(),
            status: old.status.clone(),
            is_active: old.is_active,
            address: old.address.clone(),
            contact_name: old.contact_name.clone(),
            contact_email: old.contact_email.clone(),
            contact_phone: old.contact_phone.clone(),
            device_count: old.device_count,
            online_devices: old.online_devices,
            offline_devices: old.offline_devices,
            metadata: old.metadata.clone(),
            last_sync: old.last_sync,
        }
    }

    pub fn diffable(&self) -> Map<String, Value> {
        let mut map = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        map.remove("metadata");
        map.remove("last_sync");
        map
    }
}

fn remote_id(record: &Payload) -> Option<String> {
    payload::str_field(record, "id")
        .or_else(|| payload::int_field(record, "id").map(|n| n.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_payload_counts_default_to_zero() {
        let record = json!({ "uid": "s1", "name": "HQ" }).as_object().unwrap().clone();
        let new = NewSite::from_payload(Uuid::new_v4(), &record);

        assert_eq!(new.device_count, 0);
        assert_eq!(new.status, "inactive");
        assert!(new.is_active);
    }

    #[test]
    fn test_merge_overwrites_counts_when_present() {
        let now = Utc::now();
        let old = Site {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            uid: "s1".to_string(),
            remote_id: None,
            name: "HQ".to_string(),
            description: Some("main office".to_string()),
            status: "active".to_string(),
            is_active: true,
            address: None,
            contact_name: None,
            contact_email: None,
            contact_phone: None,
            device_count: 10,
            online_devices: 8,
            offline_devices: 2,
            metadata: json!({}),
            last_sync: now,
            created_at: now,
            updated_at: now,
        };

        let record = json!({ "uid": "s1", "deviceCount": 12 })
            .as_object()
            .unwrap()
            .clone();
        let update = SiteUpdate::merge(&old, &record, now);

        assert_eq!(update.device_count, 12);
        // Absent counts keep their persisted values
        assert_eq!(update.online_devices, 8);
        assert_eq!(update.description.as_deref(), Some("main office"));
    }
}
