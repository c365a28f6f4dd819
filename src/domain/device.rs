// Device mapping between remote payloads and persisted rows

use crate::db::schema::Device;
use crate::remote::payload::{self, Payload};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Terminal status for devices that left the remote snapshot
pub const INACTIVE_STATUS: &str = "inactive";

/// Column values for a device first seen in a remote snapshot
#[derive(Debug, Clone)]
pub struct NewDevice {
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
    pub metadata: Value,
}

impl NewDevice {
    pub fn from_payload(tenant_id: Uuid, record: &Payload) -> Self {
        let uid = payload::uid(record).unwrap_or_default().to_string();

        Self {
            tenant_id,
            remote_id: Some(remote_id(record).unwrap_or_else(|| uid.clone())),
            name: payload::str_field(record, "name").unwrap_or_else(|| uid.clone()),
            device_type: payload::str_field(record, "type"),
            status: payload::str_field(record, "status")
                .unwrap_or_else(|| INACTIVE_STATUS.to_string()),
            is_active: true,
            last_seen_at: payload::time_field(record, "lastSeen"),
            os: payload::str_field(record, "os"),
            os_version: payload::str_field(record, "osVersion"),
            ip_address: payload::str_field(record, "ip"),
            mac_address: payload::str_field(record, "macAddress"),
            hostname: payload::str_field(record, "hostname"),
            site_uid: payload::str_field(record, "siteUid"),
            site_name: payload::str_field(record, "siteName"),
            metadata: Value::Object(record.clone()),
            uid,
        }
    }
}

/// Merged column values for an existing device. Fields the payload omits
/// keep their persisted value; `is_active` is always forced back to true.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceUpdate {
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
    pub metadata: Value,
    pub last_sync: DateTime<Utc>,
}

impl DeviceUpdate {
    pub fn merge(old: &Device, record: &Payload, now: DateTime<Utc>) -> Self {
        Self {
            name: payload::str_field(record, "name").unwrap_or_else(|| old.name.clone()),
            device_type: payload::str_field(record, "type").or_else(|| old.device_type.clone()),
            status: payload::str_field(record, "status").unwrap_or_else(|| old.status.clone()),
            is_active: true,
            last_seen_at: payload::time_field(record, "lastSeen").or(old.last_seen_at),
            os: payload::str_field(record, "os").or_else(|| old.os.clone()),
            os_version: payload::str_field(record, "osVersion")
                .or_else(|| old.os_version.clone()),
            ip_address: payload::str_field(record, "ip").or_else(|| old.ip_address.clone()),
            mac_address: payload::str_field(record, "macAddress")
                .or_else(|| old.mac_address.clone()),
            hostname: payload::str_field(record, "hostname").or_else(|| old.hostname.clone()),
            site_uid: payload::str_field(record, "siteUid").or_else(|| old.site_uid.clone()),
            site_name: payload::str_field(record, "siteName").or_else(|| old.site_name.clone()),
            metadata: Value::Object(record.clone()),
            last_sync: now,
        }
    }

    /// The same projection computed from a persisted row, used as the old
    /// side of a field diff
    pub fn from_row(old: &Device) -> Self {
        Self {
            name: old.name.clone(),
            device_type: old.device_type.clone(),
            status: old.status.clone(),
            is_active: old.is_active,
            last_seen_at: old.last_seen_at,
            os: old.os.clone(),
            os_version: old.os_version.clone(),
            ip_address: old.ip_address.clone(),
            mac_address: old.mac_address.clone(),
            hostname: old.hostname.clone(),
            site_uid: old.site_uid.clone(),
            site_name: old.site_name.clone(),
            metadata: old.metadata.clone(),
            last_sync: old.last_sync,
        }
    }

    /// Column values as a JSON map for diffing. The opaque metadata blob and
    /// the always-refreshed last_sync are excluded so an unchanged snapshot
    /// produces an empty diff.
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

    fn record(value: Value) -> Payload {
        value.as_object().unwrap().clone()
    }

    fn existing_device() -> Device {
        let now = Utc::now();
        Device {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            uid: "d1".to_string(),
            remote_id: Some("100".to_string()),
            name: "web-01".to_string(),
            device_type: Some("server".to_string()),
            status: "online".to_string(),
            is_active: false,
            last_seen_at: None,
            os: Some("Windows Server".to_string()),
            os_version: Some("10.0".to_string()),
            ip_address: Some("10.0.0.5".to_string()),
            mac_address: None,
            hostname: Some("web-01.local".to_string()),
            site_uid: Some("s1".to_string()),
            site_name: Some("HQ".to_string()),
            metadata: json!({}),
            last_sync: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_from_payload_defaults() {
        let new = NewDevice::from_payload(
            Uuid::new_v4(),
            &record(json!({ "uid": "d9", "name": "db-01" })),
        );

        assert_eq!(new.uid, "d9");
        assert_eq!(new.name, "db-01");
        assert_eq!(new.status, "inactive");
        assert!(new.is_active);
        assert_eq!(new.remote_id.as_deref(), Some("d9"));
    }

    #[test]
    fn test_from_payload_numeric_remote_id() {
        let new = NewDevice::from_payload(
            Uuid::new_v4(),
            &record(json!({ "uid": "d9", "name": "db-01", "id": 4711 })),
        );
        assert_eq!(new.remote_id.as_deref(), Some("4711"));
    }

    #[test]
    fn test_merge_retains_absent_fields() {
        let old = existing_device();
        let update = DeviceUpdate::merge(
            &old,
            &record(json!({ "uid": "d1", "name": "web-01", "status": "offline" })),
            Utc::now(),
        );

        assert_eq!(update.status, "offline");
        // Fields the payload omits keep their persisted values
        assert_eq!(update.os_version.as_deref(), Some("10.0"));
        assert_eq!(update.hostname.as_deref(), Some("web-01.local"));
        assert_eq!(update.site_name.as_deref(), Some("HQ"));
    }

    #[test]
    fn test_merge_forces_reactivation() {
        let old = existing_device();
        assert!(!old.is_active);

        let update = DeviceUpdate::merge(&old, &record(json!({ "uid": "d1" })), Utc::now());
        assert!(update.is_active);
    }

    #[test]
    fn test_diffable_excludes_bookkeeping_columns() {
        let old = existing_device();
        let map = DeviceUpdate::from_row(&old).diffable();

        assert!(map.contains_key("name"));
        assert!(map.contains_key("status"));
        assert!(!map.contains_key("metadata"));
        assert!(!map.contains_key("last_sync"));
    }
}
