// Alert mapping between remote payloads and persisted rows

use crate::db::schema::Alert;
use crate::domain::sync::HistoryAction;
use crate::remote::payload::{self, Payload};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Terminal status for alerts that left the remote snapshot
pub const INACTIVE_STATUS: &str = "inactive";

/// Status assigned to a newly created alert when the payload carries none
pub const DEFAULT_STATUS: &str = "active";

#[derive(Debug, Clone)]
pub struct NewAlert {
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
    pub metadata: Value,
}

impl NewAlert {
    pub fn from_payload(tenant_id: Uuid, record: &Payload) -> Self {
        let uid = payload::uid(record).unwrap_or_default().to_string();

        Self {
            tenant_id,
            remote_id: Some(remote_id(record).unwrap_or_else(|| uid.clone())),
            title: payload::str_field(record, "title")
                .or_else(|| payload::str_field(record, "message"))
                .unwrap_or_else(|| uid.clone()),
            message: payload::str_field(record, "message"),
            severity: payload::str_field(record, "severity").unwrap_or_else(|| "info".to_string()),
            category: payload::str_field(record, "category"),
            source: payload::str_field(record, "source"),
            status: payload::str_field(record, "status")
                .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            is_active: true,
            acknowledged: payload::bool_field(record, "acknowledged").unwrap_or(false),
            resolved: payload::bool_field(record, "resolved").unwrap_or(false),
            device_uid: payload::str_field(record, "deviceUid"),
            device_name: payload::str_field(record, "deviceName"),
            site_uid: payload::str_field(record, "siteUid"),
            site_name: payload::str_field(record, "siteName"),
            acknowledged_at: payload::time_field(record, "acknowledgedAt"),
            resolved_at: payload::time_field(record, "resolvedAt"),
            metadata: Value::Object(record.clone()),
            uid,
        }
    }
}

/// Merged column values for an existing alert; absent payload fields keep
/// their persisted values
#[derive(Debug, Clone, Serialize)]
pub struct AlertUpdate {
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
    pub metadata: Value,
    pub last_sync: DateTime<Utc>,
}

impl AlertUpdate {
    pub fn merge(old: &Alert, record: &Payload, now: DateTime<Utc>) -> Self {
        Self {
            title: payload::str_field(record, "title").unwrap_or_else(|| old.title.clone()),
            message: payload::str_field(record, "message").or_else(|| old.message.clone()),
            severity: payload::str_field(record, "severity")
                .unwrap_or_else(|| old.severity.clone()),
            category: payload::str_field(record, "category").or_else(|| old.category.clone()),
            source: payload::str_field(record, "source").or_else(|| old.source.clone()),
            status: payload::str_field(record, "status").unwrap_or_else(|| old.status.clone()),
            is_active: true,
            acknowledged: payload::bool_field(record, "acknowledged").unwrap_or(old.acknowledged),
            resolved: payload::bool_field(record, "resolved").unwrap_or(old.resolved),
            device_uid: payload::str_field(record, "deviceUid").or_else(|| old.device_uid.clone()),
            device_name: payload::str_field(record, "deviceName")
                .or_else(|| old.device_name.clone()),
            site_uid: payload::str_field(record, "siteUid").or_else(|| old.site_uid.clone()),
            site_name: payload::str_field(record, "siteName").or_else(|| old.site_name.clone()),
            acknowledged_at: payload::time_field(record, "acknowledgedAt").or(old.acknowledged_at),
            resolved_at: payload::time_field(record, "resolvedAt").or(old.resolved_at),
            metadata: Value::Object(record.clone()),
            last_sync: now,
        }
    }

    pub fn from_row(old: &Alert) -> Self {
        Self {
            title: old.title.clone(),
            message: old.message.clone(),
            severity: old.severity.clone(),
            category: old.category.clone(),
            source: old.source.clone(),
            status: old.status.clone(),
            is_active: old.is_active,
            acknowledged: old.acknowledged,
            resolved: old.resolved,
            device_uid: old.device_uid.clone(),
            device_name: old.device_name.clone(),
            site_uid: old.site_uid.clone(),
            site_name: old.site_name.clone(),
            acknowledged_at: old.acknowledged_at,
            resolved_at: old.resolved_at,
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

    /// Which history action this update represents. Flag transitions win
    /// over a plain update; resolution outranks acknowledgement.
    pub fn history_action(&self, old: &Alert) -> HistoryAction {
        if self.resolved && !old.resolved {
            HistoryAction::Resolved
        } else if self.acknowledged && !old.acknowledged {
            HistoryAction::Acknowledged
        } else {
            HistoryAction::Updated
        }
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

    fn existing_alert() -> Alert {
        let now = Utc::now();
        Alert {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            uid: "a1".to_string(),
            remote_id: None,
            title: "Disk almost full".to_string(),
            message: Some("C: above 90%".to_string()),
            severity: "warning".to_string(),
            category: Some("storage".to_string()),
            source: None,
            status: "active".to_string(),
            is_active: true,
            acknowledged: false,
            resolved: false,
            device_uid: Some("d1".to_string()),
            device_name: Some("web-01".to_string()),
            site_uid: None,
            site_name: None,
            acknowledged_at: None,
            resolved_at: None,
            metadata: json!({}),
            last_sync: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_from_payload_title_falls_back_to_message() {
        let new = NewAlert::from_payload(
            Uuid::new_v4(),
            &record(json!({ "uid": "a2", "message": "CPU pegged", "severity": "critical" })),
        );

        assert_eq!(new.title, "CPU pegged");
        assert_eq!(new.status, "active");
        assert_eq!(new.severity, "critical");
    }

    #[test]
    fn test_history_action_prefers_resolution() {
        let old = existing_alert();

        let update = AlertUpdate::merge(
            &old,
            &record(json!({ "uid": "a1", "acknowledged": true, "resolved": true })),
            Utc::now(),
        );
        assert_eq!(update.history_action(&old), HistoryAction::Resolved);

        let update = AlertUpdate::merge(
            &old,
            &record(json!({ "uid": "a1", "acknowledged": true })),
            Utc::now(),
        );
        assert_eq!(update.history_action(&old), HistoryAction::Acknowledged);

        let update = AlertUpdate::merge(
            &old,
            &record(json!({ "uid": "a1", "message": "still broken" })),
            Utc::now(),
        );
        assert_eq!(update.history_action(&old), HistoryAction::Updated);
    }

    #[test]
    fn test_merge_retains_absent_fields() {
        let old = existing_alert();
        let update = AlertUpdate::merge(&old, &record(json!({ "uid": "a1" })), Utc::now());

        assert_eq!(update.title, "Disk almost full");
        assert_eq!(update.device_name.as_deref(), Some("web-01"));
        assert!(!update.acknowledged);
    }
}
