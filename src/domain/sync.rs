// Sync vocabulary shared by the engine, the store, and the API

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which entity type a sync run covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncType {
    Devices,
    Sites,
    Alerts,
    Full,
}

impl SyncType {
    pub fn as_str(&self) -> &str {
        match self {
            SyncType::Devices => "devices",
            SyncType::Sites => "sites",
            SyncType::Alerts => "alerts",
            SyncType::Full => "full",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "devices" => Some(SyncType::Devices),
            "sites" => Some(SyncType::Sites),
            "alerts" => Some(SyncType::Alerts),
            "full" => Some(SyncType::Full),
            _ => None,
        }
    }
}

/// Outcome status of a sync run row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncRunStatus {
    Running,
    Success,
    Error,
    Partial,
}

impl SyncRunStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SyncRunStatus::Running => "running",
            SyncRunStatus::Success => "success",
            SyncRunStatus::Error => "error",
            SyncRunStatus::Partial => "partial",
        }
    }
}

/// Action recorded in a history row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Created,
    Updated,
    Acknowledged,
    Resolved,
    Deactivated,
}

impl HistoryAction {
    pub fn as_str(&self) -> &str {
        match self {
            HistoryAction::Created => "created",
            HistoryAction::Updated => "updated",
            HistoryAction::Acknowledged => "acknowledged",
            HistoryAction::Resolved => "resolved",
            HistoryAction::Deactivated => "deactivated",
        }
    }
}

/// Counters returned by one entity-type reconciliation pass.
///
/// `updated` counts every matched remote record, changed or not; `total` is
/// the remote snapshot size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCounts {
    pub created: i32,
    pub updated: i32,
    pub deactivated: i32,
    pub total: i32,
}

/// Result of a full (sites, devices, alerts) sync for one tenant
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FullSyncReport {
    pub sites: SyncCounts,
    pub devices: SyncCounts,
    pub alerts: SyncCounts,
}

impl FullSyncReport {
    /// Aggregate counters across the three passes
    pub fn totals(&self) -> SyncCounts {
        SyncCounts {
            created: self.sites.created + self.devices.created + self.alerts.created,
            updated: self.sites.updated + self.devices.updated + self.alerts.updated,
            deactivated: self.sites.deactivated
                + self.devices.deactivated
                + self.alerts.deactivated,
            total: self.sites.total + self.devices.total + self.alerts.total,
        }
    }
}

/// Values for one append-only history row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    pub tenant_id: Uuid,
    pub entity_uid: String,
    pub action: HistoryAction,
    pub old_status: Option<String>,
    pub new_status: Option<String>,
    pub old_data: Option<serde_json::Value>,
    pub new_data: Option<serde_json::Value>,
    pub changed_fields: Option<serde_json::Value>,
}

/// Final state written to a sync run row, exactly once
#[derive(Debug, Clone)]
pub struct SyncRunFinish {
    pub status: SyncRunStatus,
    pub counts: SyncCounts,
    pub error_message: Option<String>,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    pub duration_ms: i64,
}

/// Per-tenant outcome of a batch sync; one tenant's failure never aborts
/// the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantSyncOutcome {
    pub tenant_id: Uuid,
    pub tenant_name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<FullSyncReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_type_round_trip() {
        for s in ["devices", "sites", "alerts", "full"] {
            assert_eq!(SyncType::from_str(s).unwrap().as_str(), s);
        }
        assert!(SyncType::from_str("users").is_none());
    }

    #[test]
    fn test_full_report_totals() {
        let report = FullSyncReport {
            sites: SyncCounts {
                created: 1,
                updated: 2,
                deactivated: 0,
                total: 3,
            },
            devices: SyncCounts {
                created: 4,
                updated: 0,
                deactivated: 1,
                total: 5,
            },
            alerts: SyncCounts::default(),
        };

        let totals = report.totals();
        assert_eq!(totals.created, 5);
        assert_eq!(totals.updated, 2);
        assert_eq!(totals.deactivated, 1);
        assert_eq!(totals.total, 8);
    }
}
