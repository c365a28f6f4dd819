// Field-level diff between two column-value maps

use serde_json::{json, Map, Value};

/// Compare two value maps and return the fields that changed.
///
/// Every key of `new` is checked against `old`; a key missing from `old`
/// counts as a change from null. Each entry holds the old and new values.
pub fn changed_fields(old: &Map<String, Value>, new: &Map<String, Value>) -> Map<String, Value> {
    let mut changes = Map::new();

    for (key, new_value) in new {
        let old_value = old.get(key).cloned().unwrap_or(Value::Null);
        if &old_value != new_value {
            changes.insert(key.clone(), json!({ "old": old_value, "new": new_value }));
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_unchanged_maps_produce_empty_diff() {
        let old = map(json!({ "name": "web-01", "status": "online" }));
        assert!(changed_fields(&old, &old.clone()).is_empty());
    }

    #[test]
    fn test_changed_value_is_recorded_with_both_sides() {
        let old = map(json!({ "status": "online" }));
        let new = map(json!({ "status": "offline" }));

        let changes = changed_fields(&old, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes["status"], json!({ "old": "online", "new": "offline" }));
    }

    #[test]
    fn test_newly_introduced_key_counts_as_change() {
        let old = map(json!({}));
        let new = map(json!({ "os": "Linux" }));

        let changes = changed_fields(&old, &new);
        assert_eq!(changes["os"], json!({ "old": null, "new": "Linux" }));
    }

    #[test]
    fn test_keys_removed_from_new_are_ignored() {
        // Only keys present in the new map are compared
        let old = map(json!({ "os": "Linux", "status": "online" }));
        let new = map(json!({ "status": "online" }));

        assert!(changed_fields(&old, &new).is_empty());
    }

    #[test]
    fn test_null_new_value_matches_missing_old_key() {
        let old = map(json!({}));
        let new = map(json!({ "os": null }));

        assert!(changed_fields(&old, &new).is_empty());
    }
}
