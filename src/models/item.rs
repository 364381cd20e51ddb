use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Core item entity. Timestamps are ISO-8601 UTC strings so list ordering
/// is a plain lexicographic comparison and records missing the attribute
/// still load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

fn default_status() -> String {
    "active".to_string()
}

/// Current UTC instant as an ISO-8601 string (microsecond precision).
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn new_item_id() -> String {
    Uuid::new_v4().to_string()
}

impl Item {
    /// Build a fresh record; created_at and updated_at start identical.
    pub fn create(id: String, name: String, description: String, status: String) -> Self {
        let now = now_iso();
        Self {
            id,
            name,
            description,
            status,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn from_attrs(attrs: &HashMap<String, AttributeValue>) -> Self {
        let status = string_attr(attrs, "status");
        Self {
            id: string_attr(attrs, "id"),
            name: string_attr(attrs, "name"),
            description: string_attr(attrs, "description"),
            status: if status.is_empty() { default_status() } else { status },
            created_at: string_attr(attrs, "created_at"),
            updated_at: string_attr(attrs, "updated_at"),
        }
    }

    pub fn to_attrs(&self) -> HashMap<String, AttributeValue> {
        HashMap::from([
            ("id".to_string(), AttributeValue::S(self.id.clone())),
            ("name".to_string(), AttributeValue::S(self.name.clone())),
            (
                "description".to_string(),
                AttributeValue::S(self.description.clone()),
            ),
            ("status".to_string(), AttributeValue::S(self.status.clone())),
            (
                "created_at".to_string(),
                AttributeValue::S(self.created_at.clone()),
            ),
            (
                "updated_at".to_string(),
                AttributeValue::S(self.updated_at.clone()),
            ),
        ])
    }
}

fn string_attr(attrs: &HashMap<String, AttributeValue>, key: &str) -> String {
    attrs
        .get(key)
        .and_then(|av| av.as_s().ok())
        .cloned()
        .unwrap_or_default()
}

/// Newest first by created_at. Reverse lexicographic puts blank
/// timestamps last; the sort is stable so ties keep scan order.
pub fn sort_newest_first(items: &mut [Item]) {
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

// ── Request payloads ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateItem {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateItem {
    pub name: Option<String>,
    /// Present-vs-absent matters here: an explicit `null` or `""` clears
    /// the field, an omitted key leaves it untouched.
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub status: Option<String>,
}

fn double_option<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(de).map(Some)
}

impl UpdateItem {
    pub fn into_patch(self) -> ItemPatch {
        ItemPatch {
            name: self.name.filter(|s| !s.is_empty()),
            description: self.description.map(|d| d.unwrap_or_default()),
            status: self.status.filter(|s| !s.is_empty()),
        }
    }
}

/// HTML form body, shared by the create and edit forms. Browsers submit
/// every rendered field, so a present-but-blank description is
/// distinguishable from a form without the field.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ItemForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

impl ItemForm {
    pub fn into_patch(self) -> ItemPatch {
        ItemPatch {
            name: self.name.filter(|s| !s.is_empty()),
            description: self.description,
            status: self.status.filter(|s| !s.is_empty()),
        }
    }
}

// ── Change-set ───────────────────────────────────────────────────────────────

/// Partial-update change-set: `Some(value)` assigns, `None` leaves the
/// stored field untouched. Consumed by the store's single update routine.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

impl ItemPatch {
    /// Present fields as (attribute, new value) pairs, in declaration order.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = Vec::new();
        if let Some(name) = &self.name {
            fields.push(("name", name.as_str()));
        }
        if let Some(description) = &self.description {
            fields.push(("description", description.as_str()));
        }
        if let Some(status) = &self.status {
            fields.push(("status", status.as_str()));
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.status.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs_of(item: &Item) -> HashMap<String, AttributeValue> {
        item.to_attrs()
    }

    // ── Entity ─────────────────────────────────────────────────────────────

    #[test]
    fn create_sets_identical_timestamps() {
        let item = Item::create(
            new_item_id(),
            "Widget".into(),
            String::new(),
            "active".into(),
        );
        assert_eq!(item.created_at, item.updated_at);
        assert!(!item.created_at.is_empty());
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(new_item_id(), new_item_id());
    }

    #[test]
    fn attr_map_round_trip() {
        let item = Item::create(
            "abc-123".into(),
            "Widget".into(),
            "A widget".into(),
            "inactive".into(),
        );
        assert_eq!(Item::from_attrs(&attrs_of(&item)), item);
    }

    #[test]
    fn from_attrs_fills_defaults() {
        let attrs = HashMap::from([("id".to_string(), AttributeValue::S("x".into()))]);
        let item = Item::from_attrs(&attrs);
        assert_eq!(item.id, "x");
        assert_eq!(item.name, "");
        assert_eq!(item.description, "");
        assert_eq!(item.status, "active");
        assert_eq!(item.created_at, "");
    }

    #[test]
    fn now_iso_is_lexicographically_monotone() {
        let a = now_iso();
        let b = now_iso();
        assert!(a <= b);
        assert!(a.ends_with('Z'));
    }

    // ── Sorting ────────────────────────────────────────────────────────────

    #[test]
    fn sort_is_newest_first_with_blanks_last() {
        let stamped = |id: &str, ts: &str| Item {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            status: "active".into(),
            created_at: ts.into(),
            updated_at: ts.into(),
        };
        let mut items = vec![
            stamped("old", "2024-01-01T00:00:00.000000Z"),
            stamped("legacy", ""),
            stamped("new", "2025-06-01T00:00:00.000000Z"),
            stamped("mid", "2024-06-01T00:00:00.000000Z"),
        ];
        sort_newest_first(&mut items);
        let order: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(order, vec!["new", "mid", "old", "legacy"]);
    }

    // ── API payload semantics ──────────────────────────────────────────────

    #[test]
    fn update_description_omitted_is_untouched() {
        let payload: UpdateItem = serde_json::from_str(r#"{"name":"N"}"#).unwrap();
        let patch = payload.into_patch();
        assert_eq!(patch.name.as_deref(), Some("N"));
        assert_eq!(patch.description, None);
    }

    #[test]
    fn update_description_empty_string_clears() {
        let payload: UpdateItem = serde_json::from_str(r#"{"description":""}"#).unwrap();
        let patch = payload.into_patch();
        assert_eq!(patch.description.as_deref(), Some(""));
    }

    #[test]
    fn update_description_null_clears() {
        let payload: UpdateItem = serde_json::from_str(r#"{"description":null}"#).unwrap();
        let patch = payload.into_patch();
        assert_eq!(patch.description.as_deref(), Some(""));
    }

    #[test]
    fn update_blank_name_and_status_are_ignored() {
        let payload: UpdateItem =
            serde_json::from_str(r#"{"name":"","status":""}"#).unwrap();
        let patch = payload.into_patch();
        assert!(patch.is_empty());
    }

    // ── Form payload semantics ─────────────────────────────────────────────

    #[test]
    fn form_blank_description_still_updates() {
        let form = ItemForm {
            name: Some(String::new()),
            description: Some(String::new()),
            status: Some(String::new()),
        };
        let patch = form.into_patch();
        assert_eq!(patch.name, None);
        assert_eq!(patch.description.as_deref(), Some(""));
        assert_eq!(patch.status, None);
    }

    #[test]
    fn form_missing_description_is_untouched() {
        let form = ItemForm {
            name: Some("N".into()),
            description: None,
            status: Some("inactive".into()),
        };
        let patch = form.into_patch();
        assert_eq!(patch.description, None);
        assert_eq!(patch.status.as_deref(), Some("inactive"));
    }

    // ── Change-set ─────────────────────────────────────────────────────────

    #[test]
    fn patch_fields_in_declaration_order() {
        let patch = ItemPatch {
            name: Some("N".into()),
            description: Some(String::new()),
            status: Some("active".into()),
        };
        let fields: Vec<&str> = patch.fields().iter().map(|(k, _)| *k).collect();
        assert_eq!(fields, vec!["name", "description", "status"]);
    }

    #[test]
    fn empty_patch_has_no_fields() {
        let patch = ItemPatch::default();
        assert!(patch.is_empty());
        assert!(patch.fields().is_empty());
    }
}
