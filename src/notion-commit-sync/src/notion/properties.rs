//! Notion page property values and the read-modify-write merge.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::NotionError;
use crate::config::PropertyKind;

/// A Notion page: its identifier and current property map.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    /// Page identifier as reported by the API.
    pub id: String,

    /// Current property values, keyed by property name.
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

/// One property value, shaped per its declared type.
///
/// Only the two kinds this action can update are modeled; every other
/// property kind deserializes to [`PropertyValue::Other`].
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    /// A list of rich-text fragments.
    RichText {
        rich_text: Vec<RichTextFragment>,
    },

    /// A list of named tags.
    MultiSelect {
        multi_select: Vec<SelectOption>,
    },

    /// Any property kind this action does not update.
    #[serde(other)]
    Other,
}

/// One rich-text fragment. Only the rendered text matters for the merge.
#[derive(Debug, Clone, Deserialize)]
pub struct RichTextFragment {
    /// Rendered plain text of the fragment.
    #[serde(default)]
    pub plain_text: String,
}

/// One multi-select tag. `id` and `color` ride along untouched so the
/// write-back preserves what the API returned for existing tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl SelectOption {
    /// A new tag carrying just a name; Notion assigns id and color.
    pub fn named(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            color: None,
        }
    }
}

/// Computes the value written back to the page: the configured property's
/// current content with `new_value` appended.
///
/// Rich-text fragments collapse into one comma-joined fragment; multi-select
/// keeps the existing tags and gains one more. The result replaces the
/// property wholesale.
///
/// # Errors
///
/// [`NotionError::PropertyMissing`] when the page has no property with that
/// name, [`NotionError::PropertyKindMismatch`] when it exists under another
/// kind than the configured one.
pub fn merged_property_value(
    kind: PropertyKind,
    property_name: &str,
    page: &Page,
    new_value: &str,
) -> Result<Value, NotionError> {
    let current = page
        .properties
        .get(property_name)
        .ok_or_else(|| NotionError::PropertyMissing {
            name: property_name.to_string(),
        })?;

    match (kind, current) {
        (PropertyKind::RichText, PropertyValue::RichText { rich_text }) => {
            let mut fragments: Vec<&str> =
                rich_text.iter().map(|f| f.plain_text.as_str()).collect();
            fragments.push(new_value);
            let joined = fragments.join(",");
            Ok(json!({
                "rich_text": [{ "type": "text", "text": { "content": joined } }]
            }))
        }
        (PropertyKind::MultiSelect, PropertyValue::MultiSelect { multi_select }) => {
            let mut options = multi_select.clone();
            options.push(SelectOption::named(new_value));
            Ok(json!({ "multi_select": options }))
        }
        _ => Err(NotionError::PropertyKindMismatch {
            name: property_name.to_string(),
            expected: kind.as_str(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with(property_name: &str, value: Value) -> Page {
        serde_json::from_value(json!({
            "object": "page",
            "id": "abc123",
            "properties": { property_name: value }
        }))
        .unwrap()
    }

    #[test]
    fn rich_text_merge_joins_with_commas() {
        let page = page_with(
            "Status",
            json!({
                "id": "a%3Fb",
                "type": "rich_text",
                "rich_text": [
                    { "type": "text", "plain_text": "a" },
                    { "type": "text", "plain_text": "b" }
                ]
            }),
        );

        let merged = merged_property_value(PropertyKind::RichText, "Status", &page, "c").unwrap();

        assert_eq!(
            merged,
            json!({
                "rich_text": [{ "type": "text", "text": { "content": "a,b,c" } }]
            })
        );
    }

    #[test]
    fn rich_text_merge_on_empty_field_writes_value_alone() {
        let page = page_with(
            "Status",
            json!({ "type": "rich_text", "rich_text": [] }),
        );

        let merged =
            merged_property_value(PropertyKind::RichText, "Status", &page, "done").unwrap();

        assert_eq!(
            merged,
            json!({
                "rich_text": [{ "type": "text", "text": { "content": "done" } }]
            })
        );
    }

    #[test]
    fn multi_select_merge_appends_a_tag() {
        let page = page_with(
            "Tags",
            json!({
                "type": "multi_select",
                "multi_select": [{ "name": "x" }]
            }),
        );

        let merged = merged_property_value(PropertyKind::MultiSelect, "Tags", &page, "y").unwrap();

        assert_eq!(
            merged,
            json!({ "multi_select": [{ "name": "x" }, { "name": "y" }] })
        );
    }

    #[test]
    fn multi_select_merge_preserves_existing_tag_metadata() {
        let page = page_with(
            "Tags",
            json!({
                "type": "multi_select",
                "multi_select": [{ "id": "t1", "name": "x", "color": "blue" }]
            }),
        );

        let merged = merged_property_value(PropertyKind::MultiSelect, "Tags", &page, "y").unwrap();

        assert_eq!(
            merged,
            json!({
                "multi_select": [
                    { "id": "t1", "name": "x", "color": "blue" },
                    { "name": "y" }
                ]
            })
        );
    }

    #[test]
    fn missing_property_is_an_error() {
        let page = page_with(
            "Status",
            json!({ "type": "rich_text", "rich_text": [] }),
        );

        let result = merged_property_value(PropertyKind::RichText, "Sprint", &page, "done");
        assert!(matches!(result, Err(NotionError::PropertyMissing { .. })));
    }

    #[test]
    fn kind_mismatch_is_an_error() {
        let page = page_with(
            "Status",
            json!({ "type": "rich_text", "rich_text": [] }),
        );

        let result = merged_property_value(PropertyKind::MultiSelect, "Status", &page, "done");
        assert!(matches!(
            result,
            Err(NotionError::PropertyKindMismatch { .. })
        ));
    }

    #[test]
    fn unrelated_property_kinds_deserialize_as_other() {
        let page = page_with(
            "Done",
            json!({ "type": "checkbox", "checkbox": true }),
        );

        assert!(matches!(
            page.properties.get("Done"),
            Some(PropertyValue::Other)
        ));
    }
}
