//! Run report types.

use serde::Serialize;

use crate::config::PropertyKind;

/// Record of one completed sync run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// Notion page that was updated.
    pub page_id: String,

    /// Property that was written.
    pub property_name: String,

    /// Shape of the property.
    pub property_kind: PropertyKind,

    /// Value appended to the property.
    pub written_value: String,

    /// Canonical URL of the pull request the page was traced from.
    pub pull_request_url: String,

    /// Whether the Notion write was skipped.
    pub dry_run: bool,
}
