//! Notion API client and page property updates.
//!
//! The update is a read-modify-write: the page's current property value is
//! fetched immediately before the merged payload is composed, and the write
//! replaces the property wholesale. The pages API has no compare-and-swap
//! primitive, so two concurrent runs against the same page can lose one
//! update. Known limitation, acceptable while each merged commit triggers
//! exactly one run.

mod page_id;
mod properties;

pub use page_id::extract_first_page_id;
pub use properties::{merged_property_value, Page, PropertyValue, RichTextFragment, SelectOption};

use std::time::Duration;

use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, info_span, Instrument};

/// Notion REST API root.
const NOTION_API_BASE: &str = "https://api.notion.com/v1";

/// Versioned API contract; property value shapes depend on it.
const NOTION_VERSION: &str = "2022-06-28";

/// Errors from Notion API operations.
#[derive(Debug, Error)]
pub enum NotionError {
    /// Transport-level failure.
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the API.
    #[error("Notion API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The page has no property with the configured name.
    #[error("Page has no property named '{name}'")]
    PropertyMissing { name: String },

    /// The property exists but not under the configured kind.
    #[error("Property '{name}' is not of type '{expected}'")]
    PropertyKindMismatch { name: String, expected: &'static str },
}

/// Minimal Notion client: page reads and property writes.
pub struct NotionClient {
    http: reqwest::Client,
    api_key: String,
}

impl NotionClient {
    /// Builds a client with a bounded per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`NotionError::Http`] if the underlying client cannot be
    /// constructed.
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, NotionError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, api_key })
    }

    /// Retrieves a page's current property map.
    ///
    /// # Errors
    ///
    /// [`NotionError::Api`] carries the status and body of a non-success
    /// response (not found, auth failure, rate limit).
    pub async fn retrieve_page(&self, page_id: &str) -> Result<Page, NotionError> {
        let span = info_span!("retrieve_page", page_id);

        async {
            let response = self
                .http
                .get(format!("{NOTION_API_BASE}/pages/{page_id}"))
                .bearer_auth(&self.api_key)
                .header("Notion-Version", NOTION_VERSION)
                .send()
                .await?;

            let page: Page = read_json(response).await?;
            debug!(properties = page.properties.len(), "Retrieved page");
            Ok(page)
        }
        .instrument(span)
        .await
    }

    /// Replaces one property's value on a page.
    ///
    /// Full-field replacement; the caller is expected to have merged the
    /// current content into `value` via [`merged_property_value`].
    ///
    /// # Errors
    ///
    /// [`NotionError::Api`] on any non-success response.
    pub async fn update_page_property(
        &self,
        page_id: &str,
        property_name: &str,
        value: serde_json::Value,
    ) -> Result<(), NotionError> {
        let span = info_span!("update_page", page_id, property = property_name);

        async {
            let body = json!({ "properties": { property_name: value } });
            let response = self
                .http
                .patch(format!("{NOTION_API_BASE}/pages/{page_id}"))
                .bearer_auth(&self.api_key)
                .header("Notion-Version", NOTION_VERSION)
                .json(&body)
                .send()
                .await?;

            ensure_success(response).await?;
            info!("Page property updated");
            Ok(())
        }
        .instrument(span)
        .await
    }
}

/// Converts a non-success response into [`NotionError::Api`] with the body
/// text as the message.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, NotionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(NotionError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, NotionError> {
    let response = ensure_success(response).await?;
    Ok(response.json().await?)
}
