//! Run configuration loaded from the execution environment.
//!
//! Parameters come from one of two ambient sources: the GitHub Actions
//! input environment (production) or plain environment variables (local
//! runs). The environment is read here once at startup; everything
//! downstream receives the resulting [`SyncConfig`] by parameter.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while assembling the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is absent or empty.
    #[error("Missing required input '{name}'")]
    MissingInput { name: String },

    /// GITHUB_REPOSITORY did not contain an `owner/repo` pair.
    #[error("GITHUB_REPOSITORY must be 'owner/repo', got '{value}'")]
    MalformedRepository { value: String },

    /// The configured Notion property type is not supported.
    #[error(
        "Notion property type '{value}' is not supported (expected 'rich_text' or 'multi_select')"
    )]
    UnsupportedPropertyKind { value: String },
}

/// Where the configuration is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// GitHub Actions context: `GITHUB_SHA`, `GITHUB_REPOSITORY` and the
    /// `INPUT_*` variables populated from `action.yml` inputs.
    Actions,

    /// Plain environment variables, for runs outside the Actions runner.
    Local,
}

/// The two Notion property shapes this action can update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// A single text blob, stored as a list of rich-text fragments.
    #[default]
    RichText,

    /// A list of named tags.
    MultiSelect,
}

impl PropertyKind {
    /// Wire name of the property type in the Notion API.
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::RichText => "rich_text",
            PropertyKind::MultiSelect => "multi_select",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rich_text" => Ok(PropertyKind::RichText),
            "multi_select" => Ok(PropertyKind::MultiSelect),
            _ => Err(ConfigError::UnsupportedPropertyKind {
                value: s.to_string(),
            }),
        }
    }
}

/// Parameters for one sync run, assembled once at startup.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Commit hash to look up.
    pub commit_hash: String,

    /// Owner of the repository the pull request must belong to.
    pub repo_owner: String,

    /// Name of the repository the pull request must belong to.
    pub repo_name: String,

    /// GitHub username for Basic auth.
    pub gh_username: String,

    /// GitHub access token paired with the username.
    pub gh_token: String,

    /// Notion integration API key.
    pub notion_key: String,

    /// Name of the page property to update.
    pub property_name: String,

    /// Shape of the page property.
    pub property_kind: PropertyKind,

    /// Value appended to the property.
    pub update_value: String,
}

impl SyncConfig {
    /// Loads the configuration from the source selected by `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing, the
    /// repository coordinate is malformed, or the property type is not
    /// supported. All of these fail the run before any network call.
    pub fn load(mode: RunMode) -> Result<Self, ConfigError> {
        match mode {
            RunMode::Actions => Self::from_actions_env(),
            RunMode::Local => Self::from_local_env(),
        }
    }

    fn from_actions_env() -> Result<Self, ConfigError> {
        let repository = required("GITHUB_REPOSITORY")?;
        let (repo_owner, repo_name) = split_repository(&repository)?;

        Ok(Self {
            commit_hash: required("GITHUB_SHA")?,
            repo_owner,
            repo_name,
            gh_username: required("INPUT_GH_USERNAME")?,
            gh_token: required("INPUT_GH_TOKEN")?,
            notion_key: required("INPUT_NOTION_KEY")?,
            property_name: required("INPUT_NOTION_PROPERTY_NAME")?,
            property_kind: property_kind(optional("INPUT_NOTION_PROPERTY_TYPE"))?,
            update_value: required("INPUT_NOTION_UPDATE_VALUE")?,
        })
    }

    fn from_local_env() -> Result<Self, ConfigError> {
        Ok(Self {
            commit_hash: required("COMMIT_HASH")?,
            repo_owner: required("REPO_OWNER")?,
            repo_name: required("REPO_NAME")?,
            gh_username: required("GH_USERNAME")?,
            gh_token: required("GH_ACCESS_TOKEN")?,
            notion_key: required("NOTION_KEY")?,
            property_name: required("NOTION_PROPERTY_NAME")?,
            property_kind: property_kind(optional("NOTION_PROPERTY_TYPE"))?,
            update_value: required("NOTION_UPDATE_VALUE")?,
        })
    }

    /// Full repository name in "owner/name" format.
    pub fn repo_full_name(&self) -> String {
        format!("{}/{}", self.repo_owner, self.repo_name)
    }
}

/// Reads a variable, treating absent and empty values alike.
fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required(name: &str) -> Result<String, ConfigError> {
    optional(name).ok_or_else(|| ConfigError::MissingInput {
        name: name.to_string(),
    })
}

fn property_kind(value: Option<String>) -> Result<PropertyKind, ConfigError> {
    match value {
        Some(raw) => raw.parse(),
        None => {
            debug!("No property type configured, defaulting to rich_text");
            Ok(PropertyKind::default())
        }
    }
}

fn split_repository(repository: &str) -> Result<(String, String), ConfigError> {
    match repository.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner.to_string(), name.to_string()))
        }
        _ => Err(ConfigError::MalformedRepository {
            value: repository.to_string(),
        }),
    }
}
