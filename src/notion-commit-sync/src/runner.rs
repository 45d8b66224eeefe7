//! Orchestrates one commit-to-Notion sync run.

use std::future::Future;
use std::time::Duration;

use octocrab::Octocrab;
use tokio::time::timeout;
use tracing::info;

use crate::config::SyncConfig;
use crate::discovery::{find_pull_request, DiscoveryError};
use crate::notion::{extract_first_page_id, merged_property_value, NotionClient, NotionError};
use crate::pull_requests::{fetch_description, PrError};
use crate::summary::SyncReport;

/// Default bound on each outbound network call.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for one sync run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Parameters loaded from the environment.
    sync: SyncConfig,
    /// Whether to preview the Notion update without writing.
    dry_run: bool,
    /// Bound on each outbound network call.
    timeout: Duration,
}

impl RunnerConfig {
    /// Creates a run configuration with the default timeout.
    pub fn new(sync: SyncConfig, dry_run: bool) -> Self {
        Self {
            sync,
            dry_run,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Sets a custom per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the sync parameters.
    pub fn sync(&self) -> &SyncConfig {
        &self.sync
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns the per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Errors that can fail a sync run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// GitHub client initialization error.
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),

    /// Pull request lookup error.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// Pull request read error.
    #[error(transparent)]
    Pr(#[from] PrError),

    /// Notion API error.
    #[error(transparent)]
    Notion(#[from] NotionError),

    /// No pull request in the repository references the commit.
    #[error("No pull request found for commit {commit}. The commit may not come from a merged pull request.")]
    PullRequestNotFound { commit: String },

    /// The pull request description carries no Notion URL.
    #[error("No Notion URL found in the pull request description")]
    PageUrlNotFound,

    /// A network call exceeded the configured bound.
    #[error("Stage '{stage}' timed out after {secs}s")]
    StageTimeout { stage: &'static str, secs: u64 },
}

/// Executes the sync pipeline: locate the pull request, read its
/// description, extract the Notion page id, update the page property.
///
/// Strictly sequential, one call in flight at a time; the run aborts on the
/// first fatal condition, so no later stage ever sees the output of a
/// failed earlier one.
pub struct Runner {
    config: RunnerConfig,
    octocrab: Octocrab,
    notion: NotionClient,
}

impl Runner {
    /// Builds a runner from the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if either API client cannot be constructed.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        let sync = config.sync();
        let octocrab = Octocrab::builder()
            .basic_auth(sync.gh_username.clone(), sync.gh_token.clone())
            .build()?;
        let notion = NotionClient::new(sync.notion_key.clone(), config.timeout())?;
        Ok(Self {
            config,
            octocrab,
            notion,
        })
    }

    /// Runs the pipeline and reports what was written.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] on the first failed stage; subsequent stages
    /// do not execute.
    pub async fn run(&self) -> Result<SyncReport, RunnerError> {
        let sync = self.config.sync();

        let pull_request = self
            .bounded("find_pull_request", find_pull_request(&self.octocrab, sync))
            .await??
            .ok_or_else(|| RunnerError::PullRequestNotFound {
                commit: sync.commit_hash.clone(),
            })?;

        let description = self
            .bounded(
                "fetch_description",
                fetch_description(&self.octocrab, &pull_request),
            )
            .await??
            .unwrap_or_default();

        let page_id = extract_first_page_id(&description).ok_or(RunnerError::PageUrlNotFound)?;
        info!(page_id = %page_id, "Pull request references a Notion page");

        // Fetch the current value immediately before composing the payload;
        // the write then replaces the property wholesale. The pages API has
        // no compare-and-swap, so concurrent runs against one page can lose
        // an update.
        let page = self
            .bounded("retrieve_page", self.notion.retrieve_page(&page_id))
            .await??;
        let merged = merged_property_value(
            sync.property_kind,
            &sync.property_name,
            &page,
            &sync.update_value,
        )?;

        if self.config.dry_run() {
            info!(
                page_id = %page_id,
                property = %sync.property_name,
                payload = %merged,
                "[DRY RUN] Would update Notion page"
            );
        } else {
            self.bounded(
                "update_page",
                self.notion
                    .update_page_property(&page_id, &sync.property_name, merged),
            )
            .await??;
            info!(
                page_id = %page_id,
                property = %sync.property_name,
                value = %sync.update_value,
                "Updated Notion page"
            );
        }

        Ok(SyncReport {
            page_id,
            property_name: sync.property_name.clone(),
            property_kind: sync.property_kind,
            written_value: sync.update_value.clone(),
            pull_request_url: pull_request.url.to_string(),
            dry_run: self.config.dry_run(),
        })
    }

    /// Wraps a stage future in the configured timeout.
    async fn bounded<F, T>(&self, stage: &'static str, fut: F) -> Result<T, RunnerError>
    where
        F: Future<Output = T>,
    {
        timeout(self.config.timeout(), fut)
            .await
            .map_err(|_| RunnerError::StageTimeout {
                stage,
                secs: self.config.timeout().as_secs(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PropertyKind;

    fn sample_sync_config() -> SyncConfig {
        SyncConfig {
            commit_hash: "deadbeef".to_string(),
            repo_owner: "acme".to_string(),
            repo_name: "widget".to_string(),
            gh_username: "release-bot".to_string(),
            gh_token: "gh-token".to_string(),
            notion_key: "notion-secret".to_string(),
            property_name: "Status".to_string(),
            property_kind: PropertyKind::RichText,
            update_value: "done".to_string(),
        }
    }

    #[test]
    fn config_defaults_and_overrides() {
        let config = RunnerConfig::new(sample_sync_config(), false);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(!config.dry_run());

        let config = config.with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn bounded_converts_elapsed_to_stage_timeout() {
        let config =
            RunnerConfig::new(sample_sync_config(), true).with_timeout(Duration::from_millis(10));
        let runner = Runner::new(config).unwrap();

        let result: Result<(), RunnerError> = runner
            .bounded("stall", async {
                tokio::time::sleep(Duration::from_secs(60)).await;
            })
            .await;

        assert!(matches!(
            result,
            Err(RunnerError::StageTimeout { stage: "stall", .. })
        ));
    }
}
