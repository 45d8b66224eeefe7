//! Pull request discovery via the GitHub search API.
//!
//! A merge commit carries no pointer back to its pull request, so the
//! commit hash goes through the issue search endpoint and the results are
//! filtered down to the pull request that belongs to the configured
//! repository.

use octocrab::Octocrab;
use thiserror::Error;
use tracing::{debug, info, info_span, Instrument};
use url::Url;

use crate::config::SyncConfig;

/// Errors that can occur while locating the pull request.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHub(#[from] octocrab::Error),
}

/// A pull request located for a commit.
#[derive(Debug, Clone)]
pub struct PullRequestRef {
    /// Repository owner.
    pub owner: String,

    /// Repository name.
    pub repo: String,

    /// Pull request number.
    pub number: u64,

    /// Canonical API resource URL.
    pub url: Url,
}

/// Finds the pull request that introduced `commit_hash`.
///
/// Issues one search query for issues referencing the hash and takes the
/// first result whose linked pull request belongs to the configured
/// repository. Commit hashes are not unique search keys across forks and
/// mirrors; the repository filter disambiguates. Ties are not otherwise
/// broken.
///
/// Returns `Ok(None)` when the search comes back empty or nothing matches
/// the repository.
///
/// # Errors
///
/// Returns [`DiscoveryError`] if the search call fails.
pub async fn find_pull_request(
    octocrab: &Octocrab,
    config: &SyncConfig,
) -> Result<Option<PullRequestRef>, DiscoveryError> {
    let span = info_span!(
        "find_pull_request",
        commit = %config.commit_hash,
        repo = %config.repo_full_name()
    );

    async {
        let query = build_search_query(&config.commit_hash);
        debug!(query = %query, "Searching issues");

        let page = octocrab
            .search()
            .issues_and_pull_requests(&query)
            .send()
            .await?;

        let located = page.items.iter().find_map(|issue| {
            let url = issue.pull_request.as_ref()?.url.clone();
            let number =
                match_pull_request_url(url.as_str(), &config.repo_owner, &config.repo_name)?;
            Some(PullRequestRef {
                owner: config.repo_owner.clone(),
                repo: config.repo_name.clone(),
                number,
                url,
            })
        });

        match &located {
            Some(pr) => info!(number = pr.number, "Pull request located"),
            None => info!("No pull request in this repository references the commit"),
        }

        Ok(located)
    }
    .instrument(span)
    .await
}

/// Builds the issue search query for a commit hash.
fn build_search_query(commit_hash: &str) -> String {
    format!("hash:{commit_hash}")
}

/// Checks that `url` is the canonical pull request URL for `owner/repo` and
/// extracts the pull request number.
fn match_pull_request_url(url: &str, owner: &str, repo: &str) -> Option<u64> {
    let expected_prefix = format!("https://api.github.com/repos/{owner}/{repo}/pulls/");
    let number = url.strip_prefix(&expected_prefix)?;
    number.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_hash_query() {
        assert_eq!(build_search_query("deadbeef"), "hash:deadbeef");
    }

    #[test]
    fn matches_pull_request_in_expected_repository() {
        let number = match_pull_request_url(
            "https://api.github.com/repos/acme/widget/pulls/42",
            "acme",
            "widget",
        );
        assert_eq!(number, Some(42));
    }

    #[test]
    fn rejects_pull_request_from_other_repository() {
        let number = match_pull_request_url(
            "https://api.github.com/repos/fork-owner/widget/pulls/42",
            "acme",
            "widget",
        );
        assert_eq!(number, None);
    }

    #[test]
    fn rejects_non_pull_request_urls() {
        let number = match_pull_request_url(
            "https://api.github.com/repos/acme/widget/issues/42",
            "acme",
            "widget",
        );
        assert_eq!(number, None);
    }

    #[test]
    fn rejects_urls_with_trailing_path() {
        let number = match_pull_request_url(
            "https://api.github.com/repos/acme/widget/pulls/42/comments",
            "acme",
            "widget",
        );
        assert_eq!(number, None);
    }
}
