//! Pull request description retrieval.

use octocrab::Octocrab;
use thiserror::Error;
use tracing::{debug, info_span, Instrument};

use crate::discovery::PullRequestRef;

/// Errors that can occur while reading the pull request.
#[derive(Debug, Error)]
pub enum PrError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHub(#[from] octocrab::Error),
}

/// Fetches the free-text description of a located pull request.
///
/// Returns `Ok(None)` when the pull request has no body. No caching, no
/// retry; network and auth failures propagate to the caller.
///
/// # Errors
///
/// Returns [`PrError`] if the read fails.
pub async fn fetch_description(
    octocrab: &Octocrab,
    pull_request: &PullRequestRef,
) -> Result<Option<String>, PrError> {
    let span = info_span!("fetch_description", pr = %pull_request.url);

    async {
        let pr = octocrab
            .pulls(&pull_request.owner, &pull_request.repo)
            .get(pull_request.number)
            .await?;

        let body = pr.body.filter(|text| !text.is_empty());
        debug!(has_body = body.is_some(), "Fetched pull request");
        Ok(body)
    }
    .instrument(span)
    .await
}
