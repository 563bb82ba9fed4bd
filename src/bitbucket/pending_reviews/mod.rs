//! Cross-repository search for pull requests awaiting the caller's review.
//!
//! The search walks a workspace's repositories one at a time, collects open
//! pull requests on which the identity is an unapproved reviewer, and ranks
//! the combined result by last update. A repository whose query fails
//! contributes nothing; the failure is logged and recorded as telemetry, and
//! the walk continues.

use serde_json::Value;

use super::error::BitbucketError;
use super::gateway::{
    ListPullRequestsParams, ListRepositoriesParams, PullRequestState, RepositoryGateway,
};
use super::locator::{RepositoryLocator, RepositorySlug, ReviewerIdentity, Workspace};
use super::models::{PendingReview, PendingReviewReport, is_pending_review_for};
use crate::telemetry::{TelemetryEvent, TelemetrySink};

/// Result cap applied when the caller does not supply one.
pub const DEFAULT_PENDING_REVIEW_LIMIT: u32 = 50;

/// Page size used when discovering a workspace's repositories.
pub const REPOSITORY_DISCOVERY_LIMIT: u32 = 100;

/// Upper bound on pull requests requested from any single repository.
pub const MAX_PULL_REQUESTS_PER_REPOSITORY: u32 = 50;

/// Inputs for a pending review search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReviewQuery {
    /// Workspace to search.
    pub workspace: Workspace,
    /// Reviewer nickname to match.
    pub identity: ReviewerIdentity,
    /// Maximum number of matches returned; also the early-stop threshold.
    pub limit: u32,
    /// Repositories to search, in order; discovered from the workspace when
    /// `None`.
    pub repositories: Option<Vec<RepositorySlug>>,
}

impl PendingReviewQuery {
    /// Builds a query over every repository in `workspace` with the default
    /// limit.
    #[must_use]
    pub const fn new(workspace: Workspace, identity: ReviewerIdentity) -> Self {
        Self {
            workspace,
            identity,
            limit: DEFAULT_PENDING_REVIEW_LIMIT,
            repositories: None,
        }
    }
}

/// Runs pending review searches through a repository gateway.
pub struct PendingReviewSearch<'client, Gateway>
where
    Gateway: RepositoryGateway + ?Sized,
{
    client: &'client Gateway,
    telemetry: &'client dyn TelemetrySink,
}

impl<'client, Gateway> PendingReviewSearch<'client, Gateway>
where
    Gateway: RepositoryGateway + ?Sized,
{
    /// Create a search that reports skipped repositories to `telemetry`.
    #[must_use]
    pub const fn new(client: &'client Gateway, telemetry: &'client dyn TelemetrySink) -> Self {
        Self { client, telemetry }
    }

    /// Find pull requests awaiting `query.identity`'s review.
    ///
    /// Repositories are queried in order until the accumulated match count
    /// reaches the limit. Matches are then stably sorted by `updated_on`
    /// descending and truncated to the limit.
    ///
    /// # Errors
    ///
    /// Returns [`BitbucketError::InvalidInput`] when the limit is zero, and
    /// propagates failures from repository discovery. Failures of individual
    /// repository queries are never returned.
    pub async fn find(
        &self,
        query: &PendingReviewQuery,
    ) -> Result<PendingReviewReport, BitbucketError> {
        if query.limit == 0 {
            return Err(BitbucketError::invalid_input(
                "limit must be a positive integer",
            ));
        }
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        let repositories = self.resolve_repositories(query).await?;
        let params = ListPullRequestsParams {
            state: Some(PullRequestState::Open),
            limit: query.limit.min(MAX_PULL_REQUESTS_PER_REPOSITORY),
        };

        let mut matches: Vec<PendingReview> = Vec::new();
        let mut searched_repositories = 0_usize;

        for slug in repositories {
            if matches.len() >= limit {
                tracing::debug!(
                    workspace = %query.workspace,
                    found = matches.len(),
                    "limit reached; skipping remaining repositories"
                );
                break;
            }

            let locator = RepositoryLocator::new(query.workspace.clone(), slug);
            searched_repositories += 1;

            match self.client.list_pull_requests(&locator, &params).await {
                Ok(pull_requests) => matches.extend(
                    pull_requests
                        .iter()
                        .filter(|pull_request| is_pending_review_for(pull_request, &query.identity))
                        .map(|pull_request| PendingReview::new(pull_request, &locator)),
                ),
                Err(error) => self.record_skipped(&locator, &error),
            }
        }

        matches.sort_by(|left, right| right.updated_on().cmp(left.updated_on()));
        matches.truncate(limit);

        Ok(PendingReviewReport {
            total_found: matches.len(),
            pending_review_prs: matches,
            searched_repositories,
            user: query.identity.as_str().to_owned(),
            workspace: query.workspace.as_str().to_owned(),
        })
    }

    async fn resolve_repositories(
        &self,
        query: &PendingReviewQuery,
    ) -> Result<Vec<RepositorySlug>, BitbucketError> {
        if let Some(explicit) = &query.repositories {
            return Ok(explicit.clone());
        }

        let params = ListRepositoriesParams {
            limit: REPOSITORY_DISCOVERY_LIMIT,
            name: None,
        };
        let records = self
            .client
            .list_repositories(&query.workspace, &params)
            .await?;
        Ok(records.iter().filter_map(repository_slug).collect())
    }

    fn record_skipped(&self, locator: &RepositoryLocator, error: &BitbucketError) {
        let repository = locator.full_name();
        tracing::debug!(
            repository = %repository,
            kind = error.kind(),
            "skipping repository: {error}"
        );
        self.telemetry.record(TelemetryEvent::RepositoryQueryFailed {
            repository,
            kind: error.kind().to_owned(),
            message: error.to_string(),
        });
    }
}

/// Reads the slug of a discovered repository, falling back to its name.
fn repository_slug(record: &Value) -> Option<RepositorySlug> {
    ["slug", "name"]
        .iter()
        .filter_map(|key| record.get(key).and_then(Value::as_str))
        .find_map(|candidate| RepositorySlug::new(candidate).ok())
}

#[cfg(test)]
mod tests;
