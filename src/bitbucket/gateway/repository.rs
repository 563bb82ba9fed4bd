//! Repository listing and lookup.

use async_trait::async_trait;
use serde_json::Value;

use crate::bitbucket::error::BitbucketError;
use crate::bitbucket::locator::{RepositoryLocator, Workspace};

use super::{BitbucketClient, ListPullRequestsParams, ListRepositoriesParams, RepositoryGateway};

impl BitbucketClient {
    /// Fetch a single repository.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn repository(&self, repository: &RepositoryLocator) -> Result<Value, BitbucketError> {
        self.get_json("get repository", &repository.segments(), &[])
            .await
    }
}

#[async_trait]
impl RepositoryGateway for BitbucketClient {
    async fn list_repositories(
        &self,
        workspace: &Workspace,
        params: &ListRepositoriesParams,
    ) -> Result<Vec<Value>, BitbucketError> {
        self.get_values(
            "list repositories",
            &["repositories", workspace.as_str()],
            &params.query(),
        )
        .await
    }

    async fn list_pull_requests(
        &self,
        repository: &RepositoryLocator,
        params: &ListPullRequestsParams,
    ) -> Result<Vec<Value>, BitbucketError> {
        let mut segments = repository.segments();
        segments.push("pullrequests");
        self.get_values("list pull requests", &segments, &params.query())
            .await
    }
}
