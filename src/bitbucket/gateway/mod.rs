//! Gateways for talking to the Bitbucket Cloud REST API.
//!
//! The traits here cover the calls the pending review search and the comment
//! publisher depend on, so that their control flow can be tested against
//! mocks. [`BitbucketClient`] implements them over real HTTP and also carries
//! the one-request passthrough operations, grouped by resource kind.

mod branching_model;
mod client;
mod comments;
mod error_mapping;
mod pipelines;
mod pull_request;
mod repository;
mod types;

pub use client::BitbucketClient;
pub use types::{
    BranchingModelSettingsUpdate, DEFAULT_LIST_LIMIT, ListPipelinesParams,
    ListPullRequestsParams, ListRepositoriesParams, MergeOptions, NewComment, NewPullRequest,
    PipelineTarget, PipelineVariable, PullRequestEdit, PullRequestState,
};

use async_trait::async_trait;
use serde_json::Value;

use crate::bitbucket::error::BitbucketError;
use crate::bitbucket::locator::{PullRequestLocator, RepositoryLocator, Workspace};
use crate::bitbucket::models::CommentUpdate;

/// Gateway for workspace and repository listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryGateway: Send + Sync {
    /// List repositories in a workspace, in the order Bitbucket returns them.
    async fn list_repositories(
        &self,
        workspace: &Workspace,
        params: &ListRepositoriesParams,
    ) -> Result<Vec<Value>, BitbucketError>;

    /// List pull requests in a repository.
    async fn list_pull_requests(
        &self,
        repository: &RepositoryLocator,
        params: &ListPullRequestsParams,
    ) -> Result<Vec<Value>, BitbucketError>;
}

/// Gateway for pull request comments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentGateway: Send + Sync {
    /// Fetch the comments on a pull request (a single page).
    async fn list_comments(
        &self,
        pull_request: &PullRequestLocator,
    ) -> Result<Vec<Value>, BitbucketError>;

    /// Replace a comment with `update`, returning the updated record.
    async fn update_comment(
        &self,
        pull_request: &PullRequestLocator,
        comment_id: u64,
        update: &CommentUpdate,
    ) -> Result<Value, BitbucketError>;
}
