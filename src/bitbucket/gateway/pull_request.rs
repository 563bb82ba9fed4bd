//! Pull request passthrough operations.

use reqwest::Method;
use serde_json::{Value, json};

use crate::bitbucket::error::BitbucketError;
use crate::bitbucket::locator::{PullRequestLocator, RepositoryLocator};

use super::types::ApiNewPullRequest;
use super::{BitbucketClient, MergeOptions, NewPullRequest, PullRequestEdit};

fn sub_resource<'a>(pull_request: &'a PullRequestLocator, leaf: &'a str) -> Vec<&'a str> {
    let mut segments = pull_request.segments();
    segments.push(leaf);
    segments
}

impl BitbucketClient {
    /// Open a pull request (set `draft` to open it as a draft).
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn create_pull_request(
        &self,
        repository: &RepositoryLocator,
        request: &NewPullRequest,
    ) -> Result<Value, BitbucketError> {
        let mut segments = repository.segments();
        segments.push("pullrequests");
        self.send_json(
            "create pull request",
            Method::POST,
            &segments,
            Some(&ApiNewPullRequest::from(request)),
        )
        .await
    }

    /// Fetch a single pull request.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn pull_request(
        &self,
        pull_request: &PullRequestLocator,
    ) -> Result<Value, BitbucketError> {
        self.get_json("get pull request", &pull_request.segments(), &[])
            .await
    }

    /// Change a pull request's title and/or description.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn update_pull_request(
        &self,
        pull_request: &PullRequestLocator,
        edit: &PullRequestEdit,
    ) -> Result<Value, BitbucketError> {
        self.send_json(
            "update pull request",
            Method::PUT,
            &pull_request.segments(),
            Some(edit),
        )
        .await
    }

    /// Mark a pull request as draft or ready for review.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn set_pull_request_draft(
        &self,
        pull_request: &PullRequestLocator,
        draft: bool,
    ) -> Result<Value, BitbucketError> {
        self.send_json(
            "set pull request draft",
            Method::PUT,
            &pull_request.segments(),
            Some(&json!({ "draft": draft })),
        )
        .await
    }

    /// Fetch the activity log of a pull request.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn pull_request_activity(
        &self,
        pull_request: &PullRequestLocator,
    ) -> Result<Vec<Value>, BitbucketError> {
        self.get_values(
            "get pull request activity",
            &sub_resource(pull_request, "activity"),
            &[],
        )
        .await
    }

    /// Approve a pull request as the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn approve_pull_request(
        &self,
        pull_request: &PullRequestLocator,
    ) -> Result<Value, BitbucketError> {
        self.send_json::<Value>(
            "approve pull request",
            Method::POST,
            &sub_resource(pull_request, "approve"),
            None,
        )
        .await
    }

    /// Withdraw the authenticated user's approval.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn unapprove_pull_request(
        &self,
        pull_request: &PullRequestLocator,
    ) -> Result<(), BitbucketError> {
        self.send_empty(
            "unapprove pull request",
            Method::DELETE,
            &sub_resource(pull_request, "approve"),
        )
        .await
    }

    /// Decline a pull request with an optional message.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn decline_pull_request(
        &self,
        pull_request: &PullRequestLocator,
        message: Option<&str>,
    ) -> Result<Value, BitbucketError> {
        let body = message
            .filter(|text| !text.is_empty())
            .map_or_else(|| json!({}), |text| json!({ "message": text }));
        self.send_json(
            "decline pull request",
            Method::POST,
            &sub_resource(pull_request, "decline"),
            Some(&body),
        )
        .await
    }

    /// Merge a pull request.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn merge_pull_request(
        &self,
        pull_request: &PullRequestLocator,
        options: &MergeOptions,
    ) -> Result<Value, BitbucketError> {
        self.send_json(
            "merge pull request",
            Method::POST,
            &sub_resource(pull_request, "merge"),
            Some(options),
        )
        .await
    }

    /// List the commits of a pull request.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn pull_request_commits(
        &self,
        pull_request: &PullRequestLocator,
    ) -> Result<Vec<Value>, BitbucketError> {
        self.get_values(
            "get pull request commits",
            &sub_resource(pull_request, "commits"),
            &[],
        )
        .await
    }

    /// Fetch the unified diff of a pull request as text.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn pull_request_diff(
        &self,
        pull_request: &PullRequestLocator,
    ) -> Result<String, BitbucketError> {
        self.get_text("get pull request diff", &sub_resource(pull_request, "diff"))
            .await
    }
}
