//! Pull request comment listing, creation, and updates.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::bitbucket::error::BitbucketError;
use crate::bitbucket::locator::PullRequestLocator;
use crate::bitbucket::models::CommentUpdate;

use super::types::ApiNewComment;
use super::{BitbucketClient, CommentGateway, NewComment};

fn comments_segments(pull_request: &PullRequestLocator) -> Vec<&str> {
    let mut segments = pull_request.segments();
    segments.push("comments");
    segments
}

impl BitbucketClient {
    /// Add a comment, optionally inline and optionally pending.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn add_comment(
        &self,
        pull_request: &PullRequestLocator,
        comment: &NewComment,
    ) -> Result<Value, BitbucketError> {
        self.send_json(
            "add pull request comment",
            Method::POST,
            &comments_segments(pull_request),
            Some(&ApiNewComment::from(comment)),
        )
        .await
    }
}

#[async_trait]
impl CommentGateway for BitbucketClient {
    async fn list_comments(
        &self,
        pull_request: &PullRequestLocator,
    ) -> Result<Vec<Value>, BitbucketError> {
        self.get_values(
            "list pull request comments",
            &comments_segments(pull_request),
            &[],
        )
        .await
    }

    async fn update_comment(
        &self,
        pull_request: &PullRequestLocator,
        comment_id: u64,
        update: &CommentUpdate,
    ) -> Result<Value, BitbucketError> {
        let id = comment_id.to_string();
        let mut segments = comments_segments(pull_request);
        segments.push(id.as_str());
        self.send_json(
            "update pull request comment",
            Method::PUT,
            &segments,
            Some(update),
        )
        .await
    }
}
