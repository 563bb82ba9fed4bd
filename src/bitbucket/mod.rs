//! Bitbucket Cloud access.
//!
//! The gateway layer speaks HTTP; the pending review search and the comment
//! publisher build on its traits and hold no transport state of their own.

pub mod comment_publish;
pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;
pub mod pending_reviews;

pub use comment_publish::PendingCommentPublisher;
pub use error::BitbucketError;
pub use gateway::{BitbucketClient, CommentGateway, RepositoryGateway};
pub use locator::{
    Credentials, ProjectKey, PullRequestId, PullRequestLocator, RepositoryLocator, RepositorySlug,
    ReviewerIdentity, Workspace,
};
pub use models::{PendingReview, PendingReviewReport, PublishReport};
pub use pending_reviews::{PendingReviewQuery, PendingReviewSearch};

#[cfg(test)]
pub use gateway::{MockCommentGateway, MockRepositoryGateway};
