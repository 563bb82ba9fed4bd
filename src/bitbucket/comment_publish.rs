//! Publishing of draft (pending) pull request comments.

use serde_json::Value;

use super::error::BitbucketError;
use super::gateway::CommentGateway;
use super::locator::PullRequestLocator;
use super::models::{CommentUpdate, PendingComment, PublishReport, PublishStatus, PublishedComment};

/// Flips every pending comment on a pull request to published.
pub struct PendingCommentPublisher<'client, Gateway>
where
    Gateway: CommentGateway + ?Sized,
{
    client: &'client Gateway,
}

impl<'client, Gateway> PendingCommentPublisher<'client, Gateway>
where
    Gateway: CommentGateway + ?Sized,
{
    /// Create a publisher using the provided gateway.
    #[must_use]
    pub const fn new(client: &'client Gateway) -> Self {
        Self { client }
    }

    /// Publish all comments whose `pending` flag is exactly `true`.
    ///
    /// Comments are updated one at a time in listing order. Each update
    /// resends the original content and inline location alongside
    /// `pending: false`.
    ///
    /// # Errors
    ///
    /// Returns the listing failure, a [`BitbucketError::Decode`] for a pending
    /// comment without a numeric id, or the first update failure. Comments
    /// updated before a failure stay published.
    pub async fn publish(
        &self,
        pull_request: &PullRequestLocator,
    ) -> Result<PublishReport, BitbucketError> {
        let comments = self.client.list_comments(pull_request).await?;
        let mut results = Vec::new();

        for record in comments.iter().filter(|record| is_pending(record)) {
            let comment: PendingComment =
                serde_json::from_value(record.clone()).map_err(|error| BitbucketError::Decode {
                    message: format!("pending comment could not be read: {error}"),
                })?;
            let update = CommentUpdate::publish(&comment);
            let data = self
                .client
                .update_comment(pull_request, comment.id, &update)
                .await?;
            tracing::debug!(comment_id = comment.id, "published pending comment");
            results.push(PublishedComment {
                comment_id: comment.id,
                status: PublishStatus::Published,
                data,
            });
        }

        Ok(PublishReport {
            published: results.len(),
            results,
        })
    }
}

fn is_pending(record: &Value) -> bool {
    record.get("pending").and_then(Value::as_bool) == Some(true)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::{Value, json};

    use super::PendingCommentPublisher;
    use crate::bitbucket::error::BitbucketError;
    use crate::bitbucket::gateway::MockCommentGateway;
    use crate::bitbucket::locator::PullRequestLocator;
    use crate::bitbucket::models::test_support::comment;

    fn locator() -> PullRequestLocator {
        PullRequestLocator::from_parts("acme", "api", "7").expect("locator should build")
    }

    #[tokio::test]
    async fn pending_comments_are_resent_with_their_content() {
        let inline = json!({ "path": "a.py", "to": 5 });
        let listing = vec![
            comment(1, "nit", true, Some(inline.clone())),
            comment(2, "already live", false, None),
            comment(3, "question", true, None),
        ];
        let sent = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&sent);

        let mut gateway = MockCommentGateway::new();
        gateway
            .expect_list_comments()
            .times(1)
            .returning(move |_| Ok(listing.clone()));
        gateway
            .expect_update_comment()
            .times(2)
            .returning(move |_, id, update| {
                let body = serde_json::to_value(update).expect("update should serialise");
                log.lock().expect("log lock").push((id, body));
                Ok(json!({ "id": id, "pending": false }))
            });

        let report = PendingCommentPublisher::new(&gateway)
            .publish(&locator())
            .await
            .expect("publish should succeed");

        assert_eq!(report.published, 2);
        let ids: Vec<u64> = report.results.iter().map(|result| result.comment_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(
            *sent.lock().expect("log lock"),
            vec![
                (
                    1,
                    json!({ "content": { "raw": "nit" }, "pending": false, "inline": inline })
                ),
                (3, json!({ "content": { "raw": "question" }, "pending": false })),
            ]
        );
    }

    #[tokio::test]
    async fn report_serialises_in_wire_shape() {
        let mut gateway = MockCommentGateway::new();
        gateway
            .expect_list_comments()
            .returning(|_| Ok(vec![comment(9, "x", true, None)]));
        gateway
            .expect_update_comment()
            .returning(|_, _, _| Ok(json!({ "id": 9 })));

        let report = PendingCommentPublisher::new(&gateway)
            .publish(&locator())
            .await
            .expect("publish should succeed");

        assert_eq!(
            serde_json::to_value(&report).expect("report should serialise"),
            json!({
                "published": 1,
                "results": [{ "commentId": 9, "status": "published", "data": { "id": 9 } }],
            })
        );
    }

    #[tokio::test]
    async fn no_pending_comments_publishes_nothing() {
        let mut gateway = MockCommentGateway::new();
        gateway.expect_list_comments().returning(|_| {
            Ok(vec![
                comment(1, "live", false, None),
                json!({ "id": 2, "content": { "raw": "flag absent" } }),
                json!({ "id": 3, "pending": "true" }),
            ])
        });

        let report = PendingCommentPublisher::new(&gateway)
            .publish(&locator())
            .await
            .expect("publish should succeed");

        assert_eq!(report.published, 0);
        assert!(report.results.is_empty());
    }

    #[tokio::test]
    async fn first_update_failure_aborts_the_run() {
        let mut gateway = MockCommentGateway::new();
        gateway.expect_list_comments().returning(|_| {
            Ok(vec![
                comment(1, "a", true, None),
                comment(2, "b", true, None),
                comment(3, "c", true, None),
            ])
        });
        gateway
            .expect_update_comment()
            .times(2)
            .returning(|_, id, _| {
                if id == 2 {
                    Err(BitbucketError::Api {
                        operation: "update comment".to_owned(),
                        status: 409,
                        message: "conflict".to_owned(),
                    })
                } else {
                    Ok(Value::Null)
                }
            });

        let result = PendingCommentPublisher::new(&gateway)
            .publish(&locator())
            .await;

        assert!(
            matches!(result, Err(BitbucketError::Api { status: 409, .. })),
            "expected update failure, got {result:?}"
        );
    }

    #[tokio::test]
    async fn pending_comment_without_id_is_a_decode_error() {
        let mut gateway = MockCommentGateway::new();
        gateway
            .expect_list_comments()
            .returning(|_| Ok(vec![json!({ "pending": true, "content": { "raw": "x" } })]));

        let result = PendingCommentPublisher::new(&gateway)
            .publish(&locator())
            .await;

        assert!(
            matches!(result, Err(BitbucketError::Decode { .. })),
            "expected decode failure, got {result:?}"
        );
    }
}
