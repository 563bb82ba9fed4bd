//! Data models for pending review searches and comment publishing.
//!
//! Pull request records stay as opaque JSON maps: only the handful of fields
//! needed for reviewer matching and ordering are read, and everything else is
//! passed through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::locator::{RepositoryLocator, ReviewerIdentity};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Participant role Bitbucket uses for requested reviewers.
pub const REVIEWER_ROLE: &str = "REVIEWER";

/// Reports whether `identity` is an unapproved reviewer on `pull_request`.
///
/// Only an explicit `"approved": false` counts; an absent or non-boolean flag
/// never matches. Nickname comparison is exact and case-sensitive.
#[must_use]
pub fn is_pending_review_for(pull_request: &Value, identity: &ReviewerIdentity) -> bool {
    let Some(participants) = pull_request.get("participants").and_then(Value::as_array) else {
        return false;
    };

    participants.iter().any(|participant| {
        let nickname = participant
            .get("user")
            .and_then(|user| user.get("nickname"))
            .and_then(Value::as_str);
        let role = participant.get("role").and_then(Value::as_str);
        let approved = participant.get("approved").and_then(Value::as_bool);

        nickname == Some(identity.as_str()) && role == Some(REVIEWER_ROLE) && approved == Some(false)
    })
}

/// Repository reference attached to each pending review match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    /// Repository slug.
    pub name: String,
    /// `workspace/slug`.
    pub full_name: String,
}

impl From<&RepositoryLocator> for RepositoryRef {
    fn from(locator: &RepositoryLocator) -> Self {
        Self {
            name: locator.slug().as_str().to_owned(),
            full_name: locator.full_name(),
        }
    }
}

/// A pull request awaiting review, augmented with its repository.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PendingReview {
    record: Map<String, Value>,
}

impl PendingReview {
    /// Copies `pull_request` and inserts a `repository` entry naming `origin`.
    ///
    /// Non-object records are wrapped under a `pull_request` key so the
    /// repository reference can still be attached.
    #[must_use]
    pub fn new(pull_request: &Value, origin: &RepositoryLocator) -> Self {
        let mut record = match pull_request {
            Value::Object(map) => map.clone(),
            other => Map::from_iter([("pull_request".to_owned(), other.clone())]),
        };
        let repository = RepositoryRef::from(origin);
        record.insert(
            "repository".to_owned(),
            json!({ "name": repository.name, "full_name": repository.full_name }),
        );
        Self { record }
    }

    /// Last update timestamp as sent by Bitbucket, or `""` when absent.
    #[must_use]
    pub fn updated_on(&self) -> &str {
        self.record
            .get("updated_on")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// The augmented record.
    #[must_use]
    pub const fn record(&self) -> &Map<String, Value> {
        &self.record
    }

    /// Repository reference attached at match time.
    #[must_use]
    pub fn repository(&self) -> Option<RepositoryRef> {
        self.record
            .get("repository")
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
    }
}

/// Result of a cross-repository pending review search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingReviewReport {
    /// Matches ordered by `updated_on` descending.
    pub pending_review_prs: Vec<PendingReview>,
    /// Number of matches returned.
    pub total_found: usize,
    /// Number of repositories actually queried.
    pub searched_repositories: usize,
    /// Identity searched for.
    pub user: String,
    /// Workspace searched.
    pub workspace: String,
}

/// The fields of a pending comment needed to publish it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PendingComment {
    /// Comment identifier.
    pub id: u64,
    /// Original content object, echoed back unchanged.
    #[serde(default)]
    pub content: Value,
    /// Inline location, echoed back when present.
    #[serde(default)]
    pub inline: Option<Value>,
}

/// Full-record update body Bitbucket requires when editing a comment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentUpdate {
    /// Comment content.
    pub content: Value,
    /// Draft flag.
    pub pending: bool,
    /// Inline location, omitted when the comment is not inline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline: Option<Value>,
}

impl CommentUpdate {
    /// Builds the update that flips `comment` from pending to published.
    #[must_use]
    pub fn publish(comment: &PendingComment) -> Self {
        Self {
            content: comment.content.clone(),
            pending: false,
            inline: comment.inline.clone(),
        }
    }
}

/// Outcome tag for a transitioned comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStatus {
    /// The comment is no longer pending.
    Published,
}

/// One successfully published comment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishedComment {
    /// Comment identifier.
    #[serde(rename = "commentId")]
    pub comment_id: u64,
    /// Outcome tag.
    pub status: PublishStatus,
    /// Raw response from the update call.
    pub data: Value,
}

/// Result of publishing every pending comment on a pull request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishReport {
    /// Number of comments transitioned.
    pub published: usize,
    /// Per-comment outcomes in listing order.
    pub results: Vec<PublishedComment>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::{CommentUpdate, PendingComment, PendingReview, RepositoryRef, is_pending_review_for};
    use crate::bitbucket::locator::{RepositoryLocator, ReviewerIdentity};

    fn identity() -> ReviewerIdentity {
        ReviewerIdentity::new("alice").expect("identity should be valid")
    }

    fn pull_request_with(participant: &serde_json::Value) -> serde_json::Value {
        json!({ "id": 1, "participants": [participant] })
    }

    #[rstest]
    #[case::unapproved_reviewer(json!({"user": {"nickname": "alice"}, "role": "REVIEWER", "approved": false}), true)]
    #[case::approved_reviewer(json!({"user": {"nickname": "alice"}, "role": "REVIEWER", "approved": true}), false)]
    #[case::approval_absent(json!({"user": {"nickname": "alice"}, "role": "REVIEWER"}), false)]
    #[case::approval_not_boolean(json!({"user": {"nickname": "alice"}, "role": "REVIEWER", "approved": "false"}), false)]
    #[case::participant_role(json!({"user": {"nickname": "alice"}, "role": "PARTICIPANT", "approved": false}), false)]
    #[case::other_user(json!({"user": {"nickname": "bob"}, "role": "REVIEWER", "approved": false}), false)]
    #[case::case_differs(json!({"user": {"nickname": "Alice"}, "role": "REVIEWER", "approved": false}), false)]
    #[case::whitespace_differs(json!({"user": {"nickname": "alice "}, "role": "REVIEWER", "approved": false}), false)]
    #[case::no_user(json!({"role": "REVIEWER", "approved": false}), false)]
    fn reviewer_matching(#[case] participant: serde_json::Value, #[case] expected: bool) {
        let pull_request = pull_request_with(&participant);
        assert_eq!(is_pending_review_for(&pull_request, &identity()), expected);
    }

    #[rstest]
    fn padded_identity_does_not_match_trimmed_nickname() {
        let padded = ReviewerIdentity::new("alice ").expect("identity should be valid");
        let pull_request = pull_request_with(
            &json!({"user": {"nickname": "alice"}, "role": "REVIEWER", "approved": false}),
        );
        assert!(!is_pending_review_for(&pull_request, &padded));
    }

    #[rstest]
    fn missing_participants_never_match() {
        assert!(!is_pending_review_for(&json!({"id": 3}), &identity()));
        assert!(!is_pending_review_for(
            &json!({"id": 3, "participants": null}),
            &identity()
        ));
    }

    #[rstest]
    fn pending_review_attaches_repository() {
        let origin = RepositoryLocator::from_parts("acme", "api").expect("locator should build");
        let review = PendingReview::new(
            &json!({"id": 9, "updated_on": "2024-01-01T00:00:00Z"}),
            &origin,
        );

        let serialised = serde_json::to_value(&review).expect("review should serialise");
        assert_eq!(
            serialised,
            json!({
                "id": 9,
                "updated_on": "2024-01-01T00:00:00Z",
                "repository": {"name": "api", "full_name": "acme/api"}
            })
        );
        assert_eq!(review.updated_on(), "2024-01-01T00:00:00Z");
        assert_eq!(
            review.repository(),
            Some(RepositoryRef {
                name: "api".to_owned(),
                full_name: "acme/api".to_owned(),
            })
        );
    }

    #[rstest]
    fn publish_update_echoes_content_and_inline() {
        let comment: PendingComment = serde_json::from_value(json!({
            "id": 7,
            "content": {"raw": "x"},
            "inline": {"path": "a.py", "to": 5},
            "pending": true
        }))
        .expect("comment should deserialise");

        let update = serde_json::to_value(CommentUpdate::publish(&comment))
            .expect("update should serialise");

        assert_eq!(
            update,
            json!({
                "content": {"raw": "x"},
                "inline": {"path": "a.py", "to": 5},
                "pending": false
            })
        );
    }

    #[rstest]
    fn publish_update_omits_inline_for_general_comments() {
        let comment: PendingComment =
            serde_json::from_value(json!({"id": 8, "content": {"raw": "y"}, "pending": true}))
                .expect("comment should deserialise");

        let update = serde_json::to_value(CommentUpdate::publish(&comment))
            .expect("update should serialise");

        assert_eq!(update, json!({"content": {"raw": "y"}, "pending": false}));
    }
}
