//! Test helpers for constructing Bitbucket JSON fixtures.
//!
//! Pull request and comment records are built as raw JSON because the client
//! treats them as opaque maps.
//!
//! # Examples
//!
//! ```
//! use bitbucket_mcp::bitbucket::models::test_support::{awaiting_review, reviewer};
//!
//! let pull_request = awaiting_review(7, "alice", "2024-01-01T00:00:00Z");
//! assert_eq!(pull_request["participants"][0], reviewer("alice", Some(false)));
//! ```

use serde_json::{Value, json};

/// Builds a participant entry with the `REVIEWER` role.
///
/// Passing `None` for `approved` omits the flag entirely.
#[must_use]
pub fn reviewer(nickname: &str, approved: Option<bool>) -> Value {
    let mut participant = json!({
        "user": { "nickname": nickname },
        "role": "REVIEWER",
    });
    if let (Some(flag), Some(map)) = (approved, participant.as_object_mut()) {
        map.insert("approved".to_owned(), Value::Bool(flag));
    }
    participant
}

/// Builds an open pull request record with the given participants.
#[must_use]
pub fn pull_request(id: u64, updated_on: &str, participants: Vec<Value>) -> Value {
    json!({
        "id": id,
        "title": format!("PR #{id}"),
        "state": "OPEN",
        "updated_on": updated_on,
        "participants": participants,
    })
}

/// Builds a pull request on which `nickname` is an unapproved reviewer.
#[must_use]
pub fn awaiting_review(id: u64, nickname: &str, updated_on: &str) -> Value {
    pull_request(id, updated_on, vec![reviewer(nickname, Some(false))])
}

/// Builds a comment record.
#[must_use]
pub fn comment(id: u64, raw: &str, pending: bool, inline: Option<Value>) -> Value {
    let mut record = json!({
        "id": id,
        "content": { "raw": raw },
        "pending": pending,
    });
    if let (Some(location), Some(map)) = (inline, record.as_object_mut()) {
        map.insert("inline".to_owned(), location);
    }
    record
}

/// Wraps records in Bitbucket's paginated `values` envelope.
#[must_use]
pub fn page(values: Vec<Value>) -> Value {
    json!({ "pagelen": values.len(), "values": values })
}
