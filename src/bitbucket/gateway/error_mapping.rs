//! Error mapping helpers for the reqwest-backed Bitbucket client.

use http::StatusCode;
use serde_json::Value;

use crate::bitbucket::error::BitbucketError;

const MAX_BODY_EXCERPT_CHARS: usize = 300;

/// Checks if a Bitbucket status indicates an authentication failure.
pub(super) const fn is_auth_failure(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

/// Maps a transport-level failure (no usable response) to a network error.
pub(super) fn map_transport_error(operation: &str, error: &reqwest::Error) -> BitbucketError {
    let detail = if error.is_timeout() {
        format!("{operation} timed out: {error}")
    } else {
        format!("{operation} failed: {error}")
    };
    BitbucketError::Network { message: detail }
}

/// Maps a non-success response to an authentication or API error.
pub(super) fn map_http_error(operation: &str, status: StatusCode, body: &str) -> BitbucketError {
    let message = extract_bitbucket_message(body).unwrap_or_else(|| excerpt(body));
    if is_auth_failure(status) {
        BitbucketError::Authentication {
            operation: operation.to_owned(),
            status: status.as_u16(),
            message,
        }
    } else {
        BitbucketError::Api {
            operation: operation.to_owned(),
            status: status.as_u16(),
            message,
        }
    }
}

pub(super) fn map_decode_error(operation: &str, error: &serde_json::Error) -> BitbucketError {
    BitbucketError::Decode {
        message: format!("{operation} returned malformed JSON: {error}"),
    }
}

/// Pulls the human-readable message out of a Bitbucket error body.
///
/// Bitbucket Cloud wraps errors as `{"type": "error", "error": {"message": …}}`;
/// a top-level `message` is accepted as well.
pub(super) fn extract_bitbucket_message(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return None;
    };
    value
        .get("error")
        .and_then(|error| error.get("message"))
        .or_else(|| value.get("message"))
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_owned();
    }
    let mut excerpt: String = trimmed.chars().take(MAX_BODY_EXCERPT_CHARS).collect();
    if trimmed.chars().count() > MAX_BODY_EXCERPT_CHARS {
        excerpt.push('…');
    }
    excerpt
}
