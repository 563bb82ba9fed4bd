//! Unit tests for the pending review search.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rstest::rstest;
use serde_json::{Value, json};

use super::{PendingReviewQuery, PendingReviewSearch};
use crate::bitbucket::error::BitbucketError;
use crate::bitbucket::gateway::{MockRepositoryGateway, PullRequestState};
use crate::bitbucket::locator::{RepositorySlug, ReviewerIdentity, Workspace};
use crate::bitbucket::models::test_support::{awaiting_review, pull_request, reviewer};
use crate::telemetry::{NoopTelemetrySink, RecordingTelemetrySink, TelemetryEvent};

type Responses = HashMap<&'static str, Result<Vec<Value>, BitbucketError>>;

fn query(limit: u32, repositories: &[&str]) -> PendingReviewQuery {
    PendingReviewQuery {
        workspace: Workspace::new("acme").expect("workspace should be valid"),
        identity: ReviewerIdentity::new("alice").expect("identity should be valid"),
        limit,
        repositories: Some(
            repositories
                .iter()
                .map(|slug| RepositorySlug::new(slug).expect("slug should be valid"))
                .collect(),
        ),
    }
}

fn server_error() -> BitbucketError {
    BitbucketError::Api {
        operation: "list pull requests".to_owned(),
        status: 500,
        message: "internal error".to_owned(),
    }
}

/// Gateway whose pull request listings are looked up by slug. Every queried
/// slug is appended to the returned log.
fn gateway_with(responses: Responses) -> (MockRepositoryGateway, Arc<Mutex<Vec<String>>>) {
    let queried = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&queried);
    let mut gateway = MockRepositoryGateway::new();
    gateway
        .expect_list_pull_requests()
        .returning(move |repository, _params| {
            let slug = repository.slug().as_str().to_owned();
            log.lock().expect("log lock").push(slug.clone());
            responses
                .get(slug.as_str())
                .cloned()
                .unwrap_or_else(|| Ok(Vec::new()))
        });
    (gateway, queried)
}

fn ids(report: &super::PendingReviewReport) -> Vec<u64> {
    report
        .pending_review_prs
        .iter()
        .filter_map(|review| review.record().get("id").and_then(Value::as_u64))
        .collect()
}

fn three_repositories() -> Responses {
    HashMap::from([
        (
            "r1",
            Ok(vec![awaiting_review(1, "alice", "2024-01-01T00:00:00Z")]),
        ),
        ("r2", Err(server_error())),
        (
            "r3",
            Ok(vec![awaiting_review(3, "alice", "2024-03-01T00:00:00Z")]),
        ),
    ])
}

#[tokio::test]
async fn failing_repository_is_skipped_and_results_are_ranked() {
    let (gateway, queried) = gateway_with(three_repositories());
    let sink = RecordingTelemetrySink::default();

    let report = PendingReviewSearch::new(&gateway, &sink)
        .find(&query(10, &["r1", "r2", "r3"]))
        .await
        .expect("search should succeed despite one failure");

    assert_eq!(ids(&report), vec![3, 1]);
    assert_eq!(report.total_found, 2);
    assert_eq!(report.searched_repositories, 3);
    assert_eq!(report.user, "alice");
    assert_eq!(report.workspace, "acme");
    assert_eq!(
        *queried.lock().expect("log lock"),
        vec!["r1".to_owned(), "r2".to_owned(), "r3".to_owned()]
    );
    assert_eq!(
        sink.take(),
        vec![TelemetryEvent::RepositoryQueryFailed {
            repository: "acme/r2".to_owned(),
            kind: "api".to_owned(),
            message: server_error().to_string(),
        }]
    );
}

#[tokio::test]
async fn matches_carry_their_repository() {
    let (gateway, _queried) = gateway_with(three_repositories());

    let report = PendingReviewSearch::new(&gateway, &NoopTelemetrySink)
        .find(&query(10, &["r1", "r2", "r3"]))
        .await
        .expect("search should succeed");

    let newest = report
        .pending_review_prs
        .first()
        .expect("at least one match");
    let repository = newest.repository().expect("repository should be attached");
    assert_eq!(repository.name, "r3");
    assert_eq!(repository.full_name, "acme/r3");
}

#[tokio::test]
async fn search_stops_once_limit_is_reached() {
    let (gateway, queried) = gateway_with(three_repositories());

    let report = PendingReviewSearch::new(&gateway, &NoopTelemetrySink)
        .find(&query(1, &["r1", "r2", "r3"]))
        .await
        .expect("search should succeed");

    assert_eq!(report.total_found, 1);
    assert_eq!(ids(&report), vec![1]);
    assert_eq!(report.searched_repositories, 1);
    assert_eq!(*queried.lock().expect("log lock"), vec!["r1".to_owned()]);
}

#[tokio::test]
async fn overshoot_from_one_repository_is_truncated_after_sorting() {
    let responses = HashMap::from([(
        "r1",
        Ok(vec![
            awaiting_review(1, "alice", "2024-01-01T00:00:00Z"),
            awaiting_review(2, "alice", "2024-05-01T00:00:00Z"),
            awaiting_review(3, "alice", "2024-03-01T00:00:00Z"),
        ]),
    )]);
    let (gateway, _queried) = gateway_with(responses);

    let report = PendingReviewSearch::new(&gateway, &NoopTelemetrySink)
        .find(&query(2, &["r1"]))
        .await
        .expect("search should succeed");

    assert_eq!(ids(&report), vec![2, 3]);
}

#[tokio::test]
async fn equal_timestamps_keep_query_order() {
    let responses = HashMap::from([
        (
            "r1",
            Ok(vec![awaiting_review(10, "alice", "2024-02-02T00:00:00Z")]),
        ),
        (
            "r2",
            Ok(vec![awaiting_review(20, "alice", "2024-02-02T00:00:00Z")]),
        ),
    ]);
    let (gateway, _queried) = gateway_with(responses);

    let report = PendingReviewSearch::new(&gateway, &NoopTelemetrySink)
        .find(&query(10, &["r1", "r2"]))
        .await
        .expect("search should succeed");

    assert_eq!(ids(&report), vec![10, 20]);
}

#[tokio::test]
async fn missing_timestamps_sort_last() {
    let mut undated = awaiting_review(5, "alice", "");
    if let Some(map) = undated.as_object_mut() {
        map.remove("updated_on");
    }
    let responses = HashMap::from([(
        "r1",
        Ok(vec![
            undated,
            awaiting_review(6, "alice", "2024-01-01T00:00:00Z"),
        ]),
    )]);
    let (gateway, _queried) = gateway_with(responses);

    let report = PendingReviewSearch::new(&gateway, &NoopTelemetrySink)
        .find(&query(10, &["r1"]))
        .await
        .expect("search should succeed");

    assert_eq!(ids(&report), vec![6, 5]);
}

#[tokio::test]
async fn non_matching_pull_requests_are_filtered_out() {
    let responses = HashMap::from([(
        "r1",
        Ok(vec![
            pull_request(1, "2024-01-01T00:00:00Z", vec![reviewer("alice", Some(true))]),
            pull_request(2, "2024-01-02T00:00:00Z", vec![reviewer("alice", None)]),
            pull_request(3, "2024-01-03T00:00:00Z", vec![reviewer("bob", Some(false))]),
            pull_request(
                4,
                "2024-01-04T00:00:00Z",
                vec![
                    reviewer("alice", Some(false)),
                    json!({ "user": { "nickname": "alice" }, "role": "REVIEWER", "approved": false }),
                ],
            ),
        ]),
    )]);
    let (gateway, _queried) = gateway_with(responses);

    let report = PendingReviewSearch::new(&gateway, &NoopTelemetrySink)
        .find(&query(10, &["r1"]))
        .await
        .expect("search should succeed");

    assert_eq!(ids(&report), vec![4], "matching PR should appear once");
}

#[tokio::test]
async fn every_repository_failing_yields_an_empty_report() {
    let responses = HashMap::from([("r1", Err(server_error())), ("r2", Err(server_error()))]);
    let (gateway, _queried) = gateway_with(responses);
    let sink = RecordingTelemetrySink::default();

    let report = PendingReviewSearch::new(&gateway, &sink)
        .find(&query(10, &["r1", "r2"]))
        .await
        .expect("per-repository failures should not fail the search");

    assert!(report.pending_review_prs.is_empty());
    assert_eq!(report.total_found, 0);
    assert_eq!(report.searched_repositories, 2);
    assert_eq!(sink.take().len(), 2);
}

#[tokio::test]
async fn empty_repository_list_searches_nothing() {
    let gateway = MockRepositoryGateway::new();

    let report = PendingReviewSearch::new(&gateway, &NoopTelemetrySink)
        .find(&query(10, &[]))
        .await
        .expect("empty search should succeed");

    assert_eq!(report.total_found, 0);
    assert_eq!(report.searched_repositories, 0);
}

#[tokio::test]
async fn zero_limit_is_rejected_before_any_request() {
    let gateway = MockRepositoryGateway::new();

    let result = PendingReviewSearch::new(&gateway, &NoopTelemetrySink)
        .find(&query(0, &["r1"]))
        .await;

    assert!(
        matches!(result, Err(BitbucketError::InvalidInput { .. })),
        "expected InvalidInput, got {result:?}"
    );
}

#[rstest]
#[case::small_limit(5, 5)]
#[case::at_cap(50, 50)]
#[case::above_cap(100, 50)]
#[tokio::test]
async fn per_repository_page_size_is_capped(#[case] limit: u32, #[case] expected: u32) {
    let mut gateway = MockRepositoryGateway::new();
    gateway
        .expect_list_pull_requests()
        .withf(move |_repository, params| {
            params.limit == expected && params.state == Some(PullRequestState::Open)
        })
        .times(1)
        .returning(|_, _| Ok(Vec::new()));

    PendingReviewSearch::new(&gateway, &NoopTelemetrySink)
        .find(&query(limit, &["r1"]))
        .await
        .expect("search should succeed");
}

#[tokio::test]
async fn repositories_are_discovered_when_not_supplied() {
    let mut gateway = MockRepositoryGateway::new();
    gateway
        .expect_list_repositories()
        .withf(|workspace, params| {
            workspace.as_str() == "acme" && params.limit == 100 && params.name.is_none()
        })
        .times(1)
        .returning(|_, _| {
            Ok(vec![
                json!({ "slug": "api", "name": "API" }),
                json!({ "name": "legacy" }),
                json!({ "full_name": "acme/unnamed" }),
                json!({ "slug": "web" }),
            ])
        });
    let queried = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&queried);
    gateway
        .expect_list_pull_requests()
        .returning(move |repository, _| {
            log.lock()
                .expect("log lock")
                .push(repository.slug().as_str().to_owned());
            Ok(Vec::new())
        });

    let mut discovered = query(10, &[]);
    discovered.repositories = None;
    let report = PendingReviewSearch::new(&gateway, &NoopTelemetrySink)
        .find(&discovered)
        .await
        .expect("search should succeed");

    assert_eq!(report.searched_repositories, 3);
    assert_eq!(
        *queried.lock().expect("log lock"),
        vec!["api".to_owned(), "legacy".to_owned(), "web".to_owned()]
    );
}

#[tokio::test]
async fn discovery_failure_is_returned() {
    let mut gateway = MockRepositoryGateway::new();
    gateway.expect_list_repositories().returning(|_, _| {
        Err(BitbucketError::Authentication {
            operation: "list repositories".to_owned(),
            status: 401,
            message: "bad token".to_owned(),
        })
    });

    let mut discovered = query(10, &[]);
    discovered.repositories = None;
    let result = PendingReviewSearch::new(&gateway, &NoopTelemetrySink)
        .find(&discovered)
        .await;

    assert!(
        matches!(result, Err(BitbucketError::Authentication { status: 401, .. })),
        "expected authentication failure, got {result:?}"
    );
}
