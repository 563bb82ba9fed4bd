//! Shared helpers for the wiremock-backed integration tests.

use std::sync::Arc;
use std::time::Duration;

use bitbucket_mcp::telemetry::RecordingTelemetrySink;
use bitbucket_mcp::{BitbucketClient, BitbucketConfig, Credentials, ToolDispatcher};
use wiremock::MockServer;

/// Username configured for every test account.
pub const USERNAME: &str = "alice";

/// Builds a configuration pointing at `server`.
#[must_use]
pub fn config_for(server: &MockServer, workspace: Option<&str>) -> BitbucketConfig {
    BitbucketConfig {
        url: server.uri(),
        username: Some(USERNAME.to_owned()),
        password: Some("app-password".to_owned()),
        workspace: workspace.map(str::to_owned),
        ..BitbucketConfig::default()
    }
}

/// Builds a basic-auth client for `server`.
///
/// # Panics
///
/// Panics if the mock server URI cannot be used as a base URL.
#[must_use]
pub fn client_for(server: &MockServer) -> BitbucketClient {
    let credentials = Credentials::Basic {
        username: USERNAME.to_owned(),
        password: "app-password".to_owned(),
    };
    BitbucketClient::new(&server.uri(), credentials, Duration::from_secs(5))
        .unwrap_or_else(|error| panic!("client should build: {error}"))
}

/// Builds a dispatcher for `server` that records telemetry in memory.
#[must_use]
pub fn dispatcher_for(
    server: &MockServer,
    workspace: Option<&str>,
) -> (ToolDispatcher, Arc<RecordingTelemetrySink>) {
    let telemetry = Arc::new(RecordingTelemetrySink::default());
    let dispatcher = ToolDispatcher::new(client_for(server), config_for(server, workspace))
        .with_telemetry(telemetry.clone());
    (dispatcher, telemetry)
}
