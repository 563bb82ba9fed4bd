//! JSON-RPC framing and MCP lifecycle over an in-memory transport.

mod support;

use bitbucket_mcp::McpServer;
use bitbucket_mcp::mcp::Tool;
use serde_json::{Value, json};
use tokio::io::BufReader;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::dispatcher_for;

async fn server() -> (McpServer, MockServer) {
    let mock = MockServer::start().await;
    let (dispatcher, _telemetry) = dispatcher_for(&mock, Some("acme"));
    (McpServer::new(dispatcher), mock)
}

async fn exchange(server: &McpServer, frames: &[Value]) -> Vec<Value> {
    let input: String = frames
        .iter()
        .map(|frame| format!("{frame}\n"))
        .collect();
    let mut output = Vec::new();
    server
        .serve(BufReader::new(input.as_bytes()), &mut output)
        .await
        .unwrap_or_else(|error| panic!("serve should finish cleanly: {error}"));
    String::from_utf8(output)
        .unwrap_or_else(|error| panic!("output should be UTF-8: {error}"))
        .lines()
        .map(|line| {
            serde_json::from_str(line)
                .unwrap_or_else(|error| panic!("each line should be JSON: {error}"))
        })
        .collect()
}

#[tokio::test]
async fn initialize_echoes_the_client_protocol_version() {
    let (server, _mock) = server().await;
    let reply = server
        .handle_frame(
            &json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": { "protocolVersion": "2025-03-26" },
            })
            .to_string(),
        )
        .await;

    let Some(reply) = reply else {
        panic!("initialize must be answered");
    };
    assert_eq!(reply["id"], json!(1));
    assert_eq!(reply["result"]["protocolVersion"], json!("2025-03-26"));
    assert_eq!(reply["result"]["serverInfo"]["name"], json!("mcp-bitbucket"));
    assert!(reply["result"]["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn tools_list_advertises_every_tool() {
    let (server, _mock) = server().await;
    let replies = exchange(
        &server,
        &[json!({ "jsonrpc": "2.0", "id": "list", "method": "tools/list" })],
    )
    .await;

    let Some(tools) = replies
        .first()
        .and_then(|reply| reply["result"]["tools"].as_array())
    else {
        panic!("tools/list must return a tools array: {replies:?}");
    };
    assert_eq!(tools.len(), Tool::ALL.len());
    let pending = tools
        .iter()
        .find(|tool| tool["name"] == json!("getPendingReviewPRs"));
    let Some(pending) = pending else {
        panic!("getPendingReviewPRs should be listed");
    };
    assert_eq!(pending["inputSchema"]["type"], json!("object"));
    assert!(pending["inputSchema"]["properties"]["repositoryList"].is_object());
}

#[tokio::test]
async fn notifications_are_never_answered() {
    let (server, _mock) = server().await;
    let replies = exchange(
        &server,
        &[
            json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
            json!({ "jsonrpc": "2.0", "method": "notifications/cancelled", "params": {} }),
            json!({ "jsonrpc": "2.0", "id": 2, "method": "ping" }),
        ],
    )
    .await;

    assert_eq!(replies, vec![json!({ "jsonrpc": "2.0", "id": 2, "result": {} })]);
}

#[tokio::test]
async fn malformed_and_unknown_requests_get_error_codes() {
    let (server, _mock) = server().await;

    let parse_failure = server.handle_frame("{not json").await;
    assert_eq!(
        parse_failure.map(|reply| reply["error"]["code"].clone()),
        Some(json!(-32_700))
    );

    let unknown = server
        .handle_frame(&json!({ "jsonrpc": "2.0", "id": 3, "method": "resources/list" }).to_string())
        .await;
    assert_eq!(
        unknown.map(|reply| reply["error"]["code"].clone()),
        Some(json!(-32_601))
    );

    let missing_name = server
        .handle_frame(
            &json!({ "jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {} })
                .to_string(),
        )
        .await;
    assert_eq!(
        missing_name.map(|reply| reply["error"]["code"].clone()),
        Some(json!(-32_602))
    );
}

#[tokio::test]
async fn tool_failures_are_results_not_protocol_errors() {
    let (server, _mock) = server().await;
    let replies = exchange(
        &server,
        &[json!({
            "jsonrpc": "2.0",
            "id": 5,
            "method": "tools/call",
            "params": { "name": "getRepository", "arguments": {} },
        })],
    )
    .await;

    assert_eq!(
        replies,
        vec![json!({
            "jsonrpc": "2.0",
            "id": 5,
            "result": {
                "content": [{ "type": "text", "text": "ERROR: invalid_input: repo_slug is required" }],
                "isError": true,
            },
        })]
    );
}

#[tokio::test]
async fn tool_calls_reach_bitbucket() {
    let (server, mock) = server().await;
    Mock::given(method("GET"))
        .and(path("/repositories/acme/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "slug": "api" })))
        .expect(1)
        .mount(&mock)
        .await;

    let replies = exchange(
        &server,
        &[json!({
            "jsonrpc": "2.0",
            "id": 6,
            "method": "tools/call",
            "params": { "name": "getRepository", "arguments": { "repo_slug": "api" } },
        })],
    )
    .await;

    let Some(reply) = replies.first() else {
        panic!("tools/call must be answered");
    };
    assert_eq!(reply["result"]["isError"], json!(false));
    let text = reply["result"]["content"][0]["text"].as_str().unwrap_or_default();
    assert_eq!(
        serde_json::from_str::<Value>(text).ok(),
        Some(json!({ "slug": "api" }))
    );
}
