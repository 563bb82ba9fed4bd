//! Bitbucket Cloud tools served over the Model Context Protocol.
//!
//! The library wraps the Bitbucket REST API behind a reqwest client, adds a
//! cross-repository pending review search and a pending comment publisher,
//! and exposes every operation as an MCP tool over a newline-delimited
//! JSON-RPC stdio transport.

pub mod bitbucket;
pub mod config;
pub mod mcp;
pub mod telemetry;

pub use bitbucket::{
    BitbucketClient, BitbucketError, Credentials, PendingCommentPublisher, PendingReviewQuery,
    PendingReviewSearch, PullRequestLocator, RepositoryLocator,
};
pub use config::BitbucketConfig;
pub use mcp::{McpServer, ToolDispatcher, ToolResponse};
pub use telemetry::{NoopTelemetrySink, TelemetryEvent, TelemetrySink, TracingTelemetrySink};
