//! Model Context Protocol surface.
//!
//! JSON-RPC frames arrive on stdin, tool calls are routed through
//! [`ToolDispatcher`], and every tool outcome is wrapped in a
//! [`ToolResponse`].

pub mod args;
pub mod dispatch;
pub mod envelope;
pub mod protocol;
pub mod server;
pub mod tools;

pub use dispatch::ToolDispatcher;
pub use envelope::{ToolOutput, ToolResponse};
pub use server::McpServer;
pub use tools::{Tool, ToolDescriptor, catalogue};
