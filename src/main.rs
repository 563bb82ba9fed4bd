//! Bitbucket MCP server entrypoint.
//!
//! Logs go to stderr; stdout carries protocol frames only.

use std::io::{self, Write};
use std::process::ExitCode;

use bitbucket_mcp::{BitbucketClient, BitbucketConfig, BitbucketError, McpServer, ToolDispatcher};
use ortho_config::OrthoConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

async fn run() -> Result<(), BitbucketError> {
    let config = load_config()?;
    config.validate()?;
    let credentials = config.resolve_credentials()?;
    let client = BitbucketClient::new(&config.url, credentials, config.timeout())?;

    tracing::info!(
        url = %client.base_url(),
        workspace = config.workspace.as_deref().unwrap_or("<none>"),
        "serving Bitbucket tools on stdio"
    );

    let server = McpServer::new(ToolDispatcher::new(client, config));
    server.run_stdio().await.map_err(|error| BitbucketError::Io {
        message: error.to_string(),
    })
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`BitbucketError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<BitbucketConfig, BitbucketError> {
    BitbucketConfig::load().map_err(|error| BitbucketError::configuration(error.to_string()))
}
