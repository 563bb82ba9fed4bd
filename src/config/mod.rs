//! Server configuration loaded from CLI, environment, and files.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in defaults (public Bitbucket Cloud API, 30 second
//!    timeout)
//! 2. **Configuration file** – `.bitbucket-mcp.toml` in the current
//!    directory, home directory, or XDG config directory
//! 3. **Environment variables** – `BITBUCKET_URL`, `BITBUCKET_TOKEN`,
//!    `BITBUCKET_USERNAME`, `BITBUCKET_PASSWORD`, `BITBUCKET_WORKSPACE`,
//!    `BITBUCKET_TIMEOUT_SECONDS`
//! 4. **Command-line arguments** – `--url`/`-b`, `--token`/`-t`,
//!    `--username`/`-u`, `--password`/`-p`, `--workspace`/`-w`,
//!    `--timeout-seconds`/`-T`
//!
//! # Configuration File
//!
//! ```toml
//! url = "https://api.bitbucket.org/2.0"
//! username = "alice"
//! password = "app-password"
//! workspace = "acme"
//! ```

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::bitbucket::error::BitbucketError;
use crate::bitbucket::locator::{Credentials, ReviewerIdentity, Workspace};

/// Public Bitbucket Cloud REST API root.
pub const DEFAULT_BITBUCKET_URL: &str = "https://api.bitbucket.org/2.0";

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Server configuration supporting CLI, environment, and file sources.
///
/// # Example
///
/// ```no_run
/// use bitbucket_mcp::BitbucketConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = BitbucketConfig::load().expect("failed to load configuration");
/// let credentials = config.resolve_credentials().expect("credentials required");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "BITBUCKET",
    discovery(
        dotfile_name = ".bitbucket-mcp.toml",
        config_file_name = "bitbucket-mcp.toml",
        app_name = "bitbucket-mcp"
    )
)]
pub struct BitbucketConfig {
    /// Base URL of the Bitbucket REST API.
    #[ortho_config(cli_short = 'b')]
    pub url: String,

    /// Bearer token. Takes precedence over username and password.
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Account username, used for basic authentication and as the identity
    /// matched against pull request reviewers.
    #[ortho_config(cli_short = 'u')]
    pub username: Option<String>,

    /// App password paired with `username`.
    #[ortho_config(cli_short = 'p')]
    pub password: Option<String>,

    /// Workspace used when a tool call omits one.
    #[ortho_config(cli_short = 'w')]
    pub workspace: Option<String>,

    /// Per-request timeout, in seconds.
    #[ortho_config(cli_short = 'T')]
    pub timeout_seconds: u64,
}

impl Default for BitbucketConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BITBUCKET_URL.to_owned(),
            token: None,
            username: None,
            password: None,
            workspace: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

impl BitbucketConfig {
    /// Chooses the credentials applied to every request.
    ///
    /// A token wins over a username/password pair.
    ///
    /// # Errors
    ///
    /// Returns [`BitbucketError::Configuration`] when neither a token nor a
    /// complete username/password pair is configured.
    pub fn resolve_credentials(&self) -> Result<Credentials, BitbucketError> {
        if let Some(token) = non_blank(self.token.as_deref()) {
            return Ok(Credentials::Bearer {
                token: token.to_owned(),
            });
        }
        match (
            non_blank(self.username.as_deref()),
            non_blank(self.password.as_deref()),
        ) {
            (Some(username), Some(password)) => Ok(Credentials::Basic {
                username: username.to_owned(),
                password: password.to_owned(),
            }),
            _ => Err(BitbucketError::configuration(
                "either BITBUCKET_TOKEN or BITBUCKET_USERNAME and BITBUCKET_PASSWORD must be set",
            )),
        }
    }

    /// Returns `explicit` when it is non-blank, otherwise the configured
    /// default workspace.
    ///
    /// # Errors
    ///
    /// Returns [`BitbucketError::Configuration`] when neither source provides
    /// a workspace.
    pub fn resolve_workspace(&self, explicit: Option<&str>) -> Result<Workspace, BitbucketError> {
        non_blank(explicit)
            .or_else(|| non_blank(self.workspace.as_deref()))
            .ok_or_else(|| {
                BitbucketError::configuration(
                    "workspace must be provided or set via BITBUCKET_WORKSPACE",
                )
            })
            .and_then(Workspace::new)
    }

    /// Returns the username matched against pull request reviewers.
    ///
    /// # Errors
    ///
    /// Returns [`BitbucketError::Configuration`] when no username is set.
    pub fn require_identity(&self) -> Result<ReviewerIdentity, BitbucketError> {
        non_blank(self.username.as_deref())
            .ok_or_else(|| {
                BitbucketError::configuration(
                    "BITBUCKET_USERNAME must be set to identify the current reviewer",
                )
            })
            .and_then(ReviewerIdentity::new)
    }

    /// Per-request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Validates configuration consistency.
    ///
    /// # Errors
    ///
    /// Returns [`BitbucketError::Configuration`] when the base URL does not
    /// parse as an absolute HTTP(S) URL or the timeout is zero.
    pub fn validate(&self) -> Result<(), BitbucketError> {
        let parsed = Url::parse(&self.url).map_err(|error| {
            BitbucketError::configuration(format!("invalid Bitbucket URL '{}': {error}", self.url))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(BitbucketError::configuration(format!(
                "Bitbucket URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(BitbucketError::configuration(
                "timeout_seconds must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
