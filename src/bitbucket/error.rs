//! Error types exposed by the Bitbucket client layer.

use thiserror::Error;

/// Errors surfaced while validating input or communicating with Bitbucket.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BitbucketError {
    /// Required configuration was absent or unusable.
    #[error("{message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// A caller-supplied parameter violated a stated constraint.
    #[error("{message}")]
    InvalidInput {
        /// Description of the rejected parameter.
        message: String,
    },

    /// Bitbucket rejected the credentials (401/403).
    #[error("{operation} failed: Bitbucket returned {status} {message}")]
    Authentication {
        /// Operation that was attempted.
        operation: String,
        /// HTTP status code returned by Bitbucket.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },

    /// Bitbucket returned a non-success status other than an auth failure.
    #[error("{operation} failed with status {status}: {message}")]
    Api {
        /// Operation that was attempted.
        operation: String,
        /// HTTP status code returned by Bitbucket.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },

    /// Networking failed before a response was received.
    #[error("{message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// A response body could not be decoded into the expected shape.
    #[error("{message}")]
    Decode {
        /// Decoding failure detail.
        message: String,
    },

    /// Reading or writing the local transport failed.
    #[error("I/O error: {message}")]
    Io {
        /// I/O failure detail.
        message: String,
    },
}

impl BitbucketError {
    /// Builds a [`BitbucketError::InvalidInput`] from any message.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Builds a [`BitbucketError::Configuration`] from any message.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Short, stable tag naming the failure category.
    ///
    /// The dispatch layer renders failures as `ERROR: <kind>: <description>`
    /// using this tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::InvalidInput { .. } => "invalid_input",
            Self::Authentication { .. } => "authentication",
            Self::Api { .. } => "api",
            Self::Network { .. } => "network",
            Self::Decode { .. } => "decode",
            Self::Io { .. } => "io",
        }
    }

    /// HTTP status carried by remote failures, when one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } | Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure came from the remote call itself.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::Api { .. } | Self::Network { .. } | Self::Decode { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::BitbucketError;

    fn api(status: u16) -> BitbucketError {
        BitbucketError::Api {
            operation: "get repository".to_owned(),
            status,
            message: "nope".to_owned(),
        }
    }

    #[rstest]
    #[case::configuration(BitbucketError::configuration("x"), "configuration", false)]
    #[case::input(BitbucketError::invalid_input("x"), "invalid_input", false)]
    #[case::api(api(500), "api", true)]
    #[case::network(BitbucketError::Network { message: "reset".to_owned() }, "network", true)]
    #[case::io(BitbucketError::Io { message: "closed".to_owned() }, "io", false)]
    fn kinds_are_stable(
        #[case] error: BitbucketError,
        #[case] kind: &str,
        #[case] remote: bool,
    ) {
        assert_eq!(error.kind(), kind);
        assert_eq!(error.is_remote(), remote);
    }

    #[rstest]
    fn api_errors_keep_status_in_display() {
        let error = api(404);
        assert_eq!(error.status(), Some(404));
        assert_eq!(error.to_string(), "get repository failed with status 404: nope");
    }
}
