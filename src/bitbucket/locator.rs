//! Identity wrappers for workspaces, repositories, and pull requests.
//!
//! Each wrapper rejects blank values on construction so downstream code never
//! builds a request path with an empty segment. Accepted values are stored
//! verbatim.

use std::fmt;

use super::error::BitbucketError;

fn require_non_blank(value: &str, what: &str) -> Result<String, BitbucketError> {
    if value.trim().is_empty() {
        return Err(BitbucketError::invalid_input(format!(
            "{what} must not be empty"
        )));
    }
    Ok(value.to_owned())
}

macro_rules! string_identifier {
    ($(#[$doc:meta])* $name:ident, $what:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Validates and wraps a ", $what, ".")]
            ///
            /// # Errors
            ///
            /// Returns [`BitbucketError::InvalidInput`] when the value is blank.
            pub fn new(value: impl AsRef<str>) -> Result<Self, BitbucketError> {
                require_non_blank(value.as_ref(), $what).map(Self)
            }

            #[doc = concat!("Borrow the ", $what, ".")]
            #[must_use]
            pub const fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }
    };
}

string_identifier!(
    /// Workspace slug grouping repositories.
    Workspace,
    "workspace"
);
string_identifier!(
    /// Repository slug within a workspace.
    RepositorySlug,
    "repository slug"
);
string_identifier!(
    /// Pull request identifier as accepted by the API path.
    PullRequestId,
    "pull request id"
);
string_identifier!(
    /// Project key within a workspace.
    ProjectKey,
    "project key"
);
string_identifier!(
    /// Username compared against pull request participants.
    ReviewerIdentity,
    "reviewer identity"
);

/// A `(workspace, slug)` pair naming one repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryLocator {
    workspace: Workspace,
    slug: RepositorySlug,
}

impl RepositoryLocator {
    /// Pairs a workspace with a repository slug.
    #[must_use]
    pub const fn new(workspace: Workspace, slug: RepositorySlug) -> Self {
        Self { workspace, slug }
    }

    /// Builds a locator from raw strings.
    ///
    /// # Errors
    ///
    /// Returns [`BitbucketError::InvalidInput`] when either part is blank.
    pub fn from_parts(workspace: &str, slug: &str) -> Result<Self, BitbucketError> {
        Ok(Self::new(Workspace::new(workspace)?, RepositorySlug::new(slug)?))
    }

    /// Workspace half of the locator.
    #[must_use]
    pub const fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Repository slug half of the locator.
    #[must_use]
    pub const fn slug(&self) -> &RepositorySlug {
        &self.slug
    }

    /// `workspace/slug` as shown to users.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.workspace, self.slug)
    }

    /// Path segments under the API base: `repositories/{workspace}/{slug}`.
    #[must_use]
    pub fn segments(&self) -> Vec<&str> {
        vec!["repositories", self.workspace.as_str(), self.slug.as_str()]
    }
}

/// A repository plus pull request id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestLocator {
    repository: RepositoryLocator,
    id: PullRequestId,
}

impl PullRequestLocator {
    /// Combines a repository locator and pull request id.
    #[must_use]
    pub const fn new(repository: RepositoryLocator, id: PullRequestId) -> Self {
        Self { repository, id }
    }

    /// Builds a locator from raw strings.
    ///
    /// # Errors
    ///
    /// Returns [`BitbucketError::InvalidInput`] when any part is blank.
    pub fn from_parts(workspace: &str, slug: &str, id: &str) -> Result<Self, BitbucketError> {
        Ok(Self::new(
            RepositoryLocator::from_parts(workspace, slug)?,
            PullRequestId::new(id)?,
        ))
    }

    /// Repository containing the pull request.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryLocator {
        &self.repository
    }

    /// Pull request identifier.
    #[must_use]
    pub const fn id(&self) -> &PullRequestId {
        &self.id
    }

    /// Path segments: `repositories/{workspace}/{slug}/pullrequests/{id}`.
    #[must_use]
    pub fn segments(&self) -> Vec<&str> {
        let mut segments = self.repository.segments();
        segments.extend(["pullrequests", self.id.as_str()]);
        segments
    }
}

/// Credentials applied to every request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// `Authorization: Bearer <token>`.
    Bearer {
        /// Access token.
        token: String,
    },
    /// HTTP basic authentication.
    Basic {
        /// Account username.
        username: String,
        /// App password.
        password: String,
    },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer { .. } => f.write_str("Credentials::Bearer(<redacted>)"),
            Self::Basic { username, .. } => {
                write!(f, "Credentials::Basic({username}, <redacted>)")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{PullRequestLocator, RepositoryLocator, Workspace};
    use crate::bitbucket::error::BitbucketError;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_workspace_is_rejected(#[case] raw: &str) {
        let result = Workspace::new(raw);
        assert!(
            matches!(result, Err(BitbucketError::InvalidInput { .. })),
            "expected InvalidInput, got {result:?}"
        );
    }

    #[rstest]
    #[case("acme")]
    #[case(" acme")]
    #[case("acme ")]
    fn identifiers_keep_their_exact_text(#[case] raw: &str) {
        let workspace = Workspace::new(raw).expect("workspace should be valid");
        assert_eq!(workspace.as_str(), raw);
    }

    #[rstest]
    fn repository_full_name_joins_workspace_and_slug() {
        let locator = RepositoryLocator::from_parts("acme", "api").expect("locator should build");
        assert_eq!(locator.full_name(), "acme/api");
        assert_eq!(locator.segments(), vec!["repositories", "acme", "api"]);
    }

    #[rstest]
    fn pull_request_segments_extend_repository_path() {
        let locator =
            PullRequestLocator::from_parts("acme", "api", "42").expect("locator should build");
        assert_eq!(
            locator.segments(),
            vec!["repositories", "acme", "api", "pullrequests", "42"]
        );
    }
}
