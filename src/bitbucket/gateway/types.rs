//! Parameter types and request bodies for Bitbucket operations.

use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::bitbucket::error::BitbucketError;

/// Default number of records requested by listing operations.
pub const DEFAULT_LIST_LIMIT: u32 = 10;

/// Pull request state filter for listing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullRequestState {
    /// Open pull requests.
    Open,
    /// Merged pull requests.
    Merged,
    /// Declined pull requests.
    Declined,
    /// Superseded pull requests.
    Superseded,
}

impl PullRequestState {
    /// Returns the API parameter value for this state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Merged => "MERGED",
            Self::Declined => "DECLINED",
            Self::Superseded => "SUPERSEDED",
        }
    }
}

impl FromStr for PullRequestState {
    type Err = BitbucketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OPEN" => Ok(Self::Open),
            "MERGED" => Ok(Self::Merged),
            "DECLINED" => Ok(Self::Declined),
            "SUPERSEDED" => Ok(Self::Superseded),
            other => Err(BitbucketError::invalid_input(format!(
                "unknown pull request state '{other}' (expected OPEN, MERGED, DECLINED, or SUPERSEDED)"
            ))),
        }
    }
}

/// Parameters for listing repositories in a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRepositoriesParams {
    /// Maximum number of repositories requested.
    pub limit: u32,
    /// Only repositories whose name contains this text.
    pub name: Option<String>,
}

impl Default for ListRepositoriesParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            name: None,
        }
    }
}

impl ListRepositoriesParams {
    pub(super) fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("limit", self.limit.to_string())];
        if let Some(name) = self.name.as_deref().filter(|name| !name.is_empty()) {
            query.push(("q", format!("name~\"{name}\"")));
        }
        query
    }
}

/// Parameters for listing pull requests in a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPullRequestsParams {
    /// State filter; Bitbucket defaults to open when omitted.
    pub state: Option<PullRequestState>,
    /// Maximum number of pull requests requested.
    pub limit: u32,
}

impl Default for ListPullRequestsParams {
    fn default() -> Self {
        Self {
            state: None,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl ListPullRequestsParams {
    pub(super) fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("limit", self.limit.to_string())];
        if let Some(state) = self.state {
            query.push(("state", state.as_str().to_owned()));
        }
        query
    }
}

/// A pull request to open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewPullRequest {
    /// Title.
    pub title: String,
    /// Description body.
    pub description: String,
    /// Branch containing the changes.
    pub source_branch: String,
    /// Branch the changes merge into.
    pub target_branch: String,
    /// Reviewer usernames or account ids.
    pub reviewers: Vec<String>,
    /// Open as a draft.
    pub draft: bool,
}

#[derive(Debug, Serialize)]
struct ApiBranchName<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct ApiBranchRef<'a> {
    branch: ApiBranchName<'a>,
}

#[derive(Debug, Serialize)]
struct ApiReviewer<'a> {
    username: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct ApiNewPullRequest<'a> {
    title: &'a str,
    description: &'a str,
    source: ApiBranchRef<'a>,
    destination: ApiBranchRef<'a>,
    close_source_branch: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    reviewers: Vec<ApiReviewer<'a>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    draft: bool,
}

impl<'a> From<&'a NewPullRequest> for ApiNewPullRequest<'a> {
    fn from(request: &'a NewPullRequest) -> Self {
        Self {
            title: &request.title,
            description: &request.description,
            source: ApiBranchRef {
                branch: ApiBranchName {
                    name: &request.source_branch,
                },
            },
            destination: ApiBranchRef {
                branch: ApiBranchName {
                    name: &request.target_branch,
                },
            },
            close_source_branch: true,
            reviewers: request
                .reviewers
                .iter()
                .map(|username| ApiReviewer { username })
                .collect(),
            draft: request.draft,
        }
    }
}

/// Fields to change on an existing pull request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PullRequestEdit {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Options for merging a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MergeOptions {
    /// Merge commit message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Merge strategy (`merge_commit`, `squash`, `fast_forward`).
    #[serde(rename = "merge_strategy", skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
}

/// A comment to add to a pull request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewComment {
    /// Raw markdown content.
    pub content: String,
    /// Inline location (`path`, `from`, `to`); `null` entries are dropped.
    pub inline: Option<Map<String, Value>>,
    /// Draft flag; omitted when `None`.
    pub pending: Option<bool>,
}

#[derive(Debug, Serialize)]
struct ApiRawContent<'a> {
    raw: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct ApiNewComment<'a> {
    content: ApiRawContent<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pending: Option<bool>,
}

impl<'a> From<&'a NewComment> for ApiNewComment<'a> {
    fn from(comment: &'a NewComment) -> Self {
        let inline = comment
            .inline
            .as_ref()
            .map(|location| {
                location
                    .iter()
                    .filter(|(_, value)| !value.is_null())
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect::<Map<String, Value>>()
            })
            .filter(|location| !location.is_empty());
        Self {
            content: ApiRawContent {
                raw: &comment.content,
            },
            inline,
            pending: comment.pending,
        }
    }
}

/// Partial branching model settings update.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BranchingModelSettingsUpdate {
    /// Development branch settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub development: Option<Value>,
    /// Production branch settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production: Option<Value>,
    /// Branch type configuration list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_types: Option<Value>,
}

/// Filters for listing pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListPipelinesParams {
    /// Page length; Bitbucket's default applies when `None`.
    pub limit: Option<u32>,
    /// Pipeline status filter.
    pub status: Option<String>,
    /// Target branch filter.
    pub target_branch: Option<String>,
    /// Trigger type filter.
    pub trigger_type: Option<String>,
}

impl ListPipelinesParams {
    pub(super) fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(limit) = self.limit {
            query.push(("pagelen", limit.to_string()));
        }
        let filters = [
            ("status", &self.status),
            ("target.branch", &self.target_branch),
            ("trigger_type", &self.trigger_type),
        ];
        for (key, value) in filters {
            if let Some(text) = value.as_deref().filter(|text| !text.is_empty()) {
                query.push((key, text.to_owned()));
            }
        }
        query
    }
}

/// What a triggered pipeline should build.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipelineTarget {
    /// `branch` or `tag`.
    pub ref_type: Option<String>,
    /// Branch or tag name.
    pub ref_name: Option<String>,
    /// Specific commit to build; switches to a commit target.
    pub commit_hash: Option<String>,
    /// Selector type (e.g. `custom`).
    pub selector_type: Option<String>,
    /// Selector pattern (e.g. the custom pipeline name).
    pub selector_pattern: Option<String>,
}

/// A variable passed to a triggered pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PipelineVariable {
    /// Variable name.
    pub key: String,
    /// Variable value.
    pub value: String,
    /// Whether Bitbucket should mask the value.
    pub secured: bool,
}

#[derive(Debug, Serialize)]
struct ApiCommit<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    hash: &'a str,
}

#[derive(Debug, Serialize)]
struct ApiSelector<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    pattern: &'a str,
}

#[derive(Debug, Serialize)]
struct ApiPipelineTarget<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    ref_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ref_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    commit: Option<ApiCommit<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    selector: Option<ApiSelector<'a>>,
}

#[derive(Debug, Serialize)]
pub(super) struct ApiRunPipeline<'a> {
    target: ApiPipelineTarget<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<&'a [PipelineVariable]>,
}

impl<'a> ApiRunPipeline<'a> {
    pub(super) fn new(target: &'a PipelineTarget, variables: &'a [PipelineVariable]) -> Self {
        let commit_hash = target.commit_hash.as_deref().filter(|hash| !hash.is_empty());
        let selector = match (
            target.selector_type.as_deref(),
            target.selector_pattern.as_deref(),
        ) {
            (Some(kind), Some(pattern)) if !kind.is_empty() && !pattern.is_empty() => {
                Some(ApiSelector { kind, pattern })
            }
            _ => None,
        };

        Self {
            target: ApiPipelineTarget {
                kind: if commit_hash.is_some() {
                    "pipeline_commit_target"
                } else {
                    "pipeline_ref_target"
                },
                ref_type: target.ref_type.as_deref(),
                ref_name: target.ref_name.as_deref(),
                commit: commit_hash.map(|hash| ApiCommit {
                    kind: "commit",
                    hash,
                }),
                selector,
            },
            variables: (!variables.is_empty()).then_some(variables),
        }
    }
}
