//! Tool catalogue advertised through `tools/list`.

use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value, json};

use super::args::LIMIT_RANGE;
use crate::bitbucket::error::BitbucketError;
use crate::bitbucket::gateway::DEFAULT_LIST_LIMIT;
use crate::bitbucket::pending_reviews::DEFAULT_PENDING_REVIEW_LIMIT;

/// Name, description, and JSON Schema of one tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    /// Name clients call the tool by.
    pub name: &'static str,
    /// Human-readable summary.
    pub description: &'static str,
    /// JSON Schema for the `arguments` object.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

macro_rules! tool_names {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Every tool the server exposes.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Tool {
            $(
                #[doc = concat!("The `", $name, "` tool.")]
                $variant
            ),*
        }

        impl Tool {
            /// All tools in catalogue order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// Name clients call the tool by.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name),*
                }
            }
        }

        impl FromStr for Tool {
            type Err = BitbucketError;

            fn from_str(name: &str) -> Result<Self, Self::Err> {
                match name {
                    $($name => Ok(Self::$variant),)*
                    other => Err(BitbucketError::invalid_input(format!("unknown tool: {other}"))),
                }
            }
        }
    };
}

tool_names! {
    ListRepositories => "listRepositories",
    GetRepository => "getRepository",
    GetPullRequests => "getPullRequests",
    CreatePullRequest => "createPullRequest",
    GetPullRequest => "getPullRequest",
    UpdatePullRequest => "updatePullRequest",
    GetPullRequestActivity => "getPullRequestActivity",
    ApprovePullRequest => "approvePullRequest",
    UnapprovePullRequest => "unapprovePullRequest",
    DeclinePullRequest => "declinePullRequest",
    MergePullRequest => "mergePullRequest",
    GetPullRequestComments => "getPullRequestComments",
    GetPullRequestCommits => "getPullRequestCommits",
    GetPullRequestDiff => "getPullRequestDiff",
    AddPullRequestComment => "addPullRequestComment",
    AddPendingPullRequestComment => "addPendingPullRequestComment",
    PublishPendingComments => "publishPendingComments",
    CreateDraftPullRequest => "createDraftPullRequest",
    PublishDraftPullRequest => "publishDraftPullRequest",
    ConvertToDraft => "convertTodraft",
    GetPendingReviewPrs => "getPendingReviewPRs",
    GetRepositoryBranchingModel => "getRepositoryBranchingModel",
    GetRepositoryBranchingModelSettings => "getRepositoryBranchingModelSettings",
    UpdateRepositoryBranchingModelSettings => "updateRepositoryBranchingModelSettings",
    GetEffectiveRepositoryBranchingModel => "getEffectiveRepositoryBranchingModel",
    GetProjectBranchingModel => "getProjectBranchingModel",
    GetProjectBranchingModelSettings => "getProjectBranchingModelSettings",
    UpdateProjectBranchingModelSettings => "updateProjectBranchingModelSettings",
    ListPipelineRuns => "listPipelineRuns",
    GetPipelineRun => "getPipelineRun",
    RunPipeline => "runPipeline",
    StopPipeline => "stopPipeline",
    GetPipelineSteps => "getPipelineSteps",
    GetPipelineStep => "getPipelineStep",
    GetPipelineStepLogs => "getPipelineStepLogs",
    Health => "health",
}

/// Accumulates the properties of an object schema.
#[derive(Debug, Default)]
struct Schema {
    properties: Map<String, Value>,
    required: Vec<&'static str>,
}

impl Schema {
    fn property(mut self, name: &'static str, schema: Value, required: bool) -> Self {
        self.properties.insert(name.to_owned(), schema);
        if required {
            self.required.push(name);
        }
        self
    }

    fn workspace(self) -> Self {
        self.property(
            "workspace",
            json!({
                "type": "string",
                "description": "Bitbucket workspace slug. Uses BITBUCKET_WORKSPACE when omitted."
            }),
            false,
        )
    }

    fn string(self, name: &'static str, description: &str, required: bool) -> Self {
        self.property(
            name,
            json!({ "type": "string", "description": description }),
            required,
        )
    }

    fn boolean(self, name: &'static str, description: &str) -> Self {
        self.property(
            name,
            json!({ "type": "boolean", "description": description }),
            false,
        )
    }

    fn object(self, name: &'static str, description: &str, required: bool) -> Self {
        self.property(
            name,
            json!({ "type": "object", "description": description }),
            required,
        )
    }

    fn array(self, name: &'static str, description: &str, items: Value) -> Self {
        self.property(
            name,
            json!({ "type": "array", "description": description, "items": items }),
            false,
        )
    }

    fn limit(self, description: &str, default: Option<u32>) -> Self {
        let mut schema = json!({
            "type": "integer",
            "description": description,
            "minimum": LIMIT_RANGE.start(),
            "maximum": LIMIT_RANGE.end(),
        });
        if let (Some(value), Some(map)) = (default, schema.as_object_mut()) {
            map.insert("default".to_owned(), json!(value));
        }
        self.property("limit", schema, false)
    }

    fn repository(self) -> Self {
        self.workspace()
            .string("repo_slug", "Repository slug", true)
    }

    fn pull_request(self) -> Self {
        self.repository()
            .string("pull_request_id", "Pull request ID", true)
    }

    fn project(self) -> Self {
        self.workspace()
            .string("project_key", "Project key (e.g., ABC)", true)
    }

    fn pipeline(self) -> Self {
        self.repository()
            .string("pipeline_uuid", "Pipeline UUID", true)
    }

    fn step(self) -> Self {
        self.pipeline().string("step_uuid", "Step UUID", true)
    }

    fn new_pull_request(self) -> Self {
        self.repository()
            .string("title", "Pull request title", true)
            .string("description", "Pull request description/body", false)
            .string("sourceBranch", "Source branch name (feature branch)", true)
            .string("targetBranch", "Target branch name (e.g., main)", true)
            .array(
                "reviewers",
                "Optional list of reviewer usernames",
                json!({ "type": "string" }),
            )
    }

    fn branching_model_settings(self) -> Self {
        self.object("development", "Development branch settings payload", false)
            .object("production", "Production branch settings payload", false)
            .array(
                "branch_types",
                "Branch types configuration list",
                json!({ "type": "object" }),
            )
    }

    fn build(self) -> Value {
        json!({
            "type": "object",
            "properties": self.properties,
            "required": self.required,
        })
    }
}

impl Tool {
    /// Human-readable summary shown to clients.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::ListRepositories => {
                "List repositories in a workspace. Optionally filter by `name` (contains) and limit results."
            }
            Self::GetRepository => "Get repository details by `workspace` and `repo_slug`.",
            Self::GetPullRequests => {
                "List pull requests for a repository. Optionally filter by `state` and limit results."
            }
            Self::CreatePullRequest => {
                "Create a pull request. Set `draft=true` to create a draft pull request."
            }
            Self::GetPullRequest => "Get a pull request by ID.",
            Self::UpdatePullRequest => "Update a pull request's title and/or description.",
            Self::GetPullRequestActivity => {
                "List activity (comments, approvals, updates) for a pull request."
            }
            Self::ApprovePullRequest => "Approve a pull request as the current user.",
            Self::UnapprovePullRequest => "Remove your approval from a pull request.",
            Self::DeclinePullRequest => {
                "Decline (close) a pull request. Optionally provide a message."
            }
            Self::MergePullRequest => {
                "Merge a pull request. Optionally set a commit `message` and merge `strategy`."
            }
            Self::GetPullRequestComments => "List comments for a pull request.",
            Self::GetPullRequestCommits => "List commits included in a pull request.",
            Self::GetPullRequestDiff => "Get the unified diff for a pull request.",
            Self::AddPullRequestComment => {
                "Add a comment to a pull request. Set `inline` for file/line comments; set `pending=true` to keep it as a draft."
            }
            Self::AddPendingPullRequestComment => {
                "Add a pending (unpublished) comment to a pull request."
            }
            Self::PublishPendingComments => "Publish all pending comments on a pull request.",
            Self::CreateDraftPullRequest => "Create a draft pull request.",
            Self::PublishDraftPullRequest => {
                "Publish a draft pull request (mark it ready for review)."
            }
            Self::ConvertToDraft => "Convert an open pull request to draft.",
            Self::GetPendingReviewPrs => {
                "List pull requests awaiting your review across repositories in a workspace."
            }
            Self::GetRepositoryBranchingModel => "Get the repository-level branching model.",
            Self::GetRepositoryBranchingModelSettings => {
                "Get repository branching model settings (raw, may inherit from project)."
            }
            Self::UpdateRepositoryBranchingModelSettings => {
                "Update repository branching model settings."
            }
            Self::GetEffectiveRepositoryBranchingModel => {
                "Resolve the effective repository branching model, taking inheritance into account."
            }
            Self::GetProjectBranchingModel => {
                "Get the project-level branching model (defaults for repositories)."
            }
            Self::GetProjectBranchingModelSettings => "Get project branching model settings (raw).",
            Self::UpdateProjectBranchingModelSettings => "Update project branching model settings.",
            Self::ListPipelineRuns => {
                "List pipeline runs for a repository. Filter by status, branch, trigger type, and limit."
            }
            Self::GetPipelineRun => "Get details for a specific pipeline run.",
            Self::RunPipeline => {
                "Trigger a pipeline run for a target (branch/commit) with optional variables."
            }
            Self::StopPipeline => "Stop a running pipeline.",
            Self::GetPipelineSteps => "List steps for a pipeline run.",
            Self::GetPipelineStep => "Get details for a pipeline step.",
            Self::GetPipelineStepLogs => "Get raw logs for a pipeline step.",
            Self::Health => {
                "Health check: validates configuration and Bitbucket connectivity (optionally for a given workspace)."
            }
        }
    }

    /// JSON Schema describing the tool's arguments.
    #[must_use]
    pub fn input_schema(self) -> Value {
        let schema = Schema::default();
        match self {
            Self::ListRepositories => schema
                .workspace()
                .limit(
                    "Maximum number of repositories to return.",
                    Some(DEFAULT_LIST_LIMIT),
                )
                .string(
                    "name",
                    "Filter repositories whose name contains this string.",
                    false,
                ),
            Self::GetRepository
            | Self::GetRepositoryBranchingModel
            | Self::GetRepositoryBranchingModelSettings
            | Self::GetEffectiveRepositoryBranchingModel => schema.repository(),
            Self::GetPullRequests => schema
                .repository()
                .string(
                    "state",
                    "Filter by state: OPEN, MERGED, DECLINED, SUPERSEDED",
                    false,
                )
                .limit(
                    "Maximum number of pull requests to return.",
                    Some(DEFAULT_LIST_LIMIT),
                ),
            Self::CreatePullRequest => schema
                .new_pull_request()
                .boolean("draft", "Create as a draft pull request when true"),
            Self::CreateDraftPullRequest => schema.new_pull_request(),
            Self::GetPullRequest
            | Self::GetPullRequestActivity
            | Self::ApprovePullRequest
            | Self::UnapprovePullRequest
            | Self::GetPullRequestComments
            | Self::GetPullRequestCommits
            | Self::GetPullRequestDiff
            | Self::PublishPendingComments
            | Self::PublishDraftPullRequest
            | Self::ConvertToDraft => schema.pull_request(),
            Self::UpdatePullRequest => schema
                .pull_request()
                .string("title", "New title", false)
                .string("description", "New description/body", false),
            Self::DeclinePullRequest => {
                schema
                    .pull_request()
                    .string("message", "Optional decline message", false)
            }
            Self::MergePullRequest => schema
                .pull_request()
                .string("message", "Optional merge commit message", false)
                .string(
                    "strategy",
                    "Merge strategy (merge_commit, squash, fast_forward)",
                    false,
                ),
            Self::AddPullRequestComment => schema
                .pull_request()
                .string("content", "Comment text content", true)
                .object(
                    "inline",
                    "Inline context for file/line comments (path, from, to)",
                    false,
                )
                .boolean("pending", "Keep the comment as a pending draft when true"),
            Self::AddPendingPullRequestComment => schema
                .pull_request()
                .string("content", "Comment text content", true)
                .object(
                    "inline",
                    "Inline context for file/line comments (path, from, to)",
                    false,
                ),
            Self::GetPendingReviewPrs => schema
                .workspace()
                .limit(
                    "Maximum number of pull requests to return.",
                    Some(DEFAULT_PENDING_REVIEW_LIMIT),
                )
                .array(
                    "repositoryList",
                    "Optional list of repository slugs to limit the search to",
                    json!({ "type": "string" }),
                ),
            Self::UpdateRepositoryBranchingModelSettings => {
                schema.repository().branching_model_settings()
            }
            Self::GetProjectBranchingModel | Self::GetProjectBranchingModelSettings => {
                schema.project()
            }
            Self::UpdateProjectBranchingModelSettings => {
                schema.project().branching_model_settings()
            }
            Self::ListPipelineRuns => schema
                .repository()
                .limit("Maximum number of pipeline runs to return.", None)
                .string(
                    "status",
                    "Filter by pipeline status (e.g., COMPLETED, FAILED, RUNNING)",
                    false,
                )
                .string("target_branch", "Filter by target branch name", false)
                .string(
                    "trigger_type",
                    "Filter by trigger type (e.g., PUSH, MANUAL)",
                    false,
                ),
            Self::GetPipelineRun | Self::StopPipeline | Self::GetPipelineSteps => {
                schema.pipeline()
            }
            Self::RunPipeline => schema
                .repository()
                .object(
                    "target",
                    "Target to build: ref_type, ref_name, optional commit_hash, selector_type, selector_pattern",
                    true,
                )
                .array(
                    "variables",
                    "Optional pipeline variables",
                    json!({
                        "type": "object",
                        "properties": {
                            "key": { "type": "string" },
                            "value": { "type": "string" },
                            "secured": { "type": "boolean" }
                        },
                        "required": ["key", "value"]
                    }),
                ),
            Self::GetPipelineStep | Self::GetPipelineStepLogs => schema.step(),
            Self::Health => schema.workspace(),
        }
        .build()
    }

    /// Full descriptor for `tools/list`.
    #[must_use]
    pub fn descriptor(self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name(),
            description: self.description(),
            input_schema: self.input_schema(),
        }
    }
}

/// Descriptors for every tool, in catalogue order.
#[must_use]
pub fn catalogue() -> Vec<ToolDescriptor> {
    Tool::ALL.iter().map(|tool| tool.descriptor()).collect()
}
