//! Routes tool calls to the Bitbucket client and normalises their outcome.
//!
//! Defaulted parameters are resolved here: a missing `workspace` falls back
//! to the configured default, and the review identity comes from the
//! configured username. Nothing below this layer reads configuration.

mod pipelines;
mod pull_requests;
mod repositories;

use std::sync::Arc;

use serde_json::{Value, json};

use super::args::{LIMIT_RANGE, ToolArguments};
use super::envelope::{ToolOutput, ToolResponse};
use super::tools::Tool;
use crate::bitbucket::error::BitbucketError;
use crate::bitbucket::gateway::{BitbucketClient, ListRepositoriesParams, RepositoryGateway};
use crate::bitbucket::locator::{
    PullRequestId, PullRequestLocator, RepositoryLocator, RepositorySlug, Workspace,
};
use crate::bitbucket::pending_reviews::{
    DEFAULT_PENDING_REVIEW_LIMIT, PendingReviewQuery, PendingReviewSearch,
};
use crate::config::BitbucketConfig;
use crate::telemetry::{TelemetrySink, TracingTelemetrySink};

/// Executes tool calls against one Bitbucket account.
pub struct ToolDispatcher {
    client: BitbucketClient,
    config: BitbucketConfig,
    telemetry: Arc<dyn TelemetrySink>,
}

impl ToolDispatcher {
    /// Create a dispatcher that reports telemetry through `tracing`.
    #[must_use]
    pub fn new(client: BitbucketClient, config: BitbucketConfig) -> Self {
        Self {
            client,
            config,
            telemetry: Arc::new(TracingTelemetrySink),
        }
    }

    /// Replace the telemetry sink.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Run the named tool. Every outcome, including unknown tools and
    /// malformed arguments, is returned as a [`ToolResponse`].
    pub async fn call(&self, name: &str, arguments: &Value) -> ToolResponse {
        let result = match name.parse::<Tool>() {
            Ok(tool) => self.route(tool, arguments).await,
            Err(error) => Err(error),
        };
        if let Err(error) = &result {
            tracing::error!(tool = name, kind = error.kind(), "tool call failed: {error}");
        }
        ToolResponse::from_result(result)
    }

    async fn route(&self, tool: Tool, raw: &Value) -> Result<ToolOutput, BitbucketError> {
        let args = ToolArguments::new(raw)?;
        match tool {
            Tool::Health => Ok(self.health(args).await),
            Tool::GetPendingReviewPrs => self.pending_reviews(args).await,
            Tool::ListRepositories
            | Tool::GetRepository
            | Tool::GetRepositoryBranchingModel
            | Tool::GetRepositoryBranchingModelSettings
            | Tool::UpdateRepositoryBranchingModelSettings
            | Tool::GetEffectiveRepositoryBranchingModel
            | Tool::GetProjectBranchingModel
            | Tool::GetProjectBranchingModelSettings
            | Tool::UpdateProjectBranchingModelSettings => self.repository_tool(tool, args).await,
            Tool::ListPipelineRuns
            | Tool::GetPipelineRun
            | Tool::RunPipeline
            | Tool::StopPipeline
            | Tool::GetPipelineSteps
            | Tool::GetPipelineStep
            | Tool::GetPipelineStepLogs => self.pipeline_tool(tool, args).await,
            Tool::GetPullRequests
            | Tool::CreatePullRequest
            | Tool::GetPullRequest
            | Tool::UpdatePullRequest
            | Tool::GetPullRequestActivity
            | Tool::ApprovePullRequest
            | Tool::UnapprovePullRequest
            | Tool::DeclinePullRequest
            | Tool::MergePullRequest
            | Tool::GetPullRequestComments
            | Tool::GetPullRequestCommits
            | Tool::GetPullRequestDiff
            | Tool::AddPullRequestComment
            | Tool::AddPendingPullRequestComment
            | Tool::PublishPendingComments
            | Tool::CreateDraftPullRequest
            | Tool::PublishDraftPullRequest
            | Tool::ConvertToDraft => self.pull_request_tool(tool, args).await,
        }
    }

    fn workspace(&self, args: ToolArguments<'_>) -> Result<Workspace, BitbucketError> {
        self.config.resolve_workspace(args.optional_str("workspace")?)
    }

    fn repository(&self, args: ToolArguments<'_>) -> Result<RepositoryLocator, BitbucketError> {
        let workspace = self.workspace(args)?;
        let slug = RepositorySlug::new(args.required_str("repo_slug")?)?;
        Ok(RepositoryLocator::new(workspace, slug))
    }

    fn pull_request(&self, args: ToolArguments<'_>) -> Result<PullRequestLocator, BitbucketError> {
        let repository = self.repository(args)?;
        let id = PullRequestId::new(args.required_str("pull_request_id")?)?;
        Ok(PullRequestLocator::new(repository, id))
    }

    async fn pending_reviews(&self, args: ToolArguments<'_>) -> Result<ToolOutput, BitbucketError> {
        let workspace = self.workspace(args)?;
        let identity = self.config.require_identity()?;
        let limit = args
            .bounded_u32("limit", &LIMIT_RANGE)?
            .unwrap_or(DEFAULT_PENDING_REVIEW_LIMIT);
        let repositories = args
            .optional_string_list("repositoryList")?
            .map(|slugs| {
                slugs
                    .iter()
                    .map(RepositorySlug::new)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        let query = PendingReviewQuery {
            workspace,
            identity,
            limit,
            repositories,
        };
        let report = PendingReviewSearch::new(&self.client, self.telemetry.as_ref())
            .find(&query)
            .await?;
        ToolOutput::json(&report)
    }

    /// Reports configuration state and, when a workspace resolves, whether a
    /// one-repository listing succeeds. Never fails.
    async fn health(&self, args: ToolArguments<'_>) -> ToolOutput {
        let explicit = args.optional_str("workspace").ok().flatten();
        let workspace = self.config.resolve_workspace(explicit).ok();
        let mut details = json!({
            "hasToken": self.config.token.as_deref().is_some_and(|token| !token.is_empty()),
            "hasUser": self.config.username.as_deref().is_some_and(|user| !user.is_empty()),
            "workspaceResolved": workspace.as_ref().map(Workspace::as_str),
        });

        let status = match &workspace {
            None => {
                details["connectivity"] = json!(false);
                details["message"] =
                    json!("Workspace not provided and BITBUCKET_WORKSPACE not set");
                "error"
            }
            Some(resolved) => {
                let probe = ListRepositoriesParams {
                    limit: 1,
                    name: None,
                };
                match self.client.list_repositories(resolved, &probe).await {
                    Ok(_) => {
                        details["connectivity"] = json!(true);
                        "ok"
                    }
                    Err(error) => {
                        tracing::warn!(workspace = %resolved, "health probe failed: {error}");
                        details["connectivity"] = json!(false);
                        details["error"] = json!(format!("{}: {error}", error.kind()));
                        "error"
                    }
                }
            }
        };

        ToolOutput::Json(json!({ "status": status, "details": details }))
    }
}
