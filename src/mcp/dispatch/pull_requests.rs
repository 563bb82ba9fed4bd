//! Pull request and comment tools.

use super::ToolDispatcher;
use crate::bitbucket::comment_publish::PendingCommentPublisher;
use crate::bitbucket::error::BitbucketError;
use crate::bitbucket::gateway::{
    CommentGateway, DEFAULT_LIST_LIMIT, ListPullRequestsParams, MergeOptions, NewComment,
    NewPullRequest, PullRequestEdit, PullRequestState, RepositoryGateway,
};
use crate::mcp::args::{LIMIT_RANGE, ToolArguments};
use crate::mcp::envelope::ToolOutput;
use crate::mcp::tools::Tool;

const UNAPPROVED: &str = "Pull request approval removed successfully.";

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_owned)
}

fn new_pull_request(args: ToolArguments<'_>, draft: bool) -> Result<NewPullRequest, BitbucketError> {
    Ok(NewPullRequest {
        title: args.required_str("title")?.to_owned(),
        description: args.optional_str("description")?.unwrap_or_default().to_owned(),
        source_branch: args.required_str("sourceBranch")?.to_owned(),
        target_branch: args.required_str("targetBranch")?.to_owned(),
        reviewers: args.optional_string_list("reviewers")?.unwrap_or_default(),
        draft,
    })
}

fn new_comment(args: ToolArguments<'_>, pending: Option<bool>) -> Result<NewComment, BitbucketError> {
    Ok(NewComment {
        content: args.required_str("content")?.to_owned(),
        inline: args.optional_object("inline")?.cloned(),
        pending,
    })
}

impl ToolDispatcher {
    pub(super) async fn pull_request_tool(
        &self,
        tool: Tool,
        args: ToolArguments<'_>,
    ) -> Result<ToolOutput, BitbucketError> {
        match tool {
            Tool::GetPullRequests => {
                let repository = self.repository(args)?;
                let params = ListPullRequestsParams {
                    state: args
                        .optional_str("state")?
                        .map(str::parse::<PullRequestState>)
                        .transpose()?,
                    limit: args
                        .bounded_u32("limit", &LIMIT_RANGE)?
                        .unwrap_or(DEFAULT_LIST_LIMIT),
                };
                let pull_requests = self.client.list_pull_requests(&repository, &params).await?;
                ToolOutput::json(&pull_requests)
            }
            Tool::CreatePullRequest | Tool::CreateDraftPullRequest => {
                let repository = self.repository(args)?;
                let draft = tool == Tool::CreateDraftPullRequest
                    || args.optional_bool("draft")?.unwrap_or(false);
                let request = new_pull_request(args, draft)?;
                Ok(ToolOutput::Json(
                    self.client.create_pull_request(&repository, &request).await?,
                ))
            }
            Tool::GetPullRequest => {
                let pull_request = self.pull_request(args)?;
                Ok(ToolOutput::Json(self.client.pull_request(&pull_request).await?))
            }
            Tool::UpdatePullRequest => {
                let pull_request = self.pull_request(args)?;
                let edit = PullRequestEdit {
                    title: owned(args.optional_str("title")?),
                    description: owned(args.optional_str("description")?),
                };
                if edit.title.is_none() && edit.description.is_none() {
                    return Err(BitbucketError::invalid_input(
                        "title or description is required",
                    ));
                }
                Ok(ToolOutput::Json(
                    self.client.update_pull_request(&pull_request, &edit).await?,
                ))
            }
            Tool::GetPullRequestActivity => {
                let pull_request = self.pull_request(args)?;
                ToolOutput::json(&self.client.pull_request_activity(&pull_request).await?)
            }
            Tool::ApprovePullRequest => {
                let pull_request = self.pull_request(args)?;
                Ok(ToolOutput::Json(
                    self.client.approve_pull_request(&pull_request).await?,
                ))
            }
            Tool::UnapprovePullRequest => {
                let pull_request = self.pull_request(args)?;
                self.client.unapprove_pull_request(&pull_request).await?;
                Ok(ToolOutput::Text(UNAPPROVED.to_owned()))
            }
            Tool::DeclinePullRequest => {
                let pull_request = self.pull_request(args)?;
                let message = args.optional_str("message")?;
                Ok(ToolOutput::Json(
                    self.client
                        .decline_pull_request(&pull_request, message)
                        .await?,
                ))
            }
            Tool::MergePullRequest => {
                let pull_request = self.pull_request(args)?;
                let options = MergeOptions {
                    message: owned(args.optional_str("message")?),
                    strategy: owned(args.optional_str("strategy")?),
                };
                Ok(ToolOutput::Json(
                    self.client
                        .merge_pull_request(&pull_request, &options)
                        .await?,
                ))
            }
            Tool::GetPullRequestComments => {
                let pull_request = self.pull_request(args)?;
                ToolOutput::json(&self.client.list_comments(&pull_request).await?)
            }
            Tool::GetPullRequestCommits => {
                let pull_request = self.pull_request(args)?;
                ToolOutput::json(&self.client.pull_request_commits(&pull_request).await?)
            }
            Tool::GetPullRequestDiff => {
                let pull_request = self.pull_request(args)?;
                Ok(ToolOutput::Text(
                    self.client.pull_request_diff(&pull_request).await?,
                ))
            }
            Tool::AddPullRequestComment | Tool::AddPendingPullRequestComment => {
                let pull_request = self.pull_request(args)?;
                let pending = if tool == Tool::AddPendingPullRequestComment {
                    Some(true)
                } else {
                    args.optional_bool("pending")?
                };
                let comment = new_comment(args, pending)?;
                Ok(ToolOutput::Json(
                    self.client.add_comment(&pull_request, &comment).await?,
                ))
            }
            Tool::PublishPendingComments => {
                let pull_request = self.pull_request(args)?;
                let report = PendingCommentPublisher::new(&self.client)
                    .publish(&pull_request)
                    .await?;
                ToolOutput::json(&report)
            }
            Tool::PublishDraftPullRequest | Tool::ConvertToDraft => {
                let pull_request = self.pull_request(args)?;
                let draft = tool == Tool::ConvertToDraft;
                Ok(ToolOutput::Json(
                    self.client
                        .set_pull_request_draft(&pull_request, draft)
                        .await?,
                ))
            }
            other => Err(BitbucketError::invalid_input(format!(
                "{} is not a pull request tool",
                other.name()
            ))),
        }
    }
}
