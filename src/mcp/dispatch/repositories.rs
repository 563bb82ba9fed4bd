//! Repository listing and branching model tools.

use serde_json::Value;

use super::ToolDispatcher;
use crate::bitbucket::error::BitbucketError;
use crate::bitbucket::gateway::{
    BranchingModelSettingsUpdate, DEFAULT_LIST_LIMIT, ListRepositoriesParams, RepositoryGateway,
};
use crate::bitbucket::locator::{ProjectKey, Workspace};
use crate::mcp::args::{LIMIT_RANGE, ToolArguments};
use crate::mcp::envelope::ToolOutput;
use crate::mcp::tools::Tool;

fn settings_update(args: ToolArguments<'_>) -> Result<BranchingModelSettingsUpdate, BitbucketError> {
    Ok(BranchingModelSettingsUpdate {
        development: args
            .optional_object("development")?
            .map(|settings| Value::Object(settings.clone())),
        production: args
            .optional_object("production")?
            .map(|settings| Value::Object(settings.clone())),
        branch_types: args
            .optional_array("branch_types")?
            .map(|types| Value::Array(types.to_vec())),
    })
}

impl ToolDispatcher {
    fn project(&self, args: ToolArguments<'_>) -> Result<(Workspace, ProjectKey), BitbucketError> {
        let workspace = self.workspace(args)?;
        let project = ProjectKey::new(args.required_str("project_key")?)?;
        Ok((workspace, project))
    }

    pub(super) async fn repository_tool(
        &self,
        tool: Tool,
        args: ToolArguments<'_>,
    ) -> Result<ToolOutput, BitbucketError> {
        let document = match tool {
            Tool::ListRepositories => {
                let workspace = self.workspace(args)?;
                let params = ListRepositoriesParams {
                    limit: args
                        .bounded_u32("limit", &LIMIT_RANGE)?
                        .unwrap_or(DEFAULT_LIST_LIMIT),
                    name: args.optional_str("name")?.map(str::to_owned),
                };
                let repositories = self.client.list_repositories(&workspace, &params).await?;
                return ToolOutput::json(&repositories);
            }
            Tool::GetRepository => self.client.repository(&self.repository(args)?).await?,
            Tool::GetRepositoryBranchingModel => {
                self.client
                    .repository_branching_model(&self.repository(args)?)
                    .await?
            }
            Tool::GetRepositoryBranchingModelSettings => {
                self.client
                    .repository_branching_model_settings(&self.repository(args)?)
                    .await?
            }
            Tool::UpdateRepositoryBranchingModelSettings => {
                let repository = self.repository(args)?;
                let update = settings_update(args)?;
                self.client
                    .update_repository_branching_model_settings(&repository, &update)
                    .await?
            }
            Tool::GetEffectiveRepositoryBranchingModel => {
                self.client
                    .effective_repository_branching_model(&self.repository(args)?)
                    .await?
            }
            Tool::GetProjectBranchingModel => {
                let (workspace, project) = self.project(args)?;
                self.client
                    .project_branching_model(&workspace, &project)
                    .await?
            }
            Tool::GetProjectBranchingModelSettings => {
                let (workspace, project) = self.project(args)?;
                self.client
                    .project_branching_model_settings(&workspace, &project)
                    .await?
            }
            Tool::UpdateProjectBranchingModelSettings => {
                let (workspace, project) = self.project(args)?;
                let update = settings_update(args)?;
                self.client
                    .update_project_branching_model_settings(&workspace, &project, &update)
                    .await?
            }
            other => {
                return Err(BitbucketError::invalid_input(format!(
                    "{} is not a repository tool",
                    other.name()
                )));
            }
        };
        Ok(ToolOutput::Json(document))
    }
}
