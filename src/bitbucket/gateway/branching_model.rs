//! Branching model reads and settings updates.

use reqwest::Method;
use serde_json::Value;

use crate::bitbucket::error::BitbucketError;
use crate::bitbucket::locator::{ProjectKey, RepositoryLocator, Workspace};

use super::{BitbucketClient, BranchingModelSettingsUpdate};

fn project_segments<'a>(workspace: &'a Workspace, project: &'a ProjectKey) -> Vec<&'a str> {
    vec![
        "workspaces",
        workspace.as_str(),
        "projects",
        project.as_str(),
        "branching-model",
    ]
}

fn repository_segments<'a>(repository: &'a RepositoryLocator, leaf: &'a str) -> Vec<&'a str> {
    let mut segments = repository.segments();
    segments.push(leaf);
    segments
}

impl BitbucketClient {
    /// Fetch a repository's branching model.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn repository_branching_model(
        &self,
        repository: &RepositoryLocator,
    ) -> Result<Value, BitbucketError> {
        self.get_json(
            "get repository branching model",
            &repository_segments(repository, "branching-model"),
            &[],
        )
        .await
    }

    /// Fetch a repository's branching model settings.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn repository_branching_model_settings(
        &self,
        repository: &RepositoryLocator,
    ) -> Result<Value, BitbucketError> {
        let mut segments = repository_segments(repository, "branching-model");
        segments.push("settings");
        self.get_json("get repository branching model settings", &segments, &[])
            .await
    }

    /// Update a repository's branching model settings.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn update_repository_branching_model_settings(
        &self,
        repository: &RepositoryLocator,
        update: &BranchingModelSettingsUpdate,
    ) -> Result<Value, BitbucketError> {
        let mut segments = repository_segments(repository, "branching-model");
        segments.push("settings");
        self.send_json(
            "update repository branching model settings",
            Method::PUT,
            &segments,
            Some(update),
        )
        .await
    }

    /// Fetch the effective branching model (repository settings merged with
    /// project defaults).
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn effective_repository_branching_model(
        &self,
        repository: &RepositoryLocator,
    ) -> Result<Value, BitbucketError> {
        self.get_json(
            "get effective repository branching model",
            &repository_segments(repository, "effective-branching-model"),
            &[],
        )
        .await
    }

    /// Fetch a project's branching model.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn project_branching_model(
        &self,
        workspace: &Workspace,
        project: &ProjectKey,
    ) -> Result<Value, BitbucketError> {
        self.get_json(
            "get project branching model",
            &project_segments(workspace, project),
            &[],
        )
        .await
    }

    /// Fetch a project's branching model settings.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn project_branching_model_settings(
        &self,
        workspace: &Workspace,
        project: &ProjectKey,
    ) -> Result<Value, BitbucketError> {
        let mut segments = project_segments(workspace, project);
        segments.push("settings");
        self.get_json("get project branching model settings", &segments, &[])
            .await
    }

    /// Update a project's branching model settings.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn update_project_branching_model_settings(
        &self,
        workspace: &Workspace,
        project: &ProjectKey,
        update: &BranchingModelSettingsUpdate,
    ) -> Result<Value, BitbucketError> {
        let mut segments = project_segments(workspace, project);
        segments.push("settings");
        self.send_json(
            "update project branching model settings",
            Method::PUT,
            &segments,
            Some(update),
        )
        .await
    }
}
