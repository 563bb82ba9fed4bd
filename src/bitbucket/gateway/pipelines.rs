//! Pipeline runs and steps.

use reqwest::Method;
use serde_json::Value;

use crate::bitbucket::error::BitbucketError;
use crate::bitbucket::locator::RepositoryLocator;

use super::types::ApiRunPipeline;
use super::{BitbucketClient, ListPipelinesParams, PipelineTarget, PipelineVariable};

fn pipeline_segments<'a>(repository: &'a RepositoryLocator, tail: &[&'a str]) -> Vec<&'a str> {
    let mut segments = repository.segments();
    segments.push("pipelines");
    segments.extend_from_slice(tail);
    segments
}

impl BitbucketClient {
    /// List pipeline runs with optional filters.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn list_pipelines(
        &self,
        repository: &RepositoryLocator,
        params: &ListPipelinesParams,
    ) -> Result<Vec<Value>, BitbucketError> {
        self.get_values(
            "list pipelines",
            &pipeline_segments(repository, &[]),
            &params.query(),
        )
        .await
    }

    /// Fetch one pipeline run.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn pipeline(
        &self,
        repository: &RepositoryLocator,
        pipeline_uuid: &str,
    ) -> Result<Value, BitbucketError> {
        self.get_json(
            "get pipeline",
            &pipeline_segments(repository, &[pipeline_uuid]),
            &[],
        )
        .await
    }

    /// Trigger a pipeline run.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn run_pipeline(
        &self,
        repository: &RepositoryLocator,
        target: &PipelineTarget,
        variables: &[PipelineVariable],
    ) -> Result<Value, BitbucketError> {
        self.send_json(
            "run pipeline",
            Method::POST,
            &pipeline_segments(repository, &[]),
            Some(&ApiRunPipeline::new(target, variables)),
        )
        .await
    }

    /// Ask Bitbucket to stop a running pipeline.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn stop_pipeline(
        &self,
        repository: &RepositoryLocator,
        pipeline_uuid: &str,
    ) -> Result<(), BitbucketError> {
        self.send_empty(
            "stop pipeline",
            Method::POST,
            &pipeline_segments(repository, &[pipeline_uuid, "stopPipeline"]),
        )
        .await
    }

    /// List the steps of a pipeline run.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn pipeline_steps(
        &self,
        repository: &RepositoryLocator,
        pipeline_uuid: &str,
    ) -> Result<Vec<Value>, BitbucketError> {
        self.get_values(
            "list pipeline steps",
            &pipeline_segments(repository, &[pipeline_uuid, "steps"]),
            &[],
        )
        .await
    }

    /// Fetch one pipeline step.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn pipeline_step(
        &self,
        repository: &RepositoryLocator,
        pipeline_uuid: &str,
        step_uuid: &str,
    ) -> Result<Value, BitbucketError> {
        self.get_json(
            "get pipeline step",
            &pipeline_segments(repository, &[pipeline_uuid, "steps", step_uuid]),
            &[],
        )
        .await
    }

    /// Fetch a pipeline step's log as text.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport or HTTP failure.
    pub async fn pipeline_step_log(
        &self,
        repository: &RepositoryLocator,
        pipeline_uuid: &str,
        step_uuid: &str,
    ) -> Result<String, BitbucketError> {
        self.get_text(
            "get pipeline step log",
            &pipeline_segments(repository, &[pipeline_uuid, "steps", step_uuid, "log"]),
        )
        .await
    }
}
