//! Pipeline tools.

use serde_json::{Map, Value};

use super::ToolDispatcher;
use crate::bitbucket::error::BitbucketError;
use crate::bitbucket::gateway::{ListPipelinesParams, PipelineTarget, PipelineVariable};
use crate::mcp::args::{LIMIT_RANGE, ToolArguments};
use crate::mcp::envelope::ToolOutput;
use crate::mcp::tools::Tool;

const STOP_SENT: &str = "Pipeline stop signal sent successfully.";

fn target_field(target: &Map<String, Value>, key: &str) -> Result<Option<String>, BitbucketError> {
    match target.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.is_empty() => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(BitbucketError::invalid_input(format!(
            "target.{key} must be a string"
        ))),
    }
}

fn pipeline_target(target: &Map<String, Value>) -> Result<PipelineTarget, BitbucketError> {
    let parsed = PipelineTarget {
        ref_type: target_field(target, "ref_type")?,
        ref_name: target_field(target, "ref_name")?,
        commit_hash: target_field(target, "commit_hash")?,
        selector_type: target_field(target, "selector_type")?,
        selector_pattern: target_field(target, "selector_pattern")?,
    };
    if parsed.ref_name.is_none() && parsed.commit_hash.is_none() {
        return Err(BitbucketError::invalid_input(
            "target must include ref_name or commit_hash",
        ));
    }
    Ok(parsed)
}

fn pipeline_variable(entry: &Value) -> Result<PipelineVariable, BitbucketError> {
    let text = |key: &str| {
        entry
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| {
                BitbucketError::invalid_input(format!("each variable needs a string {key}"))
            })
    };
    Ok(PipelineVariable {
        key: text("key")?,
        value: text("value")?,
        secured: entry
            .get("secured")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

impl ToolDispatcher {
    pub(super) async fn pipeline_tool(
        &self,
        tool: Tool,
        args: ToolArguments<'_>,
    ) -> Result<ToolOutput, BitbucketError> {
        let repository = self.repository(args)?;
        match tool {
            Tool::ListPipelineRuns => {
                let params = ListPipelinesParams {
                    limit: args.bounded_u32("limit", &LIMIT_RANGE)?,
                    status: args.optional_str("status")?.map(str::to_owned),
                    target_branch: args.optional_str("target_branch")?.map(str::to_owned),
                    trigger_type: args.optional_str("trigger_type")?.map(str::to_owned),
                };
                ToolOutput::json(&self.client.list_pipelines(&repository, &params).await?)
            }
            Tool::RunPipeline => {
                let target = pipeline_target(args.required_object("target")?)?;
                let variables = args
                    .optional_array("variables")?
                    .unwrap_or_default()
                    .iter()
                    .map(pipeline_variable)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ToolOutput::Json(
                    self.client
                        .run_pipeline(&repository, &target, &variables)
                        .await?,
                ))
            }
            Tool::GetPipelineRun => {
                let pipeline = args.required_str("pipeline_uuid")?;
                Ok(ToolOutput::Json(
                    self.client.pipeline(&repository, pipeline).await?,
                ))
            }
            Tool::StopPipeline => {
                let pipeline = args.required_str("pipeline_uuid")?;
                self.client.stop_pipeline(&repository, pipeline).await?;
                Ok(ToolOutput::Text(STOP_SENT.to_owned()))
            }
            Tool::GetPipelineSteps => {
                let pipeline = args.required_str("pipeline_uuid")?;
                ToolOutput::json(&self.client.pipeline_steps(&repository, pipeline).await?)
            }
            Tool::GetPipelineStep => {
                let pipeline = args.required_str("pipeline_uuid")?;
                let step = args.required_str("step_uuid")?;
                Ok(ToolOutput::Json(
                    self.client
                        .pipeline_step(&repository, pipeline, step)
                        .await?,
                ))
            }
            Tool::GetPipelineStepLogs => {
                let pipeline = args.required_str("pipeline_uuid")?;
                let step = args.required_str("step_uuid")?;
                Ok(ToolOutput::Text(
                    self.client
                        .pipeline_step_log(&repository, pipeline, step)
                        .await?,
                ))
            }
            other => Err(BitbucketError::invalid_input(format!(
                "{} is not a pipeline tool",
                other.name()
            ))),
        }
    }
}
