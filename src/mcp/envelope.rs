//! The uniform response shape returned by every tool call.

use serde::Serialize;
use serde_json::Value;

use crate::bitbucket::error::BitbucketError;

/// What a tool produced on success.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Structured result, rendered as pretty-printed JSON.
    Json(Value),
    /// Raw text such as a diff, a step log, or a confirmation message.
    Text(String),
}

impl ToolOutput {
    /// Serialises `payload` into a JSON output.
    ///
    /// # Errors
    ///
    /// Returns [`BitbucketError::Decode`] when `payload` cannot be
    /// represented as JSON.
    pub fn json<T: Serialize + ?Sized>(payload: &T) -> Result<Self, BitbucketError> {
        serde_json::to_value(payload)
            .map(Self::Json)
            .map_err(|error| BitbucketError::Decode {
                message: format!("failed to serialise tool result: {error}"),
            })
    }
}

/// A single `text` content block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    kind: &'static str,
    /// The rendered text.
    pub text: String,
}

impl TextContent {
    fn new(text: String) -> Self {
        Self { kind: "text", text }
    }
}

/// Tool call result: one text block plus an error flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolResponse {
    /// Content blocks; always exactly one.
    pub content: Vec<TextContent>,
    /// Set when the text describes a failure.
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolResponse {
    /// Wraps a successful output.
    #[must_use]
    pub fn success(output: ToolOutput) -> Self {
        let text = match output {
            ToolOutput::Text(text) => text,
            ToolOutput::Json(value) => {
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
            }
        };
        Self {
            content: vec![TextContent::new(text)],
            is_error: false,
        }
    }

    /// Renders a failure as `ERROR: <kind>: <description>`.
    #[must_use]
    pub fn failure(error: &BitbucketError) -> Self {
        Self {
            content: vec![TextContent::new(format!(
                "ERROR: {}: {error}",
                error.kind()
            ))],
            is_error: true,
        }
    }

    /// Normalises any tool outcome.
    #[must_use]
    pub fn from_result(result: Result<ToolOutput, BitbucketError>) -> Self {
        match result {
            Ok(output) => Self::success(output),
            Err(error) => Self::failure(&error),
        }
    }

    /// Text of the single content block.
    #[must_use]
    pub fn text(&self) -> &str {
        self.content
            .first()
            .map(|content| content.text.as_str())
            .unwrap_or_default()
    }
}
