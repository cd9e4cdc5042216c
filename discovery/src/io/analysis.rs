//! Transcript analysis adapter.
//!
//! Sends the transcript to a chat model with a fixed instruction, asks for a
//! JSON object, and parses the reply strictly into [`AnalysisResult`]. A reply
//! that does not match `schemas/analysis_result.schema.json` is an adapter
//! failure, never a partial result.

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use jsonschema::Draft;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::core::types::{AnalysisResult, Stage};
use crate::error::LifecycleError;
use crate::io::openai::OpenAiClient;

const ANALYSIS_SCHEMA: &str = include_str!("../../schemas/analysis_result.schema.json");

pub const SYSTEM_PROMPT: &str = "You are an AI assistant analyzing customer service call transcriptions to discover voice agent capabilities.
Your task is to:
1. Identify the customer's primary intent and any secondary intents
2. List all specific capabilities demonstrated by the voice agent
3. Note any limitations or scenarios the agent struggled with
4. Suggest additional test scenarios based on the interaction

Format your response as a structured JSON object with these keys:
- primary_intent: string
- secondary_intents: list of strings
- capabilities: list of strings
- limitations: list of strings
- suggested_scenarios: list of strings";

/// Turns transcript text into a structured analysis.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, transcript: &str) -> Result<AnalysisResult, LifecycleError>;
}

pub fn user_message(transcript: &str) -> String {
    format!("Analyze this call transcription:\n\n{transcript}")
}

/// Parse and validate a model reply into an [`AnalysisResult`].
///
/// Extra keys are ignored; missing or mistyped keys are errors.
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult> {
    let instance: Value = serde_json::from_str(raw).context("analysis is not valid JSON")?;
    let schema: Value = serde_json::from_str(ANALYSIS_SCHEMA).context("parse analysis schema")?;
    let compiled = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .context("compile analysis schema")?;
    let messages: Vec<String> = compiled
        .iter_errors(&instance)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        bail!("analysis does not match schema:\n- {}", messages.join("\n- "));
    }
    serde_json::from_value(instance).context("decode analysis")
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// [`Analyzer`] using the `chat/completions` endpoint in JSON mode.
pub struct ChatAnalyzer {
    client: OpenAiClient,
    model: String,
}

impl ChatAnalyzer {
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    #[instrument(skip_all, fields(model = %self.model, transcript_chars = transcript.len()))]
    async fn request_analysis(&self, transcript: &str) -> Result<AnalysisResult> {
        let prompt = user_message(transcript);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };
        let response: ChatResponse = self.client.post_json("chat/completions", &request).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("chat completion has no message content"))?;
        debug!(chars = content.len(), "analysis reply received");
        parse_analysis(&content)
    }
}

#[async_trait]
impl Analyzer for ChatAnalyzer {
    async fn analyze(&self, transcript: &str) -> Result<AnalysisResult, LifecycleError> {
        match self.request_analysis(transcript).await {
            Ok(analysis) => {
                info!(
                    suggestions = analysis.suggested_scenarios.len(),
                    "analysis complete"
                );
                Ok(analysis)
            }
            Err(err) => {
                error!(error = %format!("{err:#}"), "analysis failed");
                Err(LifecycleError::adapter(Stage::Analyze, &err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_complete_reply_and_ignores_extra_keys() {
        let raw = r#"{
            "primary_intent": "book service",
            "secondary_intents": ["ask price"],
            "capabilities": ["scheduling"],
            "limitations": [],
            "suggested_scenarios": ["Reschedule an existing appointment"],
            "confidence": 0.9
        }"#;
        let analysis = parse_analysis(raw).expect("parse");
        assert_eq!(analysis.primary_intent, "book service");
        assert_eq!(
            analysis.suggested_scenarios,
            vec!["Reschedule an existing appointment".to_string()]
        );
    }

    #[test]
    fn blank_suggestions_do_not_invalidate_the_reply() {
        let raw = r#"{
            "primary_intent": "holiday hours",
            "secondary_intents": [],
            "capabilities": ["states opening hours"],
            "limitations": [],
            "suggested_scenarios": ["Ask about holidays", ""]
        }"#;
        let analysis = parse_analysis(raw).expect("parse");
        assert_eq!(analysis.suggested_scenarios, vec!["Ask about holidays", ""]);
    }

    #[test]
    fn rejects_missing_keys() {
        let err = parse_analysis(r#"{"primary_intent": "hours"}"#).expect_err("invalid");
        let message = format!("{err:#}");
        assert!(message.contains("does not match schema"), "{message}");
        assert!(message.contains("required"), "{message}");
    }

    #[test]
    fn rejects_mistyped_lists() {
        let raw = r#"{
            "primary_intent": "hours",
            "secondary_intents": [],
            "capabilities": "answers questions",
            "limitations": [],
            "suggested_scenarios": []
        }"#;
        assert!(parse_analysis(raw).is_err());
    }

    #[test]
    fn rejects_non_json() {
        let err = parse_analysis("Sure! Here is the analysis").expect_err("invalid");
        assert!(format!("{err:#}").contains("not valid JSON"));
    }

    #[test]
    fn user_message_embeds_transcript() {
        assert_eq!(
            user_message("Agent: hello"),
            "Analyze this call transcription:\n\nAgent: hello"
        );
    }
}
