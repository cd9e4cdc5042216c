//! Speech-to-text adapter for call recordings.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{error, info, instrument};

use crate::core::types::Stage;
use crate::error::LifecycleError;
use crate::io::openai::OpenAiClient;

/// Turns a recording on disk into transcript text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, recording: &Path) -> Result<String, LifecycleError>;
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// [`Transcriber`] using the `audio/transcriptions` endpoint.
pub struct WhisperTranscriber {
    client: OpenAiClient,
    model: String,
}

impl WhisperTranscriber {
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    #[instrument(skip_all, fields(recording = %recording.display()))]
    async fn request_transcript(&self, recording: &Path) -> Result<String> {
        let bytes = tokio::fs::read(recording)
            .await
            .with_context(|| format!("read recording {}", recording.display()))?;
        let file_name = recording
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("recording.wav")
            .to_string();
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/wav")
            .context("build audio part")?;
        let form = Form::new()
            .text("model", self.model.clone())
            .part("file", part);

        let response: TranscriptionResponse = self
            .client
            .post_multipart("audio/transcriptions", form)
            .await?;
        if response.text.trim().is_empty() {
            return Err(anyhow!("transcription is empty"));
        }
        Ok(response.text)
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, recording: &Path) -> Result<String, LifecycleError> {
        match self.request_transcript(recording).await {
            Ok(text) => {
                info!(chars = text.chars().count(), "transcription complete");
                Ok(text)
            }
            Err(err) => {
                error!(error = %format!("{err:#}"), "transcription failed");
                Err(LifecycleError::adapter(Stage::Transcribe, &err))
            }
        }
    }
}
