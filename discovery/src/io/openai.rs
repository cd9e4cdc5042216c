//! Minimal OpenAI-compatible HTTP client shared by the adapters.

use anyhow::{Context, Result};
use reqwest::multipart::Form;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Authenticated client for an OpenAI-compatible API root.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(http: reqwest::Client, api_key: String, base_url: &str) -> Self {
        Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// POST a JSON body and decode a JSON response.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        self.http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .with_context(|| format!("send request to {url}"))?
            .error_for_status()
            .with_context(|| format!("non-2xx from {url}"))?
            .json::<R>()
            .await
            .with_context(|| format!("parse response from {url}"))
    }

    /// POST a multipart form and decode a JSON response.
    pub async fn post_multipart<R>(&self, path: &str, form: Form) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        self.http
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("send upload to {url}"))?
            .error_for_status()
            .with_context(|| format!("non-2xx from {url}"))?
            .json::<R>()
            .await
            .with_context(|| format!("parse response from {url}"))
    }
}
