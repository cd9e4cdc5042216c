//! Call lifecycle client: start a call, wait for its recording, fetch it.
//!
//! The [`CallLifecycle`] trait decouples the explorer from the remote call
//! system. [`HttpCallClient`] talks to the real API and waits on the shared
//! [`NotificationStore`]; tests use scripted lifecycles instead.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info, instrument, warn};
use webhook::store::{CallId, NotificationStore};

use crate::core::types::Stage;
use crate::error::LifecycleError;
use crate::io::config::ApiSettings;

/// Drives one call from start to a recording on disk.
///
/// Every operation is a single attempt. Failures are logged where they happen
/// and returned as values; callers decide whether to abandon the scenario.
#[async_trait]
pub trait CallLifecycle: Send + Sync {
    /// Place a call seeded with `prompt` and return its id.
    async fn start(&self, prompt: &str) -> Result<CallId, LifecycleError>;

    /// Block until a notification marks the recording available.
    ///
    /// Returns false when `timeout` elapses first. A failed call and a call
    /// that is still ringing look the same here.
    async fn wait_for_recording(&self, call_id: &CallId, timeout: Duration) -> bool;

    /// Download the recording and return where it was stored.
    async fn fetch_recording(&self, call_id: &CallId) -> Result<PathBuf, LifecycleError>;
}

/// Check the store every `poll_interval` until the recording for `call_id` is
/// available or `timeout` has elapsed.
///
/// Detection lags a notification by at most one interval. A zero timeout
/// returns false without checking.
pub async fn poll_for_recording(
    store: &NotificationStore,
    call_id: &CallId,
    poll_interval: Duration,
    timeout: Duration,
) -> bool {
    let started = Instant::now();
    while started.elapsed() < timeout {
        if store.recording_available(call_id) {
            return true;
        }
        sleep(poll_interval).await;
    }
    false
}

/// File name used for a downloaded recording.
///
/// Anything outside `[A-Za-z0-9_-]` in the id is replaced so the name stays
/// inside the recordings directory.
pub fn recording_file_name(call_id: &CallId) -> String {
    let safe: String = call_id
        .as_str()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("call_{safe}.wav")
}

/// Call-system endpoints and identity used for every call.
#[derive(Clone)]
pub struct CallEndpoints {
    pub start_call_url: String,
    pub media_url: String,
    pub api_token: String,
    pub phone_number: String,
    pub webhook_url: String,
}

impl From<&ApiSettings> for CallEndpoints {
    fn from(settings: &ApiSettings) -> Self {
        Self {
            start_call_url: settings.start_call_url.clone(),
            media_url: settings.media_url.clone(),
            api_token: settings.call_api_token.clone(),
            phone_number: settings.phone_number.clone(),
            webhook_url: settings.webhook_url.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StartCallRequest<'a> {
    phone_number: &'a str,
    prompt: &'a str,
    webhook_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct StartCallResponse {
    id: Value,
}

/// [`CallLifecycle`] backed by the call system's REST API.
pub struct HttpCallClient {
    http: reqwest::Client,
    endpoints: CallEndpoints,
    store: NotificationStore,
    poll_interval: Duration,
    recordings_dir: PathBuf,
}

impl HttpCallClient {
    pub fn new(
        http: reqwest::Client,
        endpoints: CallEndpoints,
        store: NotificationStore,
        poll_interval: Duration,
        recordings_dir: PathBuf,
    ) -> Self {
        Self {
            http,
            endpoints,
            store,
            poll_interval,
            recordings_dir,
        }
    }

    #[instrument(skip_all)]
    async fn request_call(&self, prompt: &str) -> Result<CallId> {
        let body = StartCallRequest {
            phone_number: &self.endpoints.phone_number,
            prompt,
            webhook_url: &self.endpoints.webhook_url,
        };
        let response: StartCallResponse = self
            .http
            .post(&self.endpoints.start_call_url)
            .bearer_auth(&self.endpoints.api_token)
            .json(&body)
            .send()
            .await
            .context("send start-call request")?
            .error_for_status()
            .context("start-call rejected")?
            .json()
            .await
            .context("parse start-call response")?;

        CallId::from_json(&response.id)
            .ok_or_else(|| anyhow!("start-call response has unusable id {}", response.id))
    }

    #[instrument(skip_all, fields(call_id = %call_id))]
    async fn download_recording(&self, call_id: &CallId) -> Result<PathBuf> {
        let bytes = self
            .http
            .get(&self.endpoints.media_url)
            .bearer_auth(&self.endpoints.api_token)
            .query(&[("id", call_id.as_str())])
            .send()
            .await
            .context("send media request")?
            .error_for_status()
            .context("media request rejected")?
            .bytes()
            .await
            .context("read media body")?;

        tokio::fs::create_dir_all(&self.recordings_dir)
            .await
            .with_context(|| format!("create {}", self.recordings_dir.display()))?;
        let path = self.recordings_dir.join(recording_file_name(call_id));
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("write recording {}", path.display()))?;
        debug!(bytes = bytes.len(), "recording downloaded");
        Ok(path)
    }
}

#[async_trait]
impl CallLifecycle for HttpCallClient {
    async fn start(&self, prompt: &str) -> Result<CallId, LifecycleError> {
        match self.request_call(prompt).await {
            Ok(call_id) => {
                info!(call_id = %call_id, "call initiated");
                Ok(call_id)
            }
            Err(err) => {
                error!(error = %format!("{err:#}"), "failed to start call");
                Err(LifecycleError::transport(Stage::Start, &err))
            }
        }
    }

    async fn wait_for_recording(&self, call_id: &CallId, timeout: Duration) -> bool {
        debug!(call_id = %call_id, timeout_secs = timeout.as_secs(), "waiting for recording");
        let ready = poll_for_recording(&self.store, call_id, self.poll_interval, timeout).await;
        if ready {
            info!(call_id = %call_id, "recording available");
        } else {
            warn!(call_id = %call_id, timeout_secs = timeout.as_secs(), "timed out waiting for recording");
        }
        ready
    }

    async fn fetch_recording(&self, call_id: &CallId) -> Result<PathBuf, LifecycleError> {
        match self.download_recording(call_id).await {
            Ok(path) => {
                info!(call_id = %call_id, path = %path.display(), "recording saved");
                Ok(path)
            }
            Err(err) => {
                error!(call_id = %call_id, error = %format!("{err:#}"), "failed to retrieve recording");
                Err(LifecycleError::transport(Stage::Fetch, &err))
            }
        }
    }
}
