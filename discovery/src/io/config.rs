//! Discovery configuration: TOML tunables plus environment-sourced endpoints.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::budget::ExplorationLimits;

pub const DEFAULT_CONFIG_PATH: &str = "discovery.toml";
pub const DEFAULT_PHONE_NUMBER: &str = "+14153580761";
pub const DEFAULT_START_CALL_URL: &str = "https://app.hamming.ai/api/rest/exercise/start-call";
pub const DEFAULT_MEDIA_URL: &str = "https://app.hamming.ai/api/media/exercise";

/// Discovery configuration (TOML).
///
/// Intended to be edited by humans. Missing fields fall back to the values
/// in [`DiscoveryConfig::default`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Interval between notification store checks while waiting for a recording.
    pub poll_interval_ms: u64,

    /// How long to wait for a recording before abandoning a call.
    pub recording_timeout_secs: u64,

    /// Per-request timeout for outbound HTTP calls.
    pub http_timeout_secs: u64,

    /// Deepest suggestion level to follow (seeds are 0). Unset = unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,

    /// Maximum calls to place in one run. Unset = unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_calls: Option<u32>,

    pub results_dir: PathBuf,

    pub recordings_dir: PathBuf,

    /// Local address for the notification receiver.
    pub webhook_bind: String,

    /// Prompts used when none are given on the command line.
    pub seeds: Vec<String>,

    pub openai: OpenAiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub transcription_model: String,
    pub analysis_model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            transcription_model: "whisper-1".to_string(),
            analysis_model: "gpt-4o".to_string(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            recording_timeout_secs: 300,
            http_timeout_secs: 120,
            max_depth: None,
            max_calls: None,
            results_dir: PathBuf::from("results"),
            recordings_dir: PathBuf::from("recordings"),
            webhook_bind: "0.0.0.0:5000".to_string(),
            seeds: default_seeds(),
            openai: OpenAiConfig::default(),
        }
    }
}

/// Seed prompts for a car-service voice agent.
pub fn default_seeds() -> Vec<String> {
    [
        "I need to schedule a maintenance appointment for my car",
        "What are your business hours?",
        "Do you offer emergency services?",
        "I have a question about my last bill",
        "Can you help me with a strange noise my car is making?",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

impl DiscoveryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(anyhow!("poll_interval_ms must be > 0"));
        }
        if self.recording_timeout_secs == 0 {
            return Err(anyhow!("recording_timeout_secs must be > 0"));
        }
        if self.http_timeout_secs == 0 {
            return Err(anyhow!("http_timeout_secs must be > 0"));
        }
        if self.results_dir.as_os_str().is_empty() {
            return Err(anyhow!("results_dir must be non-empty"));
        }
        if self.recordings_dir.as_os_str().is_empty() {
            return Err(anyhow!("recordings_dir must be non-empty"));
        }
        self.webhook_addr()?;
        if self.openai.base_url.trim().is_empty() {
            return Err(anyhow!("openai.base_url must be non-empty"));
        }
        if self.seeds.iter().any(|seed| seed.trim().is_empty()) {
            return Err(anyhow!("seeds must not contain empty prompts"));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn recording_timeout(&self) -> Duration {
        Duration::from_secs(self.recording_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn limits(&self) -> ExplorationLimits {
        ExplorationLimits {
            max_depth: self.max_depth,
            max_calls: self.max_calls,
        }
    }

    pub fn webhook_addr(&self) -> Result<SocketAddr> {
        self.webhook_bind
            .parse()
            .with_context(|| format!("webhook_bind '{}' is not a socket address", self.webhook_bind))
    }

    pub fn results_path(&self) -> PathBuf {
        self.results_dir.join("discovered_scenarios.json")
    }
}

/// Credentials and endpoints for the call system and the OpenAI API.
///
/// Sourced from the environment by the CLI; never written to disk.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub openai_api_key: String,
    pub call_api_token: String,
    /// Public URL the call system posts notifications to.
    pub webhook_url: String,
    pub phone_number: String,
    pub start_call_url: String,
    pub media_url: String,
    pub webhook_secret: Option<String>,
}

impl std::fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSettings")
            .field("openai_api_key", &"<redacted>")
            .field("call_api_token", &"<redacted>")
            .field("webhook_url", &self.webhook_url)
            .field("phone_number", &self.phone_number)
            .field("start_call_url", &self.start_call_url)
            .field("media_url", &self.media_url)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ApiSettings {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("OPENAI_API_KEY", &self.openai_api_key),
            ("HAMMING_API_TOKEN", &self.call_api_token),
            ("WEBHOOK_URL", &self.webhook_url),
            ("TEST_PHONE_NUMBER", &self.phone_number),
            ("START_CALL_URL", &self.start_call_url),
            ("MEDIA_URL", &self.media_url),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("{name} must be non-empty"));
            }
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `DiscoveryConfig::default()`.
pub fn load_config(path: &Path) -> Result<DiscoveryConfig> {
    if !path.exists() {
        let cfg = DiscoveryConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: DiscoveryConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &DiscoveryConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    super::write_atomic(path, &buf)
}
