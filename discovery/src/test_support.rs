//! Test-only scripted collaborators for driving the explorer without network.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use webhook::store::CallId;

use crate::core::types::{AnalysisResult, Stage};
use crate::error::LifecycleError;
use crate::io::analysis::Analyzer;
use crate::io::calls::CallLifecycle;
use crate::io::transcription::Transcriber;

/// One lifecycle interaction observed by [`ScriptedWorld`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Start(String),
    Wait(CallId),
    Fetch(CallId),
    Transcribe(PathBuf),
    Analyze(String),
}

/// Scripted behavior for a single prompt.
///
/// Defaults to a call that succeeds at every step with an analysis that
/// suggests nothing.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub start_fails: bool,
    pub times_out: bool,
    pub fetch_fails: bool,
    pub transcribe_fails: bool,
    /// `None` makes the analysis step fail.
    pub analysis: Option<AnalysisResult>,
}

impl Script {
    pub fn suggesting(suggestions: &[&str]) -> Self {
        Self {
            analysis: Some(analysis_suggesting(suggestions)),
            ..Self::default()
        }
    }
}

/// Analysis with a fixed intent and the given suggestions.
pub fn analysis_suggesting(suggestions: &[&str]) -> AnalysisResult {
    AnalysisResult {
        primary_intent: "scripted intent".to_string(),
        secondary_intents: Vec::new(),
        capabilities: vec!["answers questions".to_string()],
        limitations: Vec::new(),
        suggested_scenarios: suggestions.iter().map(|s| s.to_string()).collect(),
    }
}

/// Lifecycle, transcriber and analyzer in one, driven by per-prompt scripts.
///
/// Prompts without a script behave like [`Script::suggesting`] with no
/// suggestions. Every interaction is logged in call order.
#[derive(Debug, Default)]
pub struct ScriptedWorld {
    scripts: HashMap<String, Script>,
    calls: Mutex<HashMap<CallId, String>>,
    log: Mutex<Vec<Interaction>>,
}

const TRANSCRIPT_PREFIX: &str = "transcript for: ";

impl ScriptedWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(mut self, prompt: &str, script: Script) -> Self {
        self.scripts.insert(prompt.to_string(), script);
        self
    }

    pub fn interactions(&self) -> Vec<Interaction> {
        lock(&self.log).clone()
    }

    /// Prompts passed to `start`, in order.
    pub fn started_prompts(&self) -> Vec<String> {
        self.interactions()
            .into_iter()
            .filter_map(|interaction| match interaction {
                Interaction::Start(prompt) => Some(prompt),
                _ => None,
            })
            .collect()
    }

    /// Number of interactions other than `start`.
    pub fn post_start_interactions(&self) -> usize {
        self.interactions()
            .iter()
            .filter(|interaction| !matches!(interaction, Interaction::Start(_)))
            .count()
    }

    fn script(&self, prompt: &str) -> Script {
        self.scripts
            .get(prompt)
            .cloned()
            .unwrap_or_else(|| Script::suggesting(&[]))
    }

    fn prompt_for(&self, call_id: &CallId) -> String {
        lock(&self.calls).get(call_id).cloned().unwrap_or_default()
    }

    fn push(&self, interaction: Interaction) {
        lock(&self.log).push(interaction);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn scripted_failure(stage: Stage) -> LifecycleError {
    match stage {
        Stage::Start | Stage::Fetch => LifecycleError::Transport {
            stage,
            message: "scripted HTTP 500".to_string(),
        },
        _ => LifecycleError::Adapter {
            stage,
            message: "scripted adapter failure".to_string(),
        },
    }
}

#[async_trait]
impl CallLifecycle for ScriptedWorld {
    async fn start(&self, prompt: &str) -> Result<CallId, LifecycleError> {
        self.push(Interaction::Start(prompt.to_string()));
        if self.script(prompt).start_fails {
            return Err(scripted_failure(Stage::Start));
        }
        let mut calls = lock(&self.calls);
        let call_id = CallId::new(format!("call-{}", calls.len() + 1));
        calls.insert(call_id.clone(), prompt.to_string());
        Ok(call_id)
    }

    async fn wait_for_recording(&self, call_id: &CallId, _timeout: Duration) -> bool {
        self.push(Interaction::Wait(call_id.clone()));
        !self.script(&self.prompt_for(call_id)).times_out
    }

    async fn fetch_recording(&self, call_id: &CallId) -> Result<PathBuf, LifecycleError> {
        self.push(Interaction::Fetch(call_id.clone()));
        if self.script(&self.prompt_for(call_id)).fetch_fails {
            return Err(scripted_failure(Stage::Fetch));
        }
        Ok(PathBuf::from(format!("recordings/{call_id}.wav")))
    }
}

#[async_trait]
impl Transcriber for ScriptedWorld {
    async fn transcribe(&self, recording: &Path) -> Result<String, LifecycleError> {
        self.push(Interaction::Transcribe(recording.to_path_buf()));
        let call_id = recording
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(CallId::from)
            .unwrap_or_else(|| CallId::from(""));
        let prompt = self.prompt_for(&call_id);
        if self.script(&prompt).transcribe_fails {
            return Err(scripted_failure(Stage::Transcribe));
        }
        Ok(format!("{TRANSCRIPT_PREFIX}{prompt}"))
    }
}

#[async_trait]
impl Analyzer for ScriptedWorld {
    async fn analyze(&self, transcript: &str) -> Result<AnalysisResult, LifecycleError> {
        self.push(Interaction::Analyze(transcript.to_string()));
        let prompt = transcript
            .strip_prefix(TRANSCRIPT_PREFIX)
            .unwrap_or(transcript);
        self.script(prompt)
            .analysis
            .ok_or_else(|| scripted_failure(Stage::Analyze))
    }
}
