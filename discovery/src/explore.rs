//! Recursive, deduplicating scenario exploration.
//!
//! Each prompt drives one call through start, wait, fetch, transcribe and
//! analyze. A completed analysis is recorded and its suggested scenarios are
//! explored depth first before the next sibling, so a seed's whole suggestion
//! subtree finishes before the next seed starts. A failure at any step ends
//! only that prompt's branch.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::budget::ExplorationLimits;
use crate::core::ledger::ScenarioLedger;
use crate::core::types::AnalysisResult;
use crate::error::LifecycleError;
use crate::io::analysis::Analyzer;
use crate::io::calls::CallLifecycle;
use crate::io::results::write_results;
use crate::io::transcription::Transcriber;

/// Settings for one discovery run.
#[derive(Debug, Clone)]
pub struct ExploreConfig {
    /// Per-call budget for the recording to become available.
    pub recording_timeout: Duration,
    pub limits: ExplorationLimits,
    /// Where `run_discovery` writes the discovered scenarios.
    pub results_path: PathBuf,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            recording_timeout: Duration::from_secs(300),
            limits: ExplorationLimits::unbounded(),
            results_path: PathBuf::from("results/discovered_scenarios.json"),
        }
    }
}

/// Summary of a finished discovery run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub results_path: PathBuf,
    pub calls_placed: u32,
    pub discovered: usize,
    pub failed: usize,
    pub skipped: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Explores prompts against a voice agent, one call at a time.
///
/// Owns the run ledger; collaborators are borrowed so callers keep access to
/// them after the run.
pub struct Explorer<'a, L, T, A> {
    lifecycle: &'a L,
    transcriber: &'a T,
    analyzer: &'a A,
    config: ExploreConfig,
    ledger: ScenarioLedger,
}

impl<'a, L, T, A> Explorer<'a, L, T, A>
where
    L: CallLifecycle,
    T: Transcriber,
    A: Analyzer,
{
    pub fn new(
        lifecycle: &'a L,
        transcriber: &'a T,
        analyzer: &'a A,
        config: ExploreConfig,
    ) -> Self {
        Self {
            lifecycle,
            transcriber,
            analyzer,
            config,
            ledger: ScenarioLedger::new(),
        }
    }

    pub fn ledger(&self) -> &ScenarioLedger {
        &self.ledger
    }

    /// Explore every seed in order, then persist the discovered scenarios.
    ///
    /// Individual scenario failures never fail the run; only writing the
    /// results file can.
    pub async fn run_discovery(&mut self, seeds: &[String]) -> Result<RunSummary> {
        let started_at = Utc::now();
        info!(seeds = seeds.len(), "starting discovery run");
        for seed in seeds {
            self.process_scenario(seed).await;
        }

        write_results(&self.config.results_path, self.ledger.discovered())?;

        let summary = RunSummary {
            results_path: self.config.results_path.clone(),
            calls_placed: self.ledger.calls_placed(),
            discovered: self.ledger.discovered().len(),
            failed: self.ledger.failed_count(),
            skipped: self.ledger.skipped_count(),
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            calls_placed = summary.calls_placed,
            discovered = summary.discovered,
            failed = summary.failed,
            skipped = summary.skipped,
            "discovery run finished"
        );
        Ok(summary)
    }

    /// Explore `prompt` as a seed (depth 0) and everything it leads to.
    ///
    /// A prompt that is already discovered is a no-op.
    pub async fn process_scenario(&mut self, prompt: &str) {
        self.explore(prompt, 0).await;
    }

    async fn explore(&mut self, prompt: &str, depth: u32) {
        if self.ledger.is_discovered(prompt) {
            debug!(%prompt, depth, "already discovered");
            return;
        }
        if let Some(reason) = self.config.limits.check(depth, self.ledger.calls_placed()) {
            info!(%prompt, depth, %reason, "skipping scenario");
            if !self.ledger.is_claimed(prompt) {
                self.ledger.record_skip(prompt, reason);
            }
            return;
        }
        if !self.ledger.claim(prompt) {
            debug!(%prompt, depth, "already attempted in this run");
            return;
        }
        if depth == 0 {
            info!(%prompt, "testing seed scenario");
        } else {
            info!(%prompt, depth, "testing suggested scenario");
        }

        self.ledger.note_call_placed();
        let analysis = match self.run_lifecycle(prompt).await {
            Ok(analysis) => analysis,
            Err(err) => {
                warn!(%prompt, depth, stage = %err.stage(), error = %err, "abandoning scenario");
                self.ledger.record_failure(prompt, err.stage(), err.to_string());
                return;
            }
        };

        let suggestions: Vec<String> = analysis
            .suggested_scenarios
            .iter()
            .filter(|suggestion| !suggestion.trim().is_empty())
            .cloned()
            .collect();
        self.ledger.record_discovery(prompt, analysis);
        info!(%prompt, depth, suggestions = suggestions.len(), "scenario discovered");

        // Suggestions run to completion one by one, depth first.
        for suggestion in &suggestions {
            if self.ledger.is_discovered(suggestion) {
                continue;
            }
            Box::pin(self.explore(suggestion, depth + 1)).await;
        }
    }

    /// Drive one call from start to analysis. Stops at the first failure.
    async fn run_lifecycle(&self, prompt: &str) -> Result<AnalysisResult, LifecycleError> {
        let call_id = self.lifecycle.start(prompt).await?;

        let timeout = self.config.recording_timeout;
        if !self.lifecycle.wait_for_recording(&call_id, timeout).await {
            return Err(LifecycleError::Timeout { call_id, timeout });
        }

        let recording = self.lifecycle.fetch_recording(&call_id).await?;
        let transcript = self.transcriber.transcribe(&recording).await?;
        self.analyzer.analyze(&transcript).await
    }
}
