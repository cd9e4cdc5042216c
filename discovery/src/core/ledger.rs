//! Per-run bookkeeping of which prompts were claimed and how they ended.

use std::collections::{BTreeMap, HashSet};

use crate::core::types::{AnalysisResult, DiscoveredScenarios, ScenarioOutcome, SkipReason, Stage};

/// Explorer-owned record of a discovery run.
///
/// Holds the discovered scenarios (append-only), the set of prompts claimed
/// for processing, and a final outcome per prompt. A prompt is claimed at
/// most once per run: a claim either leads to a discovery or to a terminal
/// failure.
#[derive(Debug, Clone, Default)]
pub struct ScenarioLedger {
    discovered: DiscoveredScenarios,
    claimed: HashSet<String>,
    outcomes: BTreeMap<String, ScenarioOutcome>,
    calls_placed: u32,
}

impl ScenarioLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_discovered(&self, prompt: &str) -> bool {
        self.discovered.contains_key(prompt)
    }

    pub fn is_claimed(&self, prompt: &str) -> bool {
        self.claimed.contains(prompt)
    }

    /// Reserve `prompt` for processing.
    ///
    /// Returns false if the prompt was already discovered or claimed earlier
    /// in the run. Checking and reserving happen in one step.
    pub fn claim(&mut self, prompt: &str) -> bool {
        if self.discovered.contains_key(prompt) {
            return false;
        }
        self.claimed.insert(prompt.to_string())
    }

    /// Count a call-start attempt against the run budget.
    pub fn note_call_placed(&mut self) {
        self.calls_placed = self.calls_placed.saturating_add(1);
    }

    pub fn calls_placed(&self) -> u32 {
        self.calls_placed
    }

    /// Insert the analysis for `prompt` unless one is already present.
    ///
    /// Returns false (and leaves the existing entry untouched) on a repeat.
    pub fn record_discovery(&mut self, prompt: &str, analysis: AnalysisResult) -> bool {
        if self.discovered.contains_key(prompt) {
            return false;
        }
        self.discovered.insert(prompt.to_string(), analysis);
        self.outcomes
            .insert(prompt.to_string(), ScenarioOutcome::Discovered);
        true
    }

    pub fn record_failure(&mut self, prompt: &str, stage: Stage, reason: String) {
        self.outcomes
            .insert(prompt.to_string(), ScenarioOutcome::Failed { stage, reason });
    }

    /// Note a skipped prompt. Never overrides an outcome already recorded.
    pub fn record_skip(&mut self, prompt: &str, reason: SkipReason) {
        self.outcomes
            .entry(prompt.to_string())
            .or_insert(ScenarioOutcome::Skipped { reason });
    }

    pub fn discovered(&self) -> &DiscoveredScenarios {
        &self.discovered
    }

    pub fn outcome(&self, prompt: &str) -> Option<&ScenarioOutcome> {
        self.outcomes.get(prompt)
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .values()
            .filter(|outcome| matches!(outcome, ScenarioOutcome::Failed { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .values()
            .filter(|outcome| matches!(outcome, ScenarioOutcome::Skipped { .. }))
            .count()
    }
}
