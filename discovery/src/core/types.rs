//! Shared deterministic types for discovery core logic.
//!
//! These types define stable contracts between the explorer, the adapters and
//! the persisted result file.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Structured analysis of one call transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub primary_intent: String,
    pub secondary_intents: Vec<String>,
    /// Things the voice agent demonstrably did.
    pub capabilities: Vec<String>,
    /// Things the voice agent struggled with or refused.
    pub limitations: Vec<String>,
    /// Follow-up prompts worth placing as new calls.
    pub suggested_scenarios: Vec<String>,
}

/// Prompt -> analysis for every scenario that completed its lifecycle.
///
/// Sorted by prompt so the persisted file is stable across runs.
pub type DiscoveredScenarios = BTreeMap<String, AnalysisResult>;

/// Lifecycle step at which a scenario can stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Start,
    Wait,
    Fetch,
    Transcribe,
    Analyze,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Start => "start",
            Stage::Wait => "wait",
            Stage::Fetch => "fetch",
            Stage::Transcribe => "transcribe",
            Stage::Analyze => "analyze",
        };
        f.write_str(label)
    }
}

/// Why a prompt was not explored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SkipReason {
    /// Suggested deeper than the configured `max_depth`.
    DepthLimit { depth: u32, max_depth: u32 },
    /// The run already placed `max_calls` calls.
    CallLimit { max_calls: u32 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::DepthLimit { depth, max_depth } => {
                write!(f, "depth {depth} exceeds max_depth {max_depth}")
            }
            SkipReason::CallLimit { max_calls } => {
                write!(f, "max_calls {max_calls} reached")
            }
        }
    }
}

/// How processing of a single prompt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ScenarioOutcome {
    Discovered,
    Failed { stage: Stage, reason: String },
    Skipped { reason: SkipReason },
}
