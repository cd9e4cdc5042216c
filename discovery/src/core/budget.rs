//! Exploration budget checks.
//!
//! Suggested scenarios can fan out without end; these limits cap how deep the
//! explorer follows suggestions and how many calls a run may place. Unset
//! limits leave exploration bounded only by running out of new prompts.

use serde::{Deserialize, Serialize};

use crate::core::types::SkipReason;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorationLimits {
    /// Deepest suggestion level to follow. Seeds are depth 0.
    pub max_depth: Option<u32>,
    /// Maximum number of calls to start during one run.
    pub max_calls: Option<u32>,
}

impl ExplorationLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Return the limit that forbids placing another call at `depth`, if any.
    ///
    /// The depth limit is checked first so that a deep suggestion reports why
    /// it was skipped even after the call budget runs out.
    pub fn check(&self, depth: u32, calls_placed: u32) -> Option<SkipReason> {
        if let Some(max_depth) = self.max_depth.filter(|max| depth > *max) {
            return Some(SkipReason::DepthLimit { depth, max_depth });
        }
        self.max_calls
            .filter(|max| calls_placed >= *max)
            .map(|max_calls| SkipReason::CallLimit { max_calls })
    }
}
