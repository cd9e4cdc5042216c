//! Failure taxonomy for a single call lifecycle.
//!
//! Every variant ends one scenario branch. None of them stops a discovery run.

use std::time::Duration;

use thiserror::Error;
use webhook::store::CallId;

use crate::core::types::Stage;

#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Network, HTTP status or local I/O failure while starting a call or
    /// fetching its recording.
    #[error("{stage} failed: {message}")]
    Transport { stage: Stage, message: String },

    /// The recording never became available within the wait budget.
    #[error("recording for call {call_id} not available after {timeout:?}")]
    Timeout { call_id: CallId, timeout: Duration },

    /// Transcription or analysis service error, or a malformed response.
    #[error("{stage} adapter failed: {message}")]
    Adapter { stage: Stage, message: String },
}

impl LifecycleError {
    pub fn transport(stage: Stage, err: &anyhow::Error) -> Self {
        Self::Transport {
            stage,
            message: format!("{err:#}"),
        }
    }

    pub fn adapter(stage: Stage, err: &anyhow::Error) -> Self {
        Self::Adapter {
            stage,
            message: format!("{err:#}"),
        }
    }

    /// Lifecycle step the failure belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            LifecycleError::Transport { stage, .. } | LifecycleError::Adapter { stage, .. } => {
                *stage
            }
            LifecycleError::Timeout { .. } => Stage::Wait,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn transport_message_keeps_context_chain() {
        let err = anyhow!("connection refused").context("send start-call request");
        let failure = LifecycleError::transport(Stage::Start, &err);
        assert_eq!(
            failure.to_string(),
            "start failed: send start-call request: connection refused"
        );
        assert_eq!(failure.stage(), Stage::Start);
    }

    #[test]
    fn timeout_belongs_to_wait_stage() {
        let failure = LifecycleError::Timeout {
            call_id: CallId::from("call-9"),
            timeout: Duration::from_secs(300),
        };
        assert_eq!(failure.stage(), Stage::Wait);
        assert!(failure.to_string().contains("call-9"));
    }
}
