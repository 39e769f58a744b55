use thiserror::Error;

use super::types::Phase;
use crate::cluster::ClusterError;

/// Fatal conditions that abort a decommissioning run.
#[derive(Debug, Error)]
pub enum DecommissionError {
    #[error("failed to read statefulset {namespace}/{name}: {source}")]
    Read {
        namespace: String,
        name: String,
        phase: Phase,
        #[source]
        source: ClusterError,
    },

    #[error("statefulset {namespace}/{name} has no spec")]
    InvalidWorkload { namespace: String, name: String },

    #[error("failed to scale statefulset {namespace}/{name} to zero: {source}")]
    Update {
        namespace: String,
        name: String,
        #[source]
        source: ClusterError,
    },

    #[error("failed to delete persistentvolumeclaim {namespace}/{claim}: {source}")]
    ClaimDelete {
        namespace: String,
        claim: String,
        #[source]
        source: ClusterError,
    },

    #[error("failed to scale statefulset {namespace}/{name} before deadline ({wait_minutes}m)")]
    DeadlineExceeded {
        namespace: String,
        name: String,
        wait_minutes: u32,
    },
}

impl DecommissionError {
    /// Step of the handle sequence that failed.
    pub fn phase(&self) -> Phase {
        match self {
            DecommissionError::Read { phase, .. } => *phase,
            DecommissionError::InvalidWorkload { .. } => Phase::Fetch,
            DecommissionError::Update { .. } => Phase::ScaleDown,
            DecommissionError::ClaimDelete { .. } => Phase::ClaimSweep,
            DecommissionError::DeadlineExceeded { .. } => Phase::ConvergenceWait,
        }
    }

    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, DecommissionError::DeadlineExceeded { .. })
    }
}
