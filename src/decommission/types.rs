// Core types for the decommissioning sequence

use k8s_openapi::api::apps::v1::StatefulSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// One StatefulSet to decommission, as listed in the job file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadHandle {
    pub name: String,
    pub namespace: String,
    /// Minutes to wait for the scale-down to converge. Absent or 0 means no wait.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_minutes: Option<u32>,
}

impl WorkloadHandle {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            wait_minutes: None,
        }
    }

    pub fn with_wait_minutes(mut self, minutes: u32) -> Self {
        self.wait_minutes = Some(minutes);
        self
    }

    /// The convergence window, if a wait was requested.
    pub fn wait_window(&self) -> Option<Duration> {
        match self.wait_minutes {
            Some(minutes) if minutes > 0 => Some(Duration::from_secs(u64::from(minutes) * 60)),
            _ => None,
        }
    }
}

impl fmt::Display for WorkloadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// What the orchestrator needs from a StatefulSet, captured before any mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadSnapshot {
    pub original_replicas: i32,
    pub claim_templates: Vec<String>,
}

impl WorkloadSnapshot {
    /// Returns `None` when the object carries no spec.
    pub fn capture(workload: &StatefulSet) -> Option<Self> {
        let spec = workload.spec.as_ref()?;
        let claim_templates = spec
            .volume_claim_templates
            .iter()
            .flatten()
            .filter_map(|template| template.metadata.name.clone())
            .collect();

        Some(Self {
            original_replicas: desired_replicas(workload).unwrap_or(1),
            claim_templates,
        })
    }
}

/// `spec.replicas` as stored; Kubernetes treats an unset value as 1.
pub fn desired_replicas(workload: &StatefulSet) -> Option<i32> {
    let spec = workload.spec.as_ref()?;
    Some(spec.replicas.unwrap_or(1))
}

/// Step of the per-handle sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Fetch,
    ScaleDown,
    ClaimSweep,
    ConvergenceWait,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Fetch => "fetch",
            Phase::ScaleDown => "scale-down",
            Phase::ClaimSweep => "claim sweep",
            Phase::ConvergenceWait => "convergence wait",
        };
        f.write_str(label)
    }
}

/// Outcome of one handle that reached `Done`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandleReport {
    pub namespace: String,
    pub name: String,
    pub original_replicas: i32,
    pub claims_deleted: u32,
    pub claims_absent: u32,
    pub waited: bool,
}

/// Handles completed by a run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecommissionReport {
    pub handles: Vec<HandleReport>,
}

impl DecommissionReport {
    pub fn claims_deleted(&self) -> u32 {
        self.handles.iter().map(|h| h.claims_deleted).sum()
    }
}
