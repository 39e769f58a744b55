// Bounded convergence wait after scale-down

use std::time::Duration;
use tokio::time::{sleep, sleep_until, timeout_at, Instant};
use tracing::{info, warn};

use super::errors::DecommissionError;
use super::types::{desired_replicas, Phase, WorkloadHandle};
use crate::cluster::ClusterOps;
use crate::observability::RunMetrics;

/// Per-handle deadline for the convergence check.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    pub at: Instant,
    pub wait_minutes: u32,
}

impl Deadline {
    pub fn starting_now(window: Duration, wait_minutes: u32) -> Self {
        Self {
            at: Instant::now() + window,
            wait_minutes,
        }
    }
}

/// Re-read the workload once after `poll_delay` and require zero replicas.
///
/// The check runs a single time. If the deadline fires before the poll
/// completes, or the re-read still shows replicas, the handle fails with
/// [`DecommissionError::DeadlineExceeded`] once the deadline is reached.
pub async fn await_convergence<C: ClusterOps + ?Sized>(
    cluster: &C,
    handle: &WorkloadHandle,
    deadline: Deadline,
    poll_delay: Duration,
    metrics: &RunMetrics,
) -> Result<(), DecommissionError> {
    let deadline_exceeded = || DecommissionError::DeadlineExceeded {
        namespace: handle.namespace.clone(),
        name: handle.name.clone(),
        wait_minutes: deadline.wait_minutes,
    };

    let poll = async {
        sleep(poll_delay).await;
        metrics.record_request();
        cluster.get_workload(&handle.namespace, &handle.name).await
    };

    let workload = match timeout_at(deadline.at, poll).await {
        Err(_) => return Err(deadline_exceeded()),
        Ok(Err(source)) => {
            metrics.record_error();
            return Err(DecommissionError::Read {
                namespace: handle.namespace.clone(),
                name: handle.name.clone(),
                phase: Phase::ConvergenceWait,
                source,
            });
        }
        Ok(Ok(workload)) => workload,
    };

    let replicas = desired_replicas(&workload);
    if replicas == Some(0) {
        info!(
            namespace = %handle.namespace,
            workload = %handle.name,
            "sts {} has zero replicas", handle.name
        );
        return Ok(());
    }

    warn!(
        namespace = %handle.namespace,
        workload = %handle.name,
        replicas = ?replicas,
        "Scale-down not observed; holding until deadline"
    );
    sleep_until(deadline.at).await;
    Err(deadline_exceeded())
}
