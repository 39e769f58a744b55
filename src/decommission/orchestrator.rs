use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, Instrument};

use super::claims::sweep_order;
use super::errors::DecommissionError;
use super::types::{DecommissionReport, HandleReport, Phase, WorkloadHandle, WorkloadSnapshot};
use super::wait::{await_convergence, Deadline};
use crate::cluster::ClusterOps;
use crate::observability::{OperationTimer, RunMetrics};
use crate::telemetry::create_workload_span;

/// Delay before the single convergence check.
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_secs(30);

/// Drives the per-StatefulSet decommissioning sequence over a list of handles.
pub struct Decommissioner<C: ClusterOps> {
    cluster: C,
    poll_delay: Duration,
    metrics: Arc<RunMetrics>,
}

impl<C: ClusterOps> Decommissioner<C> {
    pub fn new(cluster: C) -> Self {
        Self {
            cluster,
            poll_delay: DEFAULT_POLL_DELAY,
            metrics: Arc::new(RunMetrics::new()),
        }
    }

    pub fn with_poll_delay(mut self, poll_delay: Duration) -> Self {
        self.poll_delay = poll_delay;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<RunMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    pub fn cluster(&self) -> &C {
        &self.cluster
    }

    /// Process every handle in order, stopping at the first error.
    ///
    /// Workloads handled before a failure stay scaled down with their claims
    /// deleted.
    pub async fn run(&self, handles: &[WorkloadHandle]) -> Result<DecommissionReport, DecommissionError> {
        let mut report = DecommissionReport::default();

        for handle in handles {
            let span = create_workload_span(&handle.namespace, &handle.name);
            let handle_report = self
                .decommission(handle)
                .instrument(span)
                .await
                .inspect_err(|_| self.metrics.record_abort())?;
            report.handles.push(handle_report);
        }

        Ok(report)
    }

    /// Run the full sequence for one handle.
    pub async fn decommission(&self, handle: &WorkloadHandle) -> Result<HandleReport, DecommissionError> {
        let timer = OperationTimer::new(&format!("decommission {handle}"));

        // Fetch
        self.metrics.record_request();
        let mut workload = self
            .cluster
            .get_workload(&handle.namespace, &handle.name)
            .await
            .map_err(|source| {
                self.metrics.record_error();
                DecommissionError::Read {
                    namespace: handle.namespace.clone(),
                    name: handle.name.clone(),
                    phase: Phase::Fetch,
                    source,
                }
            })?;

        let snapshot = WorkloadSnapshot::capture(&workload).ok_or_else(|| {
            DecommissionError::InvalidWorkload {
                namespace: handle.namespace.clone(),
                name: handle.name.clone(),
            }
        })?;
        debug!(
            replicas = snapshot.original_replicas,
            claim_templates = ?snapshot.claim_templates,
            "Captured workload snapshot"
        );

        // Scale to zero on the object as read
        if let Some(spec) = workload.spec.as_mut() {
            spec.replicas = Some(0);
        }
        self.metrics.record_request();
        self.cluster
            .update_workload(&handle.namespace, &workload)
            .await
            .map_err(|source| {
                self.metrics.record_error();
                DecommissionError::Update {
                    namespace: handle.namespace.clone(),
                    name: handle.name.clone(),
                    source,
                }
            })?;
        info!(from = snapshot.original_replicas, "Scaled statefulset to zero");

        // Claim sweep
        let mut claims_deleted = 0;
        let mut claims_absent = 0;
        for claim in sweep_order(&snapshot.claim_templates, &handle.name, snapshot.original_replicas) {
            self.metrics.record_request();
            match self.cluster.delete_claim(&handle.namespace, &claim).await {
                Ok(()) => {
                    self.metrics.record_claim_deleted();
                    claims_deleted += 1;
                    info!(claim = %claim, "Deleted persistentvolumeclaim");
                }
                Err(err) if err.is_not_found() => {
                    self.metrics.record_claim_absent();
                    claims_absent += 1;
                    debug!(claim = %claim, "Persistentvolumeclaim already absent");
                }
                Err(source) => {
                    self.metrics.record_error();
                    return Err(DecommissionError::ClaimDelete {
                        namespace: handle.namespace.clone(),
                        claim,
                        source,
                    });
                }
            }
        }

        // Bounded convergence wait
        let waited = match (handle.wait_window(), handle.wait_minutes) {
            (Some(window), Some(wait_minutes)) => {
                let deadline = Deadline::starting_now(window, wait_minutes);
                let deadline_utc = chrono::Utc::now()
                    + chrono::Duration::minutes(i64::from(wait_minutes));
                info!(
                    deadline = %deadline_utc.to_rfc3339(),
                    poll_delay_secs = self.poll_delay.as_secs(),
                    "Waiting for scale-down to converge"
                );
                await_convergence(&self.cluster, handle, deadline, self.poll_delay, &self.metrics).await?;
                true
            }
            _ => false,
        };

        self.metrics.record_workload_done();
        timer.finish();

        Ok(HandleReport {
            namespace: handle.namespace.clone(),
            name: handle.name.clone(),
            original_replicas: snapshot.original_replicas,
            claims_deleted,
            claims_absent,
            waited,
        })
    }
}
