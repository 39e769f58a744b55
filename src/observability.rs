use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Counters for one janitor run
#[derive(Debug, Default)]
pub struct RunMetrics {
    pub api_requests: AtomicU64,
    pub api_errors: AtomicU64,
    pub claims_deleted: AtomicU64,
    pub claims_absent: AtomicU64,
    pub workloads_done: AtomicU64,
    pub aborts: AtomicU64,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.api_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.api_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_claim_deleted(&self) {
        self.claims_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_claim_absent(&self) {
        self.claims_absent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_workload_done(&self) {
        self.workloads_done.fetch_add(1, Ordering::Relaxed);
    }

    /// A handle failed and stopped the run, whatever the cause.
    pub fn record_abort(&self) {
        self.aborts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> RunStats {
        RunStats {
            api_requests: self.api_requests.load(Ordering::Relaxed),
            api_errors: self.api_errors.load(Ordering::Relaxed),
            claims_deleted: self.claims_deleted.load(Ordering::Relaxed),
            claims_absent: self.claims_absent.load(Ordering::Relaxed),
            workloads_done: self.workloads_done.load(Ordering::Relaxed),
            aborts: self.aborts.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            api_requests = stats.api_requests,
            api_errors = stats.api_errors,
            claims_deleted = stats.claims_deleted,
            claims_absent = stats.claims_absent,
            workloads_done = stats.workloads_done,
            aborts = stats.aborts,
            "Decommission metrics"
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub api_requests: u64,
    pub api_errors: u64,
    pub claims_deleted: u64,
    pub claims_absent: u64,
    pub workloads_done: u64,
    pub aborts: u64,
}

/// Time an operation and log its duration when finished
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed();
        info!(
            operation = %self.operation,
            duration_ms = duration.as_millis() as u64,
            "Operation completed"
        );
    }
}
