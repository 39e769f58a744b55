// Janitor Library - StatefulSet decommissioning and bucket purge
// This exposes the core components for testing and integration

pub mod cli;
pub mod cluster;
pub mod config;
pub mod decommission;
pub mod observability;
pub mod runner;
pub mod storage;
pub mod telemetry;

// Re-export key types for easy access
pub use cluster::{install_crypto_provider, ClusterError, ClusterOps, KubeClusterClient};
pub use self::config::{BucketConfig, JanitorSettings, JobSpec};
pub use decommission::{DecommissionError, DecommissionReport, Decommissioner, WorkloadHandle};
pub use observability::{OperationTimer, RunMetrics};
pub use runner::{Janitor, JanitorError, RunSummary};
pub use storage::{BucketPurge, PurgeError, PurgeSummary, S3BucketPurger};
pub use telemetry::{generate_correlation_id, init_telemetry};
