// Runner - one janitor invocation: decommission StatefulSets, then purge the bucket

use thiserror::Error;
use tracing::{info, Instrument};

use crate::cluster::ClusterOps;
use crate::config::JobSpec;
use crate::decommission::{DecommissionError, DecommissionReport, Decommissioner};
use crate::storage::{BucketPurge, PurgeError, PurgeSummary};
use crate::telemetry::{create_run_span, generate_correlation_id};

#[derive(Debug, Error)]
pub enum JanitorError {
    #[error(transparent)]
    Decommission(#[from] DecommissionError),

    #[error(transparent)]
    Purge(#[from] PurgeError),

    #[error("job lists statefulsets but no cluster client was configured")]
    MissingClusterClient,

    #[error("job has an awsConfig section but no bucket client was configured")]
    MissingBucketClient,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub correlation_id: String,
    pub decommission: Option<DecommissionReport>,
    pub purge: Option<PurgeSummary>,
}

/// Wires the orchestrator and the bucket purge together for one job.
pub struct Janitor<C: ClusterOps, P: BucketPurge> {
    decommissioner: Option<Decommissioner<C>>,
    purger: Option<P>,
}

impl<C: ClusterOps, P: BucketPurge> Default for Janitor<C, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ClusterOps, P: BucketPurge> Janitor<C, P> {
    pub fn new() -> Self {
        Self {
            decommissioner: None,
            purger: None,
        }
    }

    pub fn with_decommissioner(mut self, decommissioner: Decommissioner<C>) -> Self {
        self.decommissioner = Some(decommissioner);
        self
    }

    pub fn with_purger(mut self, purger: P) -> Self {
        self.purger = Some(purger);
        self
    }

    pub fn decommissioner(&self) -> Option<&Decommissioner<C>> {
        self.decommissioner.as_ref()
    }

    /// Run the job. The bucket is only purged after every StatefulSet is done.
    pub async fn run(&self, job: &JobSpec) -> Result<RunSummary, JanitorError> {
        let correlation_id = generate_correlation_id();
        let span = create_run_span(&correlation_id);
        let mut summary = RunSummary {
            correlation_id,
            ..Default::default()
        };

        async {
            if !job.statefulsets.is_empty() {
                let decommissioner = self
                    .decommissioner
                    .as_ref()
                    .ok_or(JanitorError::MissingClusterClient)?;

                let result = decommissioner.run(&job.statefulsets).await;
                decommissioner.metrics().log_stats();
                let report = result?;
                info!(
                    statefulsets = report.handles.len(),
                    claims_deleted = report.claims_deleted(),
                    "state removed"
                );
                summary.decommission = Some(report);
            }

            if let Some(bucket) = &job.aws_config {
                let purger = self.purger.as_ref().ok_or(JanitorError::MissingBucketClient)?;
                let purged = purger.purge_bucket(&bucket.bucket_name).await?;
                info!(bucket = %bucket.bucket_name, objects_deleted = purged.objects_deleted, "bucket cleaned");
                summary.purge = Some(purged);
            }

            Ok::<_, JanitorError>(())
        }
        .instrument(span)
        .await?;

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterError;
    use crate::config::BucketConfig;
    use crate::decommission::mocks::{statefulset, FakeCluster};
    use crate::decommission::WorkloadHandle;
    use crate::storage::MockBucketPurge;

    fn bucket(name: &str) -> BucketConfig {
        BucketConfig {
            region: "eu-west-1".to_string(),
            bucket_name: name.to_string(),
            access_key: "AKIA".to_string(),
            secret_key: "secret".to_string(),
            endpoint: None,
        }
    }

    #[tokio::test]
    async fn purges_bucket_after_statefulsets() {
        let cluster = FakeCluster::new().with_workload(statefulset("ns", "db", 2, &["data"]));
        let mut purger = MockBucketPurge::new();
        purger
            .expect_purge_bucket()
            .withf(|bucket| bucket == "logs")
            .times(1)
            .returning(|_| Ok(PurgeSummary { objects_deleted: 3, pages: 1 }));

        let janitor = Janitor::new()
            .with_decommissioner(Decommissioner::new(cluster))
            .with_purger(purger);
        let job = JobSpec {
            statefulsets: vec![WorkloadHandle::new("ns", "db")],
            aws_config: Some(bucket("logs")),
        };

        let summary = janitor.run(&job).await.unwrap();

        assert_eq!(summary.decommission.unwrap().claims_deleted(), 2);
        assert_eq!(summary.purge.unwrap().objects_deleted, 3);
        assert!(!summary.correlation_id.is_empty());
    }

    #[tokio::test]
    async fn failed_decommission_skips_purge() {
        let cluster = FakeCluster::new()
            .with_workload(statefulset("ns", "db", 2, &["data"]))
            .with_failing_claim(
                "ns",
                "data-db-1",
                ClusterError::Transport {
                    message: "connection reset".to_string(),
                },
            );
        let mut purger = MockBucketPurge::new();
        purger.expect_purge_bucket().never();

        let janitor = Janitor::new()
            .with_decommissioner(Decommissioner::new(cluster))
            .with_purger(purger);
        let job = JobSpec {
            statefulsets: vec![WorkloadHandle::new("ns", "db")],
            aws_config: Some(bucket("logs")),
        };

        let err = janitor.run(&job).await.unwrap_err();
        assert!(matches!(err, JanitorError::Decommission(DecommissionError::ClaimDelete { .. })));
    }

    #[tokio::test]
    async fn missing_bucket_section_skips_purge() {
        let cluster = FakeCluster::new().with_workload(statefulset("ns", "db", 1, &[]));
        let mut purger = MockBucketPurge::new();
        purger.expect_purge_bucket().never();

        let janitor = Janitor::new()
            .with_decommissioner(Decommissioner::new(cluster))
            .with_purger(purger);
        let job = JobSpec {
            statefulsets: vec![WorkloadHandle::new("ns", "db")],
            aws_config: None,
        };

        let summary = janitor.run(&job).await.unwrap();
        assert!(summary.purge.is_none());
    }

    #[tokio::test]
    async fn bucket_only_job_needs_no_cluster() {
        let mut purger = MockBucketPurge::new();
        purger
            .expect_purge_bucket()
            .times(1)
            .returning(|_| Ok(PurgeSummary::default()));

        let janitor = Janitor::<FakeCluster, _>::new().with_purger(purger);
        let job = JobSpec {
            statefulsets: Vec::new(),
            aws_config: Some(bucket("logs")),
        };

        let summary = janitor.run(&job).await.unwrap();
        assert!(summary.decommission.is_none());
        assert!(summary.purge.is_some());
    }

    #[tokio::test]
    async fn statefulsets_without_cluster_client_is_an_error() {
        let janitor = Janitor::<FakeCluster, MockBucketPurge>::new();
        let job = JobSpec {
            statefulsets: vec![WorkloadHandle::new("ns", "db")],
            aws_config: None,
        };

        let err = janitor.run(&job).await.unwrap_err();
        assert!(matches!(err, JanitorError::MissingClusterClient));
    }

    #[tokio::test]
    async fn purge_failure_is_reported() {
        let mut purger = MockBucketPurge::new();
        purger.expect_purge_bucket().returning(|bucket| {
            Err(PurgeError::List {
                bucket: bucket.to_string(),
                message: "AccessDenied".to_string(),
            })
        });

        let janitor = Janitor::<FakeCluster, _>::new().with_purger(purger);
        let job = JobSpec {
            statefulsets: Vec::new(),
            aws_config: Some(bucket("logs")),
        };

        let err = janitor.run(&job).await.unwrap_err();
        assert!(matches!(err, JanitorError::Purge(PurgeError::List { .. })));
    }
}
