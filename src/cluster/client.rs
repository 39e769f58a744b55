use async_trait::async_trait;
use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::PersistentVolumeClaim;
use kube::api::{Api, DeleteParams, PostParams};
use kube::config::KubeConfigOptions;
use kube::{Client, Config};
use tracing::{debug, info};

use super::errors::ClusterError;

/// Cluster operations the decommissioning run depends on.
///
/// Kept narrow so the orchestrator can be driven by an in-memory fake in tests.
#[async_trait]
pub trait ClusterOps: Send + Sync {
    /// Read the current StatefulSet object.
    async fn get_workload(&self, namespace: &str, name: &str) -> Result<StatefulSet, ClusterError>;

    /// Replace the StatefulSet with `workload`, as read and modified by the caller.
    async fn update_workload(&self, namespace: &str, workload: &StatefulSet) -> Result<(), ClusterError>;

    /// Delete one PersistentVolumeClaim. Absence must surface as
    /// [`ClusterError::NotFound`] so callers can tell it apart.
    async fn delete_claim(&self, namespace: &str, claim: &str) -> Result<(), ClusterError>;
}

/// Select aws-lc-rs as the process-wide rustls provider.
///
/// The AWS SDK and kube pull in different rustls backends, and rustls refuses
/// to pick one on its own. Installing twice is harmless.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

/// [`ClusterOps`] backed by a [`kube::Client`].
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client for an already resolved configuration.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        install_crypto_provider();
        Ok(Self::new(Client::try_from(config)?))
    }

    /// Connect using the in-cluster service account or the local kubeconfig.
    /// A named `context` forces kubeconfig loading with that context selected.
    pub async fn connect(context: Option<&str>) -> anyhow::Result<Self> {
        let config = match context {
            Some(context) => {
                let options = KubeConfigOptions {
                    context: Some(context.to_string()),
                    ..Default::default()
                };
                info!(context = %context, "Using kubeconfig context");
                Config::from_kubeconfig(&options).await?
            }
            None => Config::infer().await?,
        };
        Self::from_config(config)
    }

    fn statefulsets(&self, namespace: &str) -> Api<StatefulSet> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn claims(&self, namespace: &str) -> Api<PersistentVolumeClaim> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ClusterOps for KubeClusterClient {
    async fn get_workload(&self, namespace: &str, name: &str) -> Result<StatefulSet, ClusterError> {
        debug!(namespace, workload = name, "GET statefulset");
        self.statefulsets(namespace)
            .get(name)
            .await
            .map_err(|e| ClusterError::from_kube("StatefulSet", name, e))
    }

    async fn update_workload(&self, namespace: &str, workload: &StatefulSet) -> Result<(), ClusterError> {
        let name = workload
            .metadata
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or(ClusterError::MissingName { kind: "StatefulSet" })?;
        debug!(namespace, workload = name, "PUT statefulset");
        self.statefulsets(namespace)
            .replace(name, &PostParams::default(), workload)
            .await
            .map(|_| ())
            .map_err(|e| ClusterError::from_kube("StatefulSet", name, e))
    }

    async fn delete_claim(&self, namespace: &str, claim: &str) -> Result<(), ClusterError> {
        debug!(namespace, claim, "DELETE persistentvolumeclaim");
        self.claims(namespace)
            .delete(claim, &DeleteParams::default())
            .await
            .map(|_| ())
            .map_err(|e| ClusterError::from_kube("PersistentVolumeClaim", claim, e))
    }
}
