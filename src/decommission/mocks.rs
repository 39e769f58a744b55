// In-memory cluster for exercising the orchestrator - no API server involved

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{StatefulSet, StatefulSetSpec};
use k8s_openapi::api::core::v1::PersistentVolumeClaim;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use crate::cluster::{ClusterError, ClusterOps};

/// Calls received by [`FakeCluster`], in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterCall {
    GetWorkload { namespace: String, name: String },
    UpdateWorkload { namespace: String, name: String, replicas: Option<i32> },
    DeleteClaim { namespace: String, claim: String },
}

type Key = (String, String);

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

/// Build a StatefulSet with the given replica count and claim templates
pub fn statefulset(namespace: &str, name: &str, replicas: i32, templates: &[&str]) -> StatefulSet {
    let volume_claim_templates = templates
        .iter()
        .map(|template| PersistentVolumeClaim {
            metadata: ObjectMeta {
                name: Some(template.to_string()),
                ..Default::default()
            },
            ..Default::default()
        })
        .collect::<Vec<_>>();

    StatefulSet {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some([("app".to_string(), name.to_string())].into_iter().collect()),
            ..Default::default()
        },
        spec: Some(StatefulSetSpec {
            replicas: Some(replicas),
            volume_claim_templates: if volume_claim_templates.is_empty() {
                None
            } else {
                Some(volume_claim_templates)
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Records every call and answers from an in-memory set of StatefulSets
#[derive(Debug, Default)]
pub struct FakeCluster {
    workloads: Mutex<HashMap<Key, StatefulSet>>,
    calls: Mutex<Vec<ClusterCall>>,
    absent_claims: Mutex<HashSet<Key>>,
    failing_claims: Mutex<HashMap<Key, ClusterError>>,
    failing_gets: Mutex<HashMap<Key, ClusterError>>,
    failing_updates: Mutex<HashMap<Key, ClusterError>>,
    failing_polls: Mutex<HashMap<Key, ClusterError>>,
    replicas_after_update: Mutex<HashMap<Key, i32>>,
    updated: Mutex<HashMap<Key, StatefulSet>>,
    poll_latency: Mutex<Option<Duration>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workload(self, workload: StatefulSet) -> Self {
        let namespace = workload.metadata.namespace.clone().unwrap_or_default();
        let name = workload.metadata.name.clone().unwrap_or_default();
        self.workloads.lock().unwrap().insert((namespace, name), workload);
        self
    }

    /// Deleting `claim` answers NotFound
    pub fn with_absent_claim(self, namespace: &str, claim: &str) -> Self {
        self.absent_claims.lock().unwrap().insert(key(namespace, claim));
        self
    }

    pub fn with_failing_claim(self, namespace: &str, claim: &str, error: ClusterError) -> Self {
        self.failing_claims.lock().unwrap().insert(key(namespace, claim), error);
        self
    }

    pub fn with_failing_get(self, namespace: &str, name: &str, error: ClusterError) -> Self {
        self.failing_gets.lock().unwrap().insert(key(namespace, name), error);
        self
    }

    pub fn with_failing_update(self, namespace: &str, name: &str, error: ClusterError) -> Self {
        self.failing_updates.lock().unwrap().insert(key(namespace, name), error);
        self
    }

    /// Reads issued after an update fail with `error`
    pub fn with_failing_poll(self, namespace: &str, name: &str, error: ClusterError) -> Self {
        self.failing_polls.lock().unwrap().insert(key(namespace, name), error);
        self
    }

    /// Something else scales the StatefulSet back to `replicas` right after our update
    pub fn with_replicas_after_update(self, namespace: &str, name: &str, replicas: i32) -> Self {
        self.replicas_after_update
            .lock()
            .unwrap()
            .insert(key(namespace, name), replicas);
        self
    }

    /// Reads issued after an update take this long to answer
    pub fn with_poll_latency(self, latency: Duration) -> Self {
        *self.poll_latency.lock().unwrap() = Some(latency);
        self
    }

    pub fn calls(&self) -> Vec<ClusterCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn deleted_claims(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ClusterCall::DeleteClaim { claim, .. } => Some(claim),
                _ => None,
            })
            .collect()
    }

    pub fn gets_for(&self, name: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ClusterCall::GetWorkload { name: n, .. } if n == name))
            .count()
    }

    /// The object last sent through `update_workload`
    pub fn last_update(&self, namespace: &str, name: &str) -> Option<StatefulSet> {
        self.updated.lock().unwrap().get(&key(namespace, name)).cloned()
    }

    fn record(&self, call: ClusterCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ClusterOps for FakeCluster {
    async fn get_workload(&self, namespace: &str, name: &str) -> Result<StatefulSet, ClusterError> {
        self.record(ClusterCall::GetWorkload {
            namespace: namespace.to_string(),
            name: name.to_string(),
        });

        let k = key(namespace, name);
        let after_update = self.updated.lock().unwrap().contains_key(&k);
        let latency = *self.poll_latency.lock().unwrap();
        if let (true, Some(latency)) = (after_update, latency) {
            tokio::time::sleep(latency).await;
        }

        if let Some(error) = self.failing_gets.lock().unwrap().get(&k) {
            return Err(error.clone());
        }
        if after_update {
            if let Some(error) = self.failing_polls.lock().unwrap().get(&k) {
                return Err(error.clone());
            }
        }

        self.workloads
            .lock()
            .unwrap()
            .get(&k)
            .cloned()
            .ok_or_else(|| ClusterError::NotFound {
                kind: "StatefulSet",
                name: name.to_string(),
            })
    }

    async fn update_workload(&self, namespace: &str, workload: &StatefulSet) -> Result<(), ClusterError> {
        let name = workload.metadata.name.clone().unwrap_or_default();
        self.record(ClusterCall::UpdateWorkload {
            namespace: namespace.to_string(),
            name: name.clone(),
            replicas: workload.spec.as_ref().and_then(|spec| spec.replicas),
        });

        let k = key(namespace, &name);
        if let Some(error) = self.failing_updates.lock().unwrap().get(&k) {
            return Err(error.clone());
        }

        let mut stored = workload.clone();
        if let Some(replicas) = self.replicas_after_update.lock().unwrap().get(&k) {
            if let Some(spec) = stored.spec.as_mut() {
                spec.replicas = Some(*replicas);
            }
        }
        self.updated.lock().unwrap().insert(k.clone(), workload.clone());
        self.workloads.lock().unwrap().insert(k, stored);
        Ok(())
    }

    async fn delete_claim(&self, namespace: &str, claim: &str) -> Result<(), ClusterError> {
        self.record(ClusterCall::DeleteClaim {
            namespace: namespace.to_string(),
            claim: claim.to_string(),
        });

        let k = key(namespace, claim);
        if self.absent_claims.lock().unwrap().contains(&k) {
            return Err(ClusterError::NotFound {
                kind: "PersistentVolumeClaim",
                name: claim.to_string(),
            });
        }
        if let Some(error) = self.failing_claims.lock().unwrap().get(&k) {
            return Err(error.clone());
        }
        Ok(())
    }
}
