//! Kubernetes access for the decommissioning run.
//!
//! The orchestrator only depends on the [`ClusterOps`] trait. The default
//! implementation, [`KubeClusterClient`], is backed by the [`kube`] crate and
//! talks to the cluster using the ambient configuration (in-cluster or the
//! local kubeconfig).

pub mod client;
pub mod errors;

pub use client::{install_crypto_provider, ClusterOps, KubeClusterClient};
pub use errors::ClusterError;
