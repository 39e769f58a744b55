use thiserror::Error;

/// Errors returned by a [`ClusterOps`](super::ClusterOps) implementation.
#[derive(Debug, Clone, Error)]
pub enum ClusterError {
    #[error("{kind} {name} not found")]
    NotFound { kind: &'static str, name: String },

    #[error("API request rejected (HTTP {code} {reason}): {message}")]
    Api {
        code: u16,
        reason: String,
        message: String,
    },

    #[error("cluster transport error: {message}")]
    Transport { message: String },

    #[error("{kind} object has no metadata.name")]
    MissingName { kind: &'static str },
}

impl ClusterError {
    /// True when the target object does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            ClusterError::NotFound { .. } => true,
            ClusterError::Api { code, .. } => *code == 404,
            ClusterError::Transport { .. } | ClusterError::MissingName { .. } => false,
        }
    }

    pub(crate) fn from_kube(kind: &'static str, name: &str, err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) if response.code == 404 => ClusterError::NotFound {
                kind,
                name: name.to_string(),
            },
            kube::Error::Api(response) => ClusterError::Api {
                code: response.code,
                reason: response.reason,
                message: response.message,
            },
            other => ClusterError::Transport {
                message: other.to_string(),
            },
        }
    }
}
