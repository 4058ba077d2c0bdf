use std::net::SocketAddr;

use kubernoisy_core::ConfigError;
use thiserror::Error;

/// Failures that stop the process before or while the churn loop starts.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("could not connect to the Kubernetes API: {0}")]
    Kube(#[from] kube::Error),

    #[error("could not build metrics registry: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("failed to bind metrics endpoint {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

pub type ServiceResult<T> = Result<T, ServiceError>;
