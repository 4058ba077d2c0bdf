use std::net::IpAddr;

use async_trait::async_trait;

use crate::error::{ApiResult, OracleResult};
use crate::resources::{EndpointSpec, ObjectKind, WorkloadSpec};

/// Orchestration API used by churn cycles.
///
/// Implementations must be safe to call from many cycles at once.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Creates the workload object.
    async fn create_workload(&self, spec: &WorkloadSpec) -> ApiResult<()>;

    /// Creates the network endpoint object.
    async fn create_endpoint(&self, spec: &EndpointSpec) -> ApiResult<()>;

    /// Deletes an object by kind, namespace and name.
    async fn delete(&self, kind: ObjectKind, namespace: &str, name: &str) -> ApiResult<()>;
}

/// External name-resolution service queried for convergence.
#[async_trait]
pub trait NameOracle: Send + Sync {
    /// Forward lookup. `Err(OracleError::NotFound)` means the name positively
    /// does not exist; any other error is transient.
    async fn resolve(&self, name: &str) -> OracleResult<Vec<IpAddr>>;
}
