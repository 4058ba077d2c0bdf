//! In-memory stand-ins for the cluster API and the DNS oracle.
//!
//! `StubCluster` remembers when each name was created and deleted (in tokio
//! time), and `StubOracle` answers lookups from that record with configurable
//! propagation delays.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kubernoisy_core::{
    Action, ApiError, ApiResult, ChurnMetrics, ClusterApi, ConvergenceVerifier, CycleRunner,
    EndpointSpec, NameOracle, ObjectKind, OracleError, OracleResult, ResourceFactory,
    WorkloadSpec,
};
use parking_lot::Mutex;
use tokio::time::Instant;

pub const NAMESPACE: &str = "load-test";
pub const POD_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 1, 2, 3));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub kind: ObjectKind,
    pub action: Action,
    pub namespace: String,
    pub name: String,
}

#[derive(Default)]
struct ClusterState {
    created: HashMap<String, Instant>,
    deleted: HashMap<String, Instant>,
    calls: Vec<Call>,
}

#[derive(Default)]
pub struct StubCluster {
    state: Mutex<ClusterState>,
    failing: Mutex<HashSet<(ObjectKind, Action)>>,
}

impl StubCluster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes every future call of `kind`/`action` fail.
    pub fn fail(&self, kind: ObjectKind, action: Action) {
        self.failing.lock().insert((kind, action));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn created_at(&self, name: &str) -> Option<Instant> {
        self.state.lock().created.get(name).copied()
    }

    pub fn deleted_at(&self, name: &str) -> Option<Instant> {
        self.state.lock().deleted.get(name).copied()
    }

    fn record(
        &self,
        kind: ObjectKind,
        action: Action,
        namespace: &str,
        name: &str,
    ) -> ApiResult<()> {
        let mut state = self.state.lock();
        state.calls.push(Call {
            kind,
            action,
            namespace: namespace.to_string(),
            name: name.to_string(),
        });

        if self.failing.lock().contains(&(kind, action)) {
            return Err(ApiError::new(kind, action, namespace, name, "injected failure"));
        }

        // The pod carries the address, so it drives what DNS can see.
        if kind == ObjectKind::Pod {
            let now = Instant::now();
            match action {
                Action::Add => {
                    state.created.insert(name.to_string(), now);
                }
                Action::Delete => {
                    state.deleted.insert(name.to_string(), now);
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ClusterApi for StubCluster {
    async fn create_workload(&self, spec: &WorkloadSpec) -> ApiResult<()> {
        self.record(ObjectKind::Pod, Action::Add, &spec.namespace, &spec.name)
    }

    async fn create_endpoint(&self, spec: &EndpointSpec) -> ApiResult<()> {
        self.record(ObjectKind::Service, Action::Add, &spec.namespace, &spec.name)
    }

    async fn delete(&self, kind: ObjectKind, namespace: &str, name: &str) -> ApiResult<()> {
        self.record(kind, Action::Delete, namespace, name)
    }
}

/// DNS view of a [`StubCluster`].
///
/// A name resolves `appear_after` its pod was created and stops resolving
/// `vanish_after` the pod was deleted. `None` means never.
pub struct StubOracle {
    cluster: Arc<StubCluster>,
    appear_after: Option<Duration>,
    vanish_after: Option<Duration>,
}

impl StubOracle {
    pub fn new(
        cluster: Arc<StubCluster>,
        appear_after: Option<Duration>,
        vanish_after: Option<Duration>,
    ) -> Arc<Self> {
        Arc::new(Self {
            cluster,
            appear_after,
            vanish_after,
        })
    }
}

#[async_trait]
impl NameOracle for StubOracle {
    async fn resolve(&self, name: &str) -> OracleResult<Vec<IpAddr>> {
        let now = Instant::now();
        let not_found =
            || -> OracleResult<Vec<IpAddr>> { Err(OracleError::NotFound(name.to_string())) };

        if let Some(deleted) = self.cluster.deleted_at(name) {
            return match self.vanish_after {
                Some(delay) if now >= deleted + delay => not_found(),
                _ => Ok(vec![POD_IP]),
            };
        }

        match (self.cluster.created_at(name), self.appear_after) {
            (Some(created), Some(delay)) if now >= created + delay => Ok(vec![POD_IP]),
            _ => not_found(),
        }
    }
}

/// Builds a runner wired to the stubs with a fresh metrics registry.
pub fn runner(
    cluster: &Arc<StubCluster>,
    appear_after: Option<Duration>,
    vanish_after: Option<Duration>,
    timeout: Duration,
) -> Arc<CycleRunner> {
    let oracle = StubOracle::new(Arc::clone(cluster), appear_after, vanish_after);
    let metrics = Arc::new(ChurnMetrics::new().expect("metrics registry"));

    Arc::new(CycleRunner::new(
        Arc::clone(cluster) as Arc<dyn ClusterApi>,
        ConvergenceVerifier::new(oracle),
        ResourceFactory::new(NAMESPACE),
        metrics,
        timeout,
    ))
}
