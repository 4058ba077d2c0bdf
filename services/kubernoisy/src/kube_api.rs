//! Kubernetes-backed [`ClusterApi`].

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, Pod, PodSpec, Service, ServicePort, ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, DeleteParams, PostParams};
use kube::Client;

use kubernoisy_core::{
    Action, ApiError, ApiResult, ClusterApi, EndpointSpec, ObjectKind, WorkloadSpec,
};

const CLUSTER_IP_NONE: &str = "None";
const SERVICE_TYPE_CLUSTER_IP: &str = "ClusterIP";

/// Creates and deletes churn pods and services through the Kubernetes API.
#[derive(Clone)]
pub struct KubeClusterApi {
    client: Client,
}

impl KubeClusterApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connects using in-cluster configuration, falling back to the local kubeconfig.
    pub async fn connect() -> Result<Self, kube::Error> {
        Ok(Self::new(Client::try_default().await?))
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn services(&self, namespace: &str) -> Api<Service> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ClusterApi for KubeClusterApi {
    async fn create_workload(&self, spec: &WorkloadSpec) -> ApiResult<()> {
        self.pods(&spec.namespace)
            .create(&PostParams::default(), &to_pod(spec))
            .await
            .map(|_| ())
            .map_err(|e| {
                ApiError::new(
                    ObjectKind::Pod,
                    Action::Add,
                    &spec.namespace,
                    &spec.name,
                    e.to_string(),
                )
            })
    }

    async fn create_endpoint(&self, spec: &EndpointSpec) -> ApiResult<()> {
        self.services(&spec.namespace)
            .create(&PostParams::default(), &to_service(spec))
            .await
            .map(|_| ())
            .map_err(|e| {
                ApiError::new(
                    ObjectKind::Service,
                    Action::Add,
                    &spec.namespace,
                    &spec.name,
                    e.to_string(),
                )
            })
    }

    async fn delete(&self, kind: ObjectKind, namespace: &str, name: &str) -> ApiResult<()> {
        let params = DeleteParams::default();
        let result = match kind {
            ObjectKind::Pod => self.pods(namespace).delete(name, &params).await.map(|_| ()),
            ObjectKind::Service => self.services(namespace).delete(name, &params).await.map(|_| ()),
        };
        result.map_err(|e| ApiError::new(kind, Action::Delete, namespace, name, e.to_string()))
    }
}

/// Converts a workload description into a pod object.
pub fn to_pod(spec: &WorkloadSpec) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(spec.name.clone()),
            namespace: Some(spec.namespace.clone()),
            labels: Some(spec.labels.clone()),
            ..Default::default()
        },
        spec: Some(PodSpec {
            hostname: Some(spec.hostname.clone()),
            containers: vec![Container {
                name: spec.container_name.clone(),
                image: Some(spec.image.clone()),
                ports: Some(vec![ContainerPort {
                    name: Some(spec.port_name.clone()),
                    container_port: i32::from(spec.port),
                    ..Default::default()
                }]),
                ..Default::default()
            }],
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Converts an endpoint description into a service object.
pub fn to_service(spec: &EndpointSpec) -> Service {
    Service {
        metadata: ObjectMeta {
            name: Some(spec.name.clone()),
            namespace: Some(spec.namespace.clone()),
            labels: Some(spec.labels.clone()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            ports: Some(vec![ServicePort {
                name: Some(spec.port_name.clone()),
                port: i32::from(spec.port),
                ..Default::default()
            }]),
            cluster_ip: spec.headless.then(|| CLUSTER_IP_NONE.to_string()),
            type_: Some(SERVICE_TYPE_CLUSTER_IP.to_string()),
            selector: Some(spec.selector.clone()),
            ..Default::default()
        }),
        ..Default::default()
    }
}
