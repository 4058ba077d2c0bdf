//! Declarative descriptions of the two objects created per churn cycle.
//!
//! Construction is pure: the factory never talks to the cluster and cannot
//! fail. Only the later create call can.

use std::collections::BTreeMap;
use std::fmt;

use crate::identity::CycleIdentity;

/// Container image used for churn pods.
pub const DEFAULT_IMAGE: &str = "gcr.io/google_containers/pause:3.2";

/// Port declared on both the pod and the service.
pub const DEFAULT_PORT: u16 = 1234;

/// Name of the declared port, also used as the noise label key.
pub const PORT_NAME: &str = "kubernoisy";

const NOISE_LABEL_KEY: &str = "kubernoisy";
const NOISE_LABEL_VALUE: &str = "noise";
const APP_LABEL_KEY: &str = "app";
const POD_HOSTNAME: &str = "pod";

/// Kind of cluster object a cycle manipulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Workload object.
    Pod,
    /// Headless network endpoint selecting the pod.
    Service,
}

impl ObjectKind {
    /// Label value used in metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pod => "pod",
            Self::Service => "service",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutation performed on a cluster object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Create.
    Add,
    /// Delete.
    Delete,
}

impl Action {
    /// Label value used in metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workload (pod) description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadSpec {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub hostname: String,
    pub container_name: String,
    pub image: String,
    pub port_name: String,
    pub port: u16,
}

/// Network endpoint (headless service) description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSpec {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub selector: BTreeMap<String, String>,
    /// Headless services get cluster IP `None` so DNS returns pod addresses.
    pub headless: bool,
    pub port_name: String,
    pub port: u16,
}

/// The two objects of one cycle, both named after the same identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePair {
    pub workload: WorkloadSpec,
    pub endpoint: EndpointSpec,
}

/// Builds [`ResourcePair`]s for a fixed namespace.
#[derive(Debug, Clone)]
pub struct ResourceFactory {
    namespace: String,
    image: String,
    port: u16,
}

impl ResourceFactory {
    /// Creates a factory using the default image and port.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            image: DEFAULT_IMAGE.to_string(),
            port: DEFAULT_PORT,
        }
    }

    /// Overrides the container image.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Overrides the declared port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Target namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Builds the pod and service descriptions for `identity`.
    #[must_use]
    pub fn build(&self, identity: &CycleIdentity) -> ResourcePair {
        let name = identity.as_str().to_string();

        let mut workload_labels = noise_labels();
        workload_labels.insert(APP_LABEL_KEY.to_string(), name.clone());

        let workload = WorkloadSpec {
            name: name.clone(),
            namespace: self.namespace.clone(),
            labels: workload_labels,
            hostname: POD_HOSTNAME.to_string(),
            container_name: name.clone(),
            image: self.image.clone(),
            port_name: PORT_NAME.to_string(),
            port: self.port,
        };

        let endpoint = EndpointSpec {
            name: name.clone(),
            namespace: self.namespace.clone(),
            labels: noise_labels(),
            selector: BTreeMap::from([(APP_LABEL_KEY.to_string(), name)]),
            headless: true,
            port_name: PORT_NAME.to_string(),
            port: self.port,
        };

        ResourcePair { workload, endpoint }
    }
}

fn noise_labels() -> BTreeMap<String, String> {
    BTreeMap::from([(NOISE_LABEL_KEY.to_string(), NOISE_LABEL_VALUE.to_string())])
}
