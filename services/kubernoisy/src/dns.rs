//! System resolver used as the convergence oracle.
//!
//! Lookups go through the platform resolver (`getaddrinfo`), so search
//! domains from `/etc/resolv.conf` apply exactly as they would for any other
//! process in the pod.

use std::io;
use std::net::IpAddr;

use async_trait::async_trait;
use tokio::net::lookup_host;

use kubernoisy_core::{NameOracle, OracleError, OracleResult};

/// Resolver error messages that mean the name does not exist.
const NOT_FOUND_MARKERS: &[&str] = &[
    "name or service not known",
    "name does not resolve",
    "no address associated with hostname",
    "nodename nor servname provided",
    "no such host",
];

/// [`NameOracle`] backed by the platform resolver.
#[derive(Debug, Clone, Default)]
pub struct SystemResolver {
    suffix: Option<String>,
}

impl SystemResolver {
    /// `suffix` is appended to every name, e.g. `load-test.svc.cluster.local`.
    pub fn new(suffix: Option<String>) -> Self {
        let suffix = suffix
            .map(|s| s.trim_matches('.').to_string())
            .filter(|s| !s.is_empty());
        Self { suffix }
    }

    fn qualify(&self, name: &str) -> String {
        match &self.suffix {
            Some(suffix) => format!("{name}.{suffix}"),
            None => name.to_string(),
        }
    }
}

#[async_trait]
impl NameOracle for SystemResolver {
    async fn resolve(&self, name: &str) -> OracleResult<Vec<IpAddr>> {
        let host = self.qualify(name);
        let addrs = lookup_host((host.as_str(), 0))
            .await
            .map_err(|err| classify(&host, &err))?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// Maps a resolver error to the oracle taxonomy.
fn classify(host: &str, err: &io::Error) -> OracleError {
    let message = err.to_string().to_lowercase();
    if NOT_FOUND_MARKERS.iter().any(|marker| message.contains(marker)) {
        OracleError::NotFound(host.to_string())
    } else {
        OracleError::Transient(err.to_string())
    }
}
