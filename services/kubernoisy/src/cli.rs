use clap::Parser;
use kubernoisy_core::config::{DEFAULT_METRICS_ADDR, DEFAULT_NAMESPACE};
use kubernoisy_core::resources::DEFAULT_IMAGE;
use kubernoisy_core::{parse_duration, ChurnConfig};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "kubernoisy")]
#[command(
    about = "Churns pods and headless services and measures DNS convergence",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Operations per second
    #[arg(long, env = "KUBERNOISY_OPS", default_value_t = 1.0, allow_negative_numbers = true)]
    pub ops: f64,

    /// Prometheus endpoint
    #[arg(long, env = "KUBERNOISY_PROM", default_value = DEFAULT_METRICS_ADDR)]
    pub prom: String,

    /// Namespace to operate in
    #[arg(long, env = "KUBERNOISY_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Timeout for validation (e.g. 30s, 5m, 1h)
    #[arg(long, env = "KUBERNOISY_TIMEOUT", default_value = "30m", value_parser = parse_duration)]
    pub timeout: Duration,

    /// Verbose log output
    #[arg(long, env = "KUBERNOISY_VERBOSE")]
    pub verbose: bool,

    /// Interval between DNS lookups while validating
    #[arg(
        long,
        env = "KUBERNOISY_POLL_INTERVAL",
        default_value = "1s",
        value_parser = parse_duration
    )]
    pub poll_interval: Duration,

    /// Maximum number of concurrently running cycles (unbounded when unset)
    #[arg(long, env = "KUBERNOISY_MAX_IN_FLIGHT")]
    pub max_in_flight: Option<usize>,

    /// Domain appended to generated names before lookup (e.g. load-test.svc.cluster.local)
    #[arg(long, env = "KUBERNOISY_DNS_SUFFIX")]
    pub dns_suffix: Option<String>,

    /// Container image for churn pods
    #[arg(long, env = "KUBERNOISY_IMAGE", default_value = DEFAULT_IMAGE)]
    pub image: String,
}

impl Cli {
    pub fn into_config(self) -> ChurnConfig {
        ChurnConfig {
            ops: self.ops,
            namespace: self.namespace,
            timeout: self.timeout,
            poll_interval: self.poll_interval,
            metrics_addr: self.prom,
            verbose: self.verbose,
            max_in_flight: self.max_in_flight,
            dns_suffix: self.dns_suffix,
            image: self.image,
        }
    }
}
