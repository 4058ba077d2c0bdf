//! Process-wide churn configuration.
//!
//! Set once at startup and read-only afterwards. The binary fills it from
//! command-line flags and environment variables.

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::resources::DEFAULT_IMAGE;
use crate::scheduler::ConcurrencyPolicy;
use crate::verifier::DEFAULT_POLL_INTERVAL;

/// Default metrics bind address, all interfaces.
pub const DEFAULT_METRICS_ADDR: &str = ":9696";

/// Default target namespace.
pub const DEFAULT_NAMESPACE: &str = "load-test";

/// Default verification timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Settings for one churn run.
#[derive(Debug, Clone)]
pub struct ChurnConfig {
    /// Cycles launched per second.
    pub ops: f64,

    /// Namespace every churn object is created in.
    pub namespace: String,

    /// Upper bound for each verification phase.
    pub timeout: Duration,

    /// Pause between two oracle queries.
    pub poll_interval: Duration,

    /// Metrics endpoint bind address (`:port` binds all interfaces).
    pub metrics_addr: String,

    /// Log API failures and per-cycle results.
    pub verbose: bool,

    /// Cap on concurrently running cycles; `None` is unbounded.
    pub max_in_flight: Option<usize>,

    /// Domain appended to identities before resolving them.
    pub dns_suffix: Option<String>,

    /// Container image for churn pods.
    pub image: String,
}

impl Default for ChurnConfig {
    fn default() -> Self {
        Self {
            ops: 1.0,
            namespace: DEFAULT_NAMESPACE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            metrics_addr: DEFAULT_METRICS_ADDR.to_string(),
            verbose: false,
            max_in_flight: None,
            dns_suffix: None,
            image: DEFAULT_IMAGE.to_string(),
        }
    }
}

impl ChurnConfig {
    /// Rejects settings the churn loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_rate(self.ops)?;
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroDuration { field: "timeout" });
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroDuration {
                field: "poll_interval",
            });
        }
        if self.max_in_flight == Some(0) {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }
        self.metrics_socket_addr()?;
        Ok(())
    }

    /// Concurrency policy derived from `max_in_flight`.
    pub fn concurrency_policy(&self) -> ConcurrencyPolicy {
        match self.max_in_flight {
            Some(limit) => ConcurrencyPolicy::Bounded(limit),
            None => ConcurrencyPolicy::Unbounded,
        }
    }

    /// Parses the metrics address; a bare `:port` binds `0.0.0.0`.
    pub fn metrics_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = self.metrics_addr.trim();
        let full = if addr.starts_with(':') {
            format!("0.0.0.0{addr}")
        } else {
            addr.to_string()
        };
        full.parse()
            .map_err(|_| ConfigError::InvalidBindAddress(self.metrics_addr.clone()))
    }
}

/// Checks that a rate is above zero and returns the time between two launches.
///
/// Rates whose period does not fit a [`Duration`] or rounds down to zero are
/// rejected as well.
pub fn validate_rate(ops: f64) -> Result<Duration, ConfigError> {
    if !(ops.is_finite() && ops > 0.0) {
        return Err(ConfigError::InvalidRate(ops));
    }
    match Duration::try_from_secs_f64(1.0 / ops) {
        Ok(period) if !period.is_zero() => Ok(period),
        _ => Err(ConfigError::InvalidRate(ops)),
    }
}

/// Parses durations such as `250ms`, `30s`, `5m`, `1h30m` or `1.5s`.
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(ConfigError::invalid_duration(input, "empty"));
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| ConfigError::invalid_duration(input, "missing unit"))?;
        if number_len == 0 {
            return Err(ConfigError::invalid_duration(input, "expected a number"));
        }
        let value: f64 = rest[..number_len]
            .parse()
            .map_err(|_| ConfigError::invalid_duration(input, "malformed number"))?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        total += match &rest[..unit_len] {
            "ms" => value / 1000.0,
            "s" => value,
            "m" => value * 60.0,
            "h" => value * 3600.0,
            other => {
                return Err(ConfigError::invalid_duration(
                    input,
                    format!("unknown unit `{other}`"),
                ))
            }
        };
        rest = &rest[unit_len..];
    }

    Duration::try_from_secs_f64(total)
        .map_err(|e| ConfigError::invalid_duration(input, e.to_string()))
}
