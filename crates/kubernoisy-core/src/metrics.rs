//! Prometheus metrics for churn cycles.
//!
//! A single [`ChurnMetrics`] is built at startup and shared by the scheduler
//! and every cycle. Each recorder owns a private registry. All updates go
//! through prometheus atomics; callers never lock.

use prometheus::{
    linear_buckets, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge,
    Opts, Registry, TextEncoder,
};

use crate::resources::{Action, ObjectKind};
use crate::verifier::VerificationOutcome;

/// Namespace prefix of every exported metric.
pub const METRICS_NAMESPACE: &str = "kubernoisy";

/// Process-wide recorder for action counts and validation results.
#[derive(Clone)]
pub struct ChurnMetrics {
    registry: Registry,
    action_count: IntCounterVec,
    action_errors: IntCounterVec,
    validation_failures: IntCounterVec,
    validation_duration: HistogramVec,
    cycles_in_flight: IntGauge,
    cycles_started: IntCounter,
}

impl ChurnMetrics {
    /// Builds the recorder on a fresh registry.
    pub fn new() -> prometheus::Result<Self> {
        Self::with_registry(Registry::new())
    }

    /// Builds the recorder and registers every metric on `registry`.
    pub fn with_registry(registry: Registry) -> prometheus::Result<Self> {
        let action_count = IntCounterVec::new(
            Opts::new("action_count_total", "Counter of object actions")
                .namespace(METRICS_NAMESPACE),
            &["object", "action"],
        )?;

        let action_errors = IntCounterVec::new(
            Opts::new(
                "action_error_count_total",
                "Counter of object actions rejected by the API",
            )
            .namespace(METRICS_NAMESPACE),
            &["object", "action"],
        )?;

        let validation_failures = IntCounterVec::new(
            Opts::new("validation_fail_count_total", "Counter of validation failures")
                .namespace(METRICS_NAMESPACE),
            &["action"],
        )?;

        // Buckets: 0s, 1s, ..., 29s
        let validation_duration = HistogramVec::new(
            HistogramOpts::new("validation_duration_seconds", "Delay to reflect in DNS record")
                .namespace(METRICS_NAMESPACE)
                .buckets(linear_buckets(0.0, 1.0, 30)?),
            &["action"],
        )?;

        let cycles_in_flight = IntGauge::with_opts(
            Opts::new("cycles_in_flight", "Number of churn cycles currently running")
                .namespace(METRICS_NAMESPACE),
        )?;

        let cycles_started = IntCounter::with_opts(
            Opts::new("cycles_started_total", "Counter of churn cycles launched")
                .namespace(METRICS_NAMESPACE),
        )?;

        registry.register(Box::new(action_count.clone()))?;
        registry.register(Box::new(action_errors.clone()))?;
        registry.register(Box::new(validation_failures.clone()))?;
        registry.register(Box::new(validation_duration.clone()))?;
        registry.register(Box::new(cycles_in_flight.clone()))?;
        registry.register(Box::new(cycles_started.clone()))?;

        Ok(Self {
            registry,
            action_count,
            action_errors,
            validation_failures,
            validation_duration,
            cycles_in_flight,
            cycles_started,
        })
    }

    /// Counts an attempted API action.
    pub fn record_action(&self, kind: ObjectKind, action: Action) {
        self.action_count
            .with_label_values(&[kind.as_str(), action.as_str()])
            .inc();
    }

    /// Counts an API action that returned an error.
    pub fn record_action_error(&self, kind: ObjectKind, action: Action) {
        self.action_errors
            .with_label_values(&[kind.as_str(), action.as_str()])
            .inc();
    }

    /// Folds a verification outcome into the failure counter or the duration histogram.
    pub fn record_validation(&self, action: Action, outcome: &VerificationOutcome) {
        if outcome.converged {
            self.validation_duration
                .with_label_values(&[action.as_str()])
                .observe(outcome.elapsed.as_secs_f64());
        } else {
            self.validation_failures
                .with_label_values(&[action.as_str()])
                .inc();
        }
    }

    /// Counts a cycle handed to the runtime.
    pub fn record_cycle_launch(&self) {
        self.cycles_started.inc();
    }

    /// Marks a cycle as running until the returned guard is dropped.
    #[must_use]
    pub fn track_in_flight(&self) -> InFlightGuard {
        self.cycles_in_flight.inc();
        InFlightGuard {
            gauge: self.cycles_in_flight.clone(),
        }
    }

    /// Attempts recorded for `kind` and `action`.
    pub fn action_count(&self, kind: ObjectKind, action: Action) -> u64 {
        self.action_count
            .with_label_values(&[kind.as_str(), action.as_str()])
            .get()
    }

    /// Failed attempts recorded for `kind` and `action`.
    pub fn action_error_count(&self, kind: ObjectKind, action: Action) -> u64 {
        self.action_errors
            .with_label_values(&[kind.as_str(), action.as_str()])
            .get()
    }

    /// Verifications of `action` that timed out.
    pub fn validation_failures(&self, action: Action) -> u64 {
        self.validation_failures
            .with_label_values(&[action.as_str()])
            .get()
    }

    /// Number of observations and their sum in seconds.
    pub fn validation_samples(&self, action: Action) -> (u64, f64) {
        let histogram = self.validation_duration.with_label_values(&[action.as_str()]);
        (histogram.get_sample_count(), histogram.get_sample_sum())
    }

    /// Cycles currently running.
    pub fn cycles_in_flight(&self) -> i64 {
        self.cycles_in_flight.get()
    }

    /// Cycles launched so far.
    pub fn cycles_started(&self) -> u64 {
        self.cycles_started.get()
    }

    /// Underlying registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Renders every metric in the Prometheus text exposition format.
    pub fn encode_text(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Decrements the in-flight gauge on drop, including when a cycle panics.
pub struct InFlightGuard {
    gauge: IntGauge,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.gauge.dec();
    }
}
