//! One churn cycle: create, verify presence, delete, verify absence.
//!
//! Nothing here is fatal. API failures are logged at debug level and counted,
//! verification timeouts are counted, and the cycle always runs all four
//! phases in order.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::ApiResult;
use crate::identity::{CycleIdentity, NameGenerator};
use crate::metrics::ChurnMetrics;
use crate::resources::{Action, ObjectKind, ResourceFactory};
use crate::traits::ClusterApi;
use crate::verifier::{ConvergenceVerifier, VerificationOutcome, VerifyMode};

/// What happened during one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub identity: CycleIdentity,
    pub created: VerificationOutcome,
    pub deleted: VerificationOutcome,
    /// Number of create/delete calls the API rejected.
    pub api_failures: usize,
}

/// Shared, immutable context every cycle runs against.
pub struct CycleRunner {
    api: Arc<dyn ClusterApi>,
    verifier: ConvergenceVerifier,
    factory: ResourceFactory,
    names: NameGenerator,
    metrics: Arc<ChurnMetrics>,
    timeout: Duration,
}

impl CycleRunner {
    /// Wires the collaborators shared by every cycle; `timeout` bounds each verification.
    pub fn new(
        api: Arc<dyn ClusterApi>,
        verifier: ConvergenceVerifier,
        factory: ResourceFactory,
        metrics: Arc<ChurnMetrics>,
        timeout: Duration,
    ) -> Self {
        Self {
            api,
            verifier,
            factory,
            names: NameGenerator::default(),
            metrics,
            timeout,
        }
    }

    /// Replaces the default name generator.
    #[must_use]
    pub fn with_name_generator(mut self, names: NameGenerator) -> Self {
        self.names = names;
        self
    }

    /// Recorder every cycle reports to.
    pub fn metrics(&self) -> &Arc<ChurnMetrics> {
        &self.metrics
    }

    /// Runs a complete cycle for a freshly generated identity.
    pub async fn run_cycle(&self) -> CycleReport {
        let identity = self.names.generate();
        let _in_flight = self.metrics.track_in_flight();
        let resources = self.factory.build(&identity);
        let namespace = self.factory.namespace();
        let mut api_failures = 0;

        if !self
            .attempt(
                ObjectKind::Pod,
                Action::Add,
                &identity,
                self.api.create_workload(&resources.workload),
            )
            .await
        {
            api_failures += 1;
        }
        if !self
            .attempt(
                ObjectKind::Service,
                Action::Add,
                &identity,
                self.api.create_endpoint(&resources.endpoint),
            )
            .await
        {
            api_failures += 1;
        }

        let created = self.verify(&identity, VerifyMode::presence()).await;

        for kind in [ObjectKind::Pod, ObjectKind::Service] {
            let call = self.api.delete(kind, namespace, identity.as_str());
            if !self.attempt(kind, Action::Delete, &identity, call).await {
                api_failures += 1;
            }
        }

        let deleted = self.verify(&identity, VerifyMode::Absence).await;

        debug!(
            %identity,
            namespace,
            add_converged = created.converged,
            add_secs = created.elapsed.as_secs_f64(),
            delete_converged = deleted.converged,
            delete_secs = deleted.elapsed.as_secs_f64(),
            api_failures,
            "cycle complete"
        );

        CycleReport {
            identity,
            created,
            deleted,
            api_failures,
        }
    }

    /// Counts an API call on attempt and its failure separately. Returns
    /// `true` when the call succeeded.
    async fn attempt<F>(
        &self,
        kind: ObjectKind,
        action: Action,
        identity: &CycleIdentity,
        call: F,
    ) -> bool
    where
        F: Future<Output = ApiResult<()>>,
    {
        let result = call.await;
        self.metrics.record_action(kind, action);

        match result {
            Ok(()) => true,
            Err(err) => {
                self.metrics.record_action_error(kind, action);
                debug!(%identity, object = %kind, %action, error = %err, "api call failed");
                false
            }
        }
    }

    async fn verify(&self, identity: &CycleIdentity, mode: VerifyMode) -> VerificationOutcome {
        let action = mode.action();
        let outcome = self
            .verifier
            .await_convergence(identity, &mode, self.timeout)
            .await;
        self.metrics.record_validation(action, &outcome);

        if !outcome.converged {
            debug!(
                %identity,
                %action,
                timeout_secs = self.timeout.as_secs_f64(),
                "validation timed out"
            );
        }
        outcome
    }
}
