//! Convergence verification by polling the name-resolution oracle.
//!
//! The oracle is queried once immediately and then once per poll interval
//! (one second by default) until the target condition holds or the timeout
//! elapses. There is no backoff.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::trace;

use crate::error::OracleResult;
use crate::identity::CycleIdentity;
use crate::resources::Action;
use crate::traits::NameOracle;

/// Default pause between two oracle queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Target state of a verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyMode {
    /// The name resolves to at least one address, or to `expected` when set.
    Presence { expected: Option<IpAddr> },
    /// The oracle reports the name as not found.
    Absence,
}

impl VerifyMode {
    /// Presence without an expected address.
    #[must_use]
    pub const fn presence() -> Self {
        Self::Presence { expected: None }
    }

    /// Metric action this verification belongs to.
    #[must_use]
    pub const fn action(&self) -> Action {
        match self {
            Self::Presence { .. } => Action::Add,
            Self::Absence => Action::Delete,
        }
    }

    fn is_satisfied_by(&self, answer: &OracleResult<Vec<IpAddr>>) -> bool {
        match (self, answer) {
            (Self::Presence { expected: None }, Ok(addrs)) => !addrs.is_empty(),
            (Self::Presence { expected: Some(ip) }, Ok(addrs)) => addrs.contains(ip),
            (Self::Absence, Err(err)) => err.is_not_found(),
            _ => false,
        }
    }
}

/// Result of one verification phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationOutcome {
    /// Whether the oracle reached the expected state before the timeout.
    pub converged: bool,
    /// Time from the first poll to the satisfying poll, or to giving up.
    pub elapsed: Duration,
}

/// Polls a [`NameOracle`] until a name reaches the requested state.
#[derive(Clone)]
pub struct ConvergenceVerifier {
    oracle: Arc<dyn NameOracle>,
    poll_interval: Duration,
}

impl ConvergenceVerifier {
    /// Creates a verifier polling every [`DEFAULT_POLL_INTERVAL`].
    pub fn new(oracle: Arc<dyn NameOracle>) -> Self {
        Self {
            oracle,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Current poll interval.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Waits for `identity` to reach `mode` within `timeout`.
    ///
    /// On success `elapsed` is the offset from the first poll at which the
    /// successful poll was issued (zero if the first poll succeeded). On
    /// timeout it is the offset at which polling gave up.
    pub async fn await_convergence(
        &self,
        identity: &CycleIdentity,
        mode: &VerifyMode,
        timeout: Duration,
    ) -> VerificationOutcome {
        let start = Instant::now();
        let mut polls = 0u32;

        loop {
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                trace!(%identity, ?mode, polls, "verification timed out");
                return VerificationOutcome {
                    converged: false,
                    elapsed,
                };
            }

            let answer = self.oracle.resolve(identity.as_str()).await;
            polls += 1;

            if mode.is_satisfied_by(&answer) {
                trace!(%identity, ?mode, polls, elapsed_secs = elapsed.as_secs_f64(), "converged");
                return VerificationOutcome {
                    converged: true,
                    elapsed,
                };
            }

            if let Err(err) = &answer {
                trace!(%identity, ?mode, error = %err, "not converged yet");
            }

            sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OracleError;
    use async_trait::async_trait;
    use std::net::Ipv4Addr;

    const ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7));

    /// Answers `before` until `switch_after` has passed, then `after`.
    struct SwitchingOracle {
        created: Instant,
        switch_after: Option<Duration>,
        before: OracleResult<Vec<IpAddr>>,
        after: OracleResult<Vec<IpAddr>>,
    }

    impl SwitchingOracle {
        fn new(
            switch_after: Option<Duration>,
            before: OracleResult<Vec<IpAddr>>,
            after: OracleResult<Vec<IpAddr>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                created: Instant::now(),
                switch_after,
                before,
                after,
            })
        }
    }

    #[async_trait]
    impl NameOracle for SwitchingOracle {
        async fn resolve(&self, _name: &str) -> OracleResult<Vec<IpAddr>> {
            match self.switch_after {
                Some(after) if self.created.elapsed() >= after => self.after.clone(),
                _ => self.before.clone(),
            }
        }
    }

    fn not_found() -> OracleResult<Vec<IpAddr>> {
        Err(OracleError::NotFound("kubernoisy-test".to_string()))
    }

    fn id() -> CycleIdentity {
        CycleIdentity::new("kubernoisy-test")
    }

    #[tokio::test(start_paused = true)]
    async fn test_presence_converges_after_k_seconds() {
        let oracle =
            SwitchingOracle::new(Some(Duration::from_secs(3)), not_found(), Ok(vec![ADDR]));
        let verifier = ConvergenceVerifier::new(oracle);

        let outcome = verifier
            .await_convergence(&id(), &VerifyMode::presence(), Duration::from_secs(30))
            .await;

        assert!(outcome.converged);
        assert_eq!(outcome.elapsed.as_secs(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_presence_immediate_reports_zero() {
        let oracle = SwitchingOracle::new(Some(Duration::ZERO), not_found(), Ok(vec![ADDR]));
        let verifier = ConvergenceVerifier::new(oracle);

        let outcome = verifier
            .await_convergence(&id(), &VerifyMode::presence(), Duration::from_secs(5))
            .await;

        assert!(outcome.converged);
        assert_eq!(outcome.elapsed, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_presence_times_out() {
        let oracle = SwitchingOracle::new(None, not_found(), Ok(vec![ADDR]));
        let verifier = ConvergenceVerifier::new(oracle);

        let outcome = verifier
            .await_convergence(&id(), &VerifyMode::presence(), Duration::from_secs(5))
            .await;

        assert!(!outcome.converged);
        assert_eq!(outcome.elapsed.as_secs(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_presence_ignores_empty_answers() {
        let oracle = SwitchingOracle::new(Some(Duration::from_secs(2)), Ok(vec![]), Ok(vec![ADDR]));
        let verifier = ConvergenceVerifier::new(oracle);

        let outcome = verifier
            .await_convergence(&id(), &VerifyMode::presence(), Duration::from_secs(10))
            .await;

        assert!(outcome.converged);
        assert_eq!(outcome.elapsed.as_secs(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_presence_with_expected_address() {
        let other = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 8));
        let oracle = SwitchingOracle::new(Some(Duration::ZERO), not_found(), Ok(vec![other]));
        let verifier = ConvergenceVerifier::new(oracle);

        let outcome = verifier
            .await_convergence(
                &id(),
                &VerifyMode::Presence { expected: Some(ADDR) },
                Duration::from_secs(3),
            )
            .await;
        assert!(!outcome.converged);

        let oracle = SwitchingOracle::new(Some(Duration::ZERO), not_found(), Ok(vec![other, ADDR]));
        let outcome = ConvergenceVerifier::new(oracle)
            .await_convergence(
                &id(),
                &VerifyMode::Presence { expected: Some(ADDR) },
                Duration::from_secs(3),
            )
            .await;
        assert!(outcome.converged);
    }

    #[tokio::test(start_paused = true)]
    async fn test_absence_converges_after_k_seconds() {
        let oracle =
            SwitchingOracle::new(Some(Duration::from_secs(4)), Ok(vec![ADDR]), not_found());
        let verifier = ConvergenceVerifier::new(oracle);

        let outcome = verifier
            .await_convergence(&id(), &VerifyMode::Absence, Duration::from_secs(30))
            .await;

        assert!(outcome.converged);
        assert_eq!(outcome.elapsed.as_secs(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_absence_times_out() {
        let oracle = SwitchingOracle::new(None, Ok(vec![ADDR]), not_found());
        let verifier = ConvergenceVerifier::new(oracle);

        let outcome = verifier
            .await_convergence(&id(), &VerifyMode::Absence, Duration::from_secs(7))
            .await;

        assert!(!outcome.converged);
        assert_eq!(outcome.elapsed.as_secs(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_keep_polling() {
        let transient = Err(OracleError::Transient("temporary failure".to_string()));
        let oracle = SwitchingOracle::new(
            Some(Duration::from_secs(2)),
            transient.clone(),
            not_found(),
        );

        let outcome = ConvergenceVerifier::new(oracle)
            .await_convergence(&id(), &VerifyMode::Absence, Duration::from_secs(10))
            .await;
        assert!(outcome.converged);
        assert_eq!(outcome.elapsed.as_secs(), 2);

        let oracle = SwitchingOracle::new(None, transient, not_found());
        let outcome = ConvergenceVerifier::new(oracle)
            .await_convergence(&id(), &VerifyMode::presence(), Duration::from_secs(3))
            .await;
        assert!(!outcome.converged);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_poll_interval() {
        let oracle = SwitchingOracle::new(
            Some(Duration::from_millis(1_250)),
            not_found(),
            Ok(vec![ADDR]),
        );
        let verifier =
            ConvergenceVerifier::new(oracle).with_poll_interval(Duration::from_millis(500));

        let outcome = verifier
            .await_convergence(&id(), &VerifyMode::presence(), Duration::from_secs(10))
            .await;

        assert!(outcome.converged);
        assert_eq!(outcome.elapsed.as_millis(), 1_500);
    }

    #[test]
    fn test_mode_actions() {
        assert_eq!(VerifyMode::presence().action(), Action::Add);
        assert_eq!(VerifyMode::Absence.action(), Action::Delete);
    }
}
