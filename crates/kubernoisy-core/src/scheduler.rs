//! Fixed-rate launcher of churn cycles.
//!
//! Every tick spawns one cycle as a detached task. The scheduler never waits
//! for a cycle, and a failing or panicking cycle never reaches it. On
//! shutdown in-flight cycles are abandoned, not awaited.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::validate_rate;
use crate::cycle::CycleRunner;
use crate::error::ConfigError;

/// How many cycles may run at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyPolicy {
    /// One task per tick, no cap.
    Unbounded,
    /// At most `n` cycles; ticks that find no free slot launch nothing.
    Bounded(usize),
}

/// Launches one churn cycle every `1/ops` seconds.
pub struct RateScheduler {
    runner: Arc<CycleRunner>,
    ops: f64,
    period: Duration,
    policy: ConcurrencyPolicy,
}

impl RateScheduler {
    /// Fails when `ops` is not a positive rate with a non-zero period.
    pub fn new(
        runner: Arc<CycleRunner>,
        ops: f64,
        policy: ConcurrencyPolicy,
    ) -> Result<Self, ConfigError> {
        let period = validate_rate(ops)?;
        if policy == ConcurrencyPolicy::Bounded(0) {
            return Err(ConfigError::ZeroConcurrency);
        }

        Ok(Self {
            runner,
            ops,
            period,
            policy,
        })
    }

    /// Time between two launches.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Launches cycles until `shutdown` resolves and returns how many were launched.
    ///
    /// The first launch happens one period after the call.
    pub async fn run_until<F>(&self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let slots = match self.policy {
            ConcurrencyPolicy::Bounded(limit) => Some(Arc::new(Semaphore::new(limit))),
            ConcurrencyPolicy::Unbounded => None,
        };

        tokio::pin!(shutdown);
        let mut launched = 0u64;

        info!(
            ops = self.ops,
            policy = ?self.policy,
            "Performing {} operations per second",
            self.ops
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(launched, "Got signal, exiting");
                    return launched;
                }
                _ = ticker.tick() => {
                    if self.launch(slots.as_ref()) {
                        launched += 1;
                    }
                }
            }
        }
    }

    fn launch(&self, slots: Option<&Arc<Semaphore>>) -> bool {
        let permit: Option<OwnedSemaphorePermit> = match slots {
            None => None,
            Some(slots) => match Arc::clone(slots).try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    debug!("concurrency limit reached, skipping tick");
                    return false;
                }
            },
        };

        self.runner.metrics().record_cycle_launch();
        let runner = Arc::clone(&self.runner);
        tokio::spawn(async move {
            let _permit = permit;
            runner.run_cycle().await;
        });
        true
    }
}
