//! Scheduler + cycles + verifier + metrics wired together against stubs.

mod common;

use std::time::Duration;

use common::{runner, StubCluster};
use kubernoisy_core::{Action, ConcurrencyPolicy, ObjectKind, RateScheduler};
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn test_steady_churn_at_two_ops() {
    let cluster = StubCluster::new();
    let runner = runner(
        &cluster,
        Some(Duration::from_secs(1)),
        Some(Duration::from_secs(1)),
        Duration::from_secs(5),
    );
    let scheduler = RateScheduler::new(runner.clone(), 2.0, ConcurrencyPolicy::Unbounded).unwrap();

    let launched = scheduler.run_until(sleep(Duration::from_secs(3))).await;
    assert!(launched >= 4, "launched {launched}");

    // Let the detached cycles run to completion.
    sleep(Duration::from_secs(5)).await;

    let metrics = runner.metrics();
    assert_eq!(metrics.cycles_started(), launched);
    assert_eq!(metrics.cycles_in_flight(), 0);
    assert_eq!(metrics.validation_failures(Action::Add), 0);
    assert_eq!(metrics.validation_failures(Action::Delete), 0);

    for action in [Action::Add, Action::Delete] {
        let (count, sum) = metrics.validation_samples(action);
        assert_eq!(count, launched);
        let mean = sum / count as f64;
        assert!((mean - 1.0).abs() < 0.01, "{action} mean {mean}");

        for kind in [ObjectKind::Pod, ObjectKind::Service] {
            assert_eq!(metrics.action_count(kind, action), launched);
        }
    }

    let text = metrics.encode_text().unwrap();
    assert!(text.contains(&format!(
        r#"kubernoisy_action_count_total{{action="add",object="pod"}} {launched}"#
    )));
    assert!(text.contains(&format!(
        r#"kubernoisy_validation_duration_seconds_count{{action="delete"}} {launched}"#
    )));
}
