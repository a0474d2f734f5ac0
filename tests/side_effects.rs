mod common;
use common::*;

use std::time::Duration;

use async_stream::stream;
use uniflow::effects::{ActionFlow, SideEffect};
use uniflow::errors::{BoxError, ErrorScope};

const SETTLE: Duration = Duration::from_millis(150);

/// Ready on `Add`; emits a record of its trigger after a delay. The delay
/// leaves a window for a newer trigger to preempt the run.
struct SlowEffect {
    delay: Duration,
}

impl SideEffect<CounterState, CounterAction> for SlowEffect {
    fn key(&self) -> &'static str {
        "slow"
    }

    fn check_readiness(&self, action: &CounterAction) -> Result<bool, BoxError> {
        Ok(matches!(action, CounterAction::Add(_)))
    }

    fn run(&self, _state: CounterState, action: CounterAction) -> ActionFlow<CounterAction> {
        let delay = self.delay;
        Box::pin(stream! {
            tokio::time::sleep(delay).await;
            if let CounterAction::Add(n) = action {
                yield batch(vec![CounterAction::Record(format!("effect-{n}"))]);
            }
        })
    }
}

/// Emits one batch, then fails; its recovery stream emits a marker.
struct FlakyEffect;

impl SideEffect<CounterState, CounterAction> for FlakyEffect {
    fn key(&self) -> &'static str {
        "flaky"
    }

    fn check_readiness(&self, action: &CounterAction) -> Result<bool, BoxError> {
        Ok(matches!(action, CounterAction::Increment))
    }

    fn run(&self, _state: CounterState, _action: CounterAction) -> ActionFlow<CounterAction> {
        Box::pin(stream! {
            yield batch(vec![CounterAction::Record("first".into())]);
            yield Err("stream broke".into());
        })
    }

    fn recover(&self, _error: BoxError) -> ActionFlow<CounterAction> {
        Box::pin(stream! {
            yield batch(vec![CounterAction::Record("recovered".into())]);
        })
    }
}

/// Readiness check always fails.
struct BrokenReadinessEffect;

impl SideEffect<CounterState, CounterAction> for BrokenReadinessEffect {
    fn key(&self) -> &'static str {
        "broken-readiness"
    }

    fn check_readiness(&self, _action: &CounterAction) -> Result<bool, BoxError> {
        Err("readiness broke".into())
    }

    fn run(&self, _state: CounterState, _action: CounterAction) -> ActionFlow<CounterAction> {
        unreachable!("never ready")
    }
}

/// Ready on `Increment`; emits a single marker immediately.
struct EchoEffect;

impl SideEffect<CounterState, CounterAction> for EchoEffect {
    fn key(&self) -> &'static str {
        "echo"
    }

    fn check_readiness(&self, action: &CounterAction) -> Result<bool, BoxError> {
        Ok(matches!(action, CounterAction::Increment))
    }

    fn run(&self, _state: CounterState, _action: CounterAction) -> ActionFlow<CounterAction> {
        Box::pin(stream! {
            yield batch(vec![CounterAction::Record("echo".into())]);
        })
    }
}

#[tokio::test]
async fn newer_trigger_preempts_stale_in_flight_run() {
    let (builder, errors) = counter_builder();
    let store = builder
        .add_side_effect(SlowEffect {
            delay: Duration::from_millis(50),
        })
        .build()
        .expect("store");

    // Both actions trigger the same effect within one batch; the second
    // dispatch cancels the first while it is still sleeping.
    store
        .publish(vec![CounterAction::Add(1), CounterAction::Add(2)])
        .expect("publish");
    tokio::time::sleep(SETTLE).await;

    let mut results = store.subscribe();
    let result = results.recv().await.expect("result");
    assert_eq!(result.state.count, 3);
    // No output from the cancelled run reached the action bus.
    assert_eq!(result.state.log, vec!["effect-2"]);
    assert!(errors.is_empty());

    store.dispose().await;
}

#[tokio::test]
async fn failed_stream_reports_and_runs_recovery() {
    let (builder, errors) = counter_builder();
    let store = builder.add_side_effect(FlakyEffect).build().expect("store");

    store.publish(vec![CounterAction::Increment]).expect("publish");
    tokio::time::sleep(SETTLE).await;

    let reports = errors.snapshot();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].scope, ErrorScope::SideEffect { key: "flaky" });
    assert!(reports[0].message.contains("stream broke"));

    let mut results = store.subscribe();
    let result = results.recv().await.expect("result");
    // Output before the failure was forwarded, then the recovery batch.
    assert_eq!(result.state.log, vec!["first", "recovered"]);

    store.dispose().await;
}

#[tokio::test]
async fn readiness_failure_is_reported_and_other_effects_still_run() {
    let (builder, errors) = counter_builder();
    let store = builder
        .add_side_effect(BrokenReadinessEffect)
        .add_side_effect(EchoEffect)
        .build()
        .expect("store");

    store.publish(vec![CounterAction::Increment]).expect("publish");
    tokio::time::sleep(SETTLE).await;

    let reports = errors.snapshot();
    assert_eq!(reports.len(), 1);
    assert_eq!(
        reports[0].scope,
        ErrorScope::Readiness {
            key: "broken-readiness"
        }
    );

    let mut results = store.subscribe();
    let result = results.recv().await.expect("result");
    assert_eq!(result.state.log, vec!["echo"]);

    store.dispose().await;
}

#[tokio::test]
async fn effect_output_feeds_back_through_reduction() {
    let (builder, errors) = counter_builder();
    let store = builder.add_side_effect(EchoEffect).build().expect("store");

    let mut results = store.subscribe();
    let _ = results.recv().await.expect("replay");

    store.publish(vec![CounterAction::Increment]).expect("publish");

    let direct = results.recv().await.expect("increment result");
    assert_eq!(direct.state.count, 1);

    let echoed = results.recv().await.expect("echoed result");
    assert_eq!(echoed.state.log, vec!["echo"]);
    assert!(errors.is_empty());

    store.dispose().await;
}
