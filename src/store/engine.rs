//! The engine loop: serialized reduction, task scheduling, and supervision.
//!
//! One loop task owns the current state and the task registry. Per action,
//! strictly in order: reduce, then schedule side effects, then schedule
//! handlers. Spawned tasks receive a state snapshot taken at dispatch time
//! and run concurrently with each other and with the next reduction; they
//! never touch the live state.

use std::sync::Arc;

use futures_util::StreamExt;
use rustc_hash::FxHashMap;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::bus::StateBus;
use crate::effects::side_effect::ActionFlow;
use crate::effects::{ActionHandler, ActionSource, SideEffect, StateAccessor};
use crate::errors::{BoxError, ErrorHandler, ErrorReport, ErrorScope};
use crate::reducer::{self, Reducer};
use crate::store::config::StartupPolicy;

/// Producer class half of a task identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum ProducerClass {
    SideEffect,
    Handler,
    Source,
}

/// Identity of a supervised background task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct TaskKey {
    class: ProducerClass,
    key: &'static str,
}

/// Live background tasks keyed by producer identity.
///
/// Owned exclusively by the engine loop task; every insert and abort happens
/// from the loop's own execution context, so no lock is required.
#[derive(Default)]
struct TaskRegistry {
    tasks: FxHashMap<TaskKey, JoinHandle<()>>,
    /// Superseded handler tasks left running when preemption is disabled,
    /// tracked so disposal still cancels them.
    parked: Vec<JoinHandle<()>>,
}

impl TaskRegistry {
    /// Abort the live task under `key`, if any.
    fn cancel(&mut self, key: TaskKey) {
        if let Some(prev) = self.tasks.remove(&key) {
            prev.abort();
        }
    }

    /// Detach the live task under `key` without cancelling it.
    fn park(&mut self, key: TaskKey) {
        self.parked.retain(|handle| !handle.is_finished());
        if let Some(prev) = self.tasks.remove(&key)
            && !prev.is_finished()
        {
            self.parked.push(prev);
        }
    }

    fn insert(&mut self, key: TaskKey, handle: JoinHandle<()>) {
        self.tasks.insert(key, handle);
    }

    fn contains(&self, key: TaskKey) -> bool {
        self.tasks.contains_key(&key)
    }

    fn abort_all(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
        for handle in self.parked.drain(..) {
            handle.abort();
        }
    }
}

pub(crate) struct Engine<S, A, N> {
    reducer: Arc<dyn Reducer<S, A, N>>,
    error_handler: Arc<dyn ErrorHandler>,
    side_effects: Vec<Arc<dyn SideEffect<S, A>>>,
    handlers: Vec<Arc<dyn ActionHandler<S, A>>>,
    sources: Vec<Arc<dyn ActionSource<S, A>>>,
    /// Sending half of the action bus, cloned into republishing tasks.
    feed: flume::Sender<Vec<A>>,
    results: Arc<StateBus<S, N>>,
    state_tx: watch::Sender<S>,
    state: S,
    preempt_handlers: bool,
    registry: TaskRegistry,
}

impl<S, A, N> Engine<S, A, N> {
    pub(crate) fn new(
        reducer: Arc<dyn Reducer<S, A, N>>,
        error_handler: Arc<dyn ErrorHandler>,
        side_effects: Vec<Arc<dyn SideEffect<S, A>>>,
        handlers: Vec<Arc<dyn ActionHandler<S, A>>>,
        sources: Vec<Arc<dyn ActionSource<S, A>>>,
        feed: flume::Sender<Vec<A>>,
        results: Arc<StateBus<S, N>>,
        state_tx: watch::Sender<S>,
        state: S,
        preempt_handlers: bool,
    ) -> Self {
        Self {
            reducer,
            error_handler,
            side_effects,
            handlers,
            sources,
            feed,
            results,
            state_tx,
            state,
            preempt_handlers,
            registry: TaskRegistry::default(),
        }
    }
}

impl<S, A, N> Engine<S, A, N>
where
    S: Clone + PartialEq + Send + Sync + 'static,
    A: Clone + Send + Sync + 'static,
    N: Clone + Send + Sync + 'static,
{
    /// Consume the action bus until shutdown, then cancel every supervised
    /// task.
    #[tracing::instrument(level = "debug", skip_all)]
    pub(crate) async fn run(
        mut self,
        actions: flume::Receiver<Vec<A>>,
        bootstrap: Option<A>,
        startup: StartupPolicy,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        tracing::debug!(?startup, "engine loop started");

        let mut sources_started = self.sources.is_empty();
        if !sources_started && startup == StartupPolicy::Eager {
            self.start_sources();
            sources_started = true;
        }

        // Bootstrap is processed directly, ahead of anything already
        // published onto the bus.
        if let Some(action) = bootstrap {
            self.process_batch(vec![action]);
        }

        let attach = {
            let results = Arc::clone(&self.results);
            async move { results.attached().await }
        };
        tokio::pin!(attach);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = &mut attach, if !sources_started => {
                    sources_started = true;
                    self.start_sources();
                }
                batch = actions.recv_async() => match batch {
                    Ok(batch) => self.process_batch(batch),
                    Err(_) => break,
                },
            }
        }

        self.registry.abort_all();
        tracing::debug!("engine loop stopped");
    }

    fn process_batch(&mut self, batch: Vec<A>) {
        if batch.is_empty() {
            return;
        }
        for action in batch {
            // Reduction for action n+1 never begins before action n's
            // scheduling completed: the loop body is sequential and sync.
            self.reduce(&action);
            self.dispatch_side_effects(&action);
            self.dispatch_handlers(&action);
        }
    }

    fn reduce(&mut self, action: &A) {
        match reducer::invoke(self.reducer.as_ref(), &self.state, action) {
            Ok(Some(result)) => {
                self.state = result.state.clone();
                self.state_tx.send_replace(result.state.clone());
                tracing::debug!(news = result.news.len(), "reduction produced result");
                self.results.publish(result);
            }
            Ok(None) => {
                tracing::trace!("no-op reduction");
            }
            Err(error) => {
                self.error_handler.handle(ErrorReport::reducer(&error));
            }
        }
    }

    fn dispatch_side_effects(&mut self, action: &A) {
        for effect in &self.side_effects {
            let key = effect.key();
            if !self.is_ready(key, effect.check_readiness(action)) {
                continue;
            }
            let task_key = TaskKey {
                class: ProducerClass::SideEffect,
                key,
            };
            // A new triggering action preempts a stale in-flight run of the
            // same kind before the replacement starts.
            self.registry.cancel(task_key);

            let effect = Arc::clone(effect);
            let state = self.state.clone();
            let action = action.clone();
            let feed = self.feed.clone();
            let errors = Arc::clone(&self.error_handler);
            let handle = tokio::spawn(async move {
                let flow = effect.run(state, action);
                drive_with_recovery(
                    ErrorScope::SideEffect { key },
                    flow,
                    move |error| effect.recover(error),
                    feed,
                    errors,
                )
                .await;
            });
            self.registry.insert(task_key, handle);
        }
    }

    fn dispatch_handlers(&mut self, action: &A) {
        for handler in &self.handlers {
            let key = handler.key();
            if !self.is_ready(key, handler.check_readiness(action)) {
                continue;
            }
            let task_key = TaskKey {
                class: ProducerClass::Handler,
                key,
            };
            if self.preempt_handlers {
                self.registry.cancel(task_key);
            } else {
                self.registry.park(task_key);
            }

            let handler = Arc::clone(handler);
            let state = self.state.clone();
            let action = action.clone();
            let errors = Arc::clone(&self.error_handler);
            let handle = tokio::spawn(async move {
                if let Err(error) = handler.handle(state, action).await {
                    errors.handle(ErrorReport::handler(key, &error));
                }
            });
            self.registry.insert(task_key, handle);
        }
    }

    /// Each source is started at most once for the store's lifetime.
    fn start_sources(&mut self) {
        for source in &self.sources {
            let key = source.key();
            let task_key = TaskKey {
                class: ProducerClass::Source,
                key,
            };
            if self.registry.contains(task_key) {
                continue;
            }

            let accessor = StateAccessor::new(self.state_tx.subscribe());
            let source = Arc::clone(source);
            let feed = self.feed.clone();
            let errors = Arc::clone(&self.error_handler);
            let handle = tokio::spawn(async move {
                let flow = source.run(accessor);
                drive_with_recovery(
                    ErrorScope::Source { key },
                    flow,
                    move |error| source.recover(error),
                    feed,
                    errors,
                )
                .await;
            });
            self.registry.insert(task_key, handle);
        }
        if !self.sources.is_empty() {
            tracing::debug!(count = self.sources.len(), "action sources started");
        }
    }

    /// Evaluate a readiness outcome; a failed check is reported and treated
    /// as not ready without stopping sibling units.
    fn is_ready(&self, key: &'static str, outcome: Result<bool, BoxError>) -> bool {
        match outcome {
            Ok(ready) => ready,
            Err(error) => {
                self.error_handler.handle(ErrorReport::readiness(key, &error));
                false
            }
        }
    }
}

/// Forward every batch of `flow` onto the action bus.
///
/// Stops silently when the store is disposed mid-forward; returns the first
/// stream error for the caller to report and recover from.
async fn forward_flow<A: Send>(
    mut flow: ActionFlow<A>,
    feed: &flume::Sender<Vec<A>>,
) -> Result<(), BoxError> {
    while let Some(item) = flow.next().await {
        let batch = item?;
        if feed.send_async(batch).await.is_err() {
            break;
        }
    }
    Ok(())
}

/// Drive a unit's primary stream; on failure report it and consume the
/// unit's recovery stream the same way. Recovery is terminal: the primary
/// stream is never resumed, and a failing recovery stream is reported and
/// ends the task.
async fn drive_with_recovery<A: Send + 'static>(
    scope: ErrorScope,
    primary: ActionFlow<A>,
    recover: impl FnOnce(BoxError) -> ActionFlow<A> + Send,
    feed: flume::Sender<Vec<A>>,
    errors: Arc<dyn ErrorHandler>,
) {
    if let Err(error) = forward_flow(primary, &feed).await {
        errors.handle(ErrorReport::scoped(scope.clone(), &error));
        if let Err(error) = forward_flow(recover(error), &feed).await {
            errors.handle(ErrorReport::scoped(scope, &error));
        }
    }
}
