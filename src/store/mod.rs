//! The store: engine facade, configuration, and construction.
//!
//! A [`Store`] owns one engine loop that serializes state reduction over
//! published action batches, broadcasts [`StoreResult`] snapshots, and
//! supervises side-effect / handler / source tasks. Build one through
//! [`Store::builder`]; tear it down with [`Store::dispose`].
//!
//! # Lifecycle
//!
//! Idle → Running happens inside [`StoreBuilder::build`], which spawns the
//! loop. Running → Disposed is explicit and terminal: [`Store::dispose`]
//! cancels every supervised task and the loop itself, after which
//! [`Store::publish`] reports [`PublishError::Disposed`] and has no effect.
//!
//! [`StoreResult`]: crate::result::StoreResult
//! [`PublishError::Disposed`]: crate::errors::PublishError::Disposed

pub mod builder;
pub mod config;
mod engine;

pub use builder::StoreBuilder;
pub use config::{StartupPolicy, StoreConfig};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::bus::{ActionBus, ResultStream, StateBus};
use crate::errors::PublishError;

/// Handle to a running store engine.
///
/// Cheap operations only: publishing enqueues, subscribing attaches to the
/// state bus, and all heavy lifting happens on the engine loop task. The
/// handle can be shared behind an `Arc` between producers and the
/// subscribing layer.
///
/// Dropping the store without calling [`dispose`](Self::dispose) sends a
/// best-effort shutdown signal; prefer explicit disposal so task teardown
/// completes before the handle is gone.
pub struct Store<S, A, N> {
    pub(crate) actions: ActionBus<A>,
    pub(crate) results: Arc<StateBus<S, N>>,
    pub(crate) shutdown: Mutex<Option<oneshot::Sender<()>>>,
    pub(crate) engine: Mutex<Option<JoinHandle<()>>>,
    pub(crate) disposed: AtomicBool,
}

impl<S, A, N> Store<S, A, N>
where
    S: Clone + PartialEq + Send + Sync + 'static,
    A: Clone + Send + Sync + 'static,
    N: Clone + Send + Sync + 'static,
{
    /// Start assembling a store around the given initial state.
    pub fn builder(initial_state: S) -> StoreBuilder<S, A, N> {
        StoreBuilder::new(initial_state)
    }

    /// Publish an ordered batch of actions.
    ///
    /// Never awaits the engine: the batch is enqueued into the action
    /// buffer, or the call fails fast with [`PublishError::Full`]. Empty
    /// batches are accepted and ignored by the loop.
    pub fn publish(&self, actions: Vec<A>) -> Result<(), PublishError> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(PublishError::Disposed);
        }
        self.actions.publish(actions)
    }

    /// Attach a result subscriber.
    ///
    /// The returned stream immediately yields the latest known result —
    /// including news carried forward while no subscriber was attached —
    /// then every subsequent broadcast.
    pub fn subscribe(&self) -> ResultStream<S, N> {
        self.results.subscribe()
    }

    /// Stop the engine: cancels every supervised background task and the
    /// loop itself. Idempotent; terminal.
    pub async fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let sender = self
            .shutdown
            .lock()
            .expect("store shutdown slot poisoned")
            .take();
        if let Some(sender) = sender {
            let _ = sender.send(());
        }
        let handle = self
            .engine
            .lock()
            .expect("store engine slot poisoned")
            .take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Subscribers currently attached to the state bus.
    pub fn subscriber_count(&self) -> usize {
        self.results.subscriber_count()
    }
}

impl<S, A, N> Drop for Store<S, A, N> {
    fn drop(&mut self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Ok(mut slot) = self.shutdown.lock()
            && let Some(sender) = slot.take()
        {
            let _ = sender.send(());
        }
    }
}
