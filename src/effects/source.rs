//! Long-lived background producers of actions.

use tokio::sync::watch;

use crate::effects::side_effect::{ActionFlow, empty_flow};
use crate::errors::BoxError;

/// A long-lived background producer of action batches.
///
/// Sources model externally driven streams — timers, subscriptions, polling
/// loops. Each source is started at most once per store lifetime (timing per
/// [`StartupPolicy`](crate::store::StartupPolicy)) and handed a
/// [`StateAccessor`] for read-only access to live state.
///
/// Every `Ok` batch is republished onto the action bus. On the first `Err`
/// item the error is reported and [`recover`](Self::recover) is consumed the
/// same way; recovery is terminal — the primary stream is not restarted.
pub trait ActionSource<S, A>: Send + Sync {
    /// Stable identity key; registers the source's task for disposal.
    fn key(&self) -> &'static str;

    /// The source's effectively-infinite stream of action batches.
    fn run(&self, state: StateAccessor<S>) -> ActionFlow<A>;

    /// Recovery sequence consumed after the primary stream fails.
    ///
    /// Defaults to an empty stream.
    fn recover(&self, error: BoxError) -> ActionFlow<A>
    where
        A: Send + 'static,
    {
        let _ = error;
        empty_flow()
    }
}

/// Read-only view of the store's live state.
///
/// Backed by a watch channel written solely by the engine loop, so reads
/// never race the writer. Sources may sample [`current`](Self::current) at
/// any time or await [`changed`](Self::changed) to react to updates; they
/// cannot mutate state through this handle.
#[derive(Clone, Debug)]
pub struct StateAccessor<S> {
    rx: watch::Receiver<S>,
}

impl<S: Clone> StateAccessor<S> {
    pub(crate) fn new(rx: watch::Receiver<S>) -> Self {
        Self { rx }
    }

    /// The most recently committed state.
    pub fn current(&self) -> S {
        self.rx.borrow().clone()
    }

    /// Wait for the next state change and return the new value.
    ///
    /// Returns `None` once the store has been disposed.
    pub async fn changed(&mut self) -> Option<S> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}
