//! One-shot, non-emitting units of reactive work.

use async_trait::async_trait;

use crate::errors::BoxError;

/// A readiness-gated, one-shot task triggered by actions.
///
/// Unlike a [`SideEffect`](crate::effects::SideEffect), a handler has no
/// output channel: it performs pure side-effecting work (I/O, notifications,
/// logging) and emits no further actions. A non-cancellation `Err` is
/// reported to the error handler and the task ends; there is no recovery
/// sequence and no automatic retry, and other handlers for the same action
/// are unaffected.
///
/// Whether a new dispatch preempts a still-running instance of the same key
/// is governed by
/// [`StoreConfig::preempt_handlers`](crate::store::StoreConfig::preempt_handlers).
#[async_trait]
pub trait ActionHandler<S, A>: Send + Sync {
    /// Stable identity key; drives registry lookup and preemption.
    fn key(&self) -> &'static str;

    /// Whether this handler should run for the given action.
    ///
    /// An `Err` is reported to the error handler and treated as `false`.
    fn check_readiness(&self, action: &A) -> Result<bool, BoxError>;

    /// The handler's one-shot work, given a state snapshot from dispatch time.
    async fn handle(&self, state: S, action: A) -> Result<(), BoxError>;
}
