//! Preemptible, readiness-gated units of reactive work.

use futures_util::stream::{self, BoxStream, StreamExt};

use crate::errors::BoxError;

/// A lazy stream of action batches, fallible per item.
///
/// An `Err` item terminates the primary stream: the engine reports it and
/// switches to the unit's recovery stream. Batches that arrive before the
/// failure have already been republished and are not rolled back.
pub type ActionFlow<A> = BoxStream<'static, Result<Vec<A>, BoxError>>;

/// An empty [`ActionFlow`], the default recovery sequence.
pub fn empty_flow<A: Send + 'static>() -> ActionFlow<A> {
    stream::empty().boxed()
}

/// A readiness-gated, preemptible reactive task triggered by actions.
///
/// For every processed action whose [`check_readiness`](Self::check_readiness)
/// returns `true`, the engine cancels any still-running task registered under
/// this effect's [`key`](Self::key) and spawns [`run`](Self::run) with a state
/// snapshot taken at dispatch time. At most one instance per key is ever
/// live; a newer triggering action preempts a stale in-flight run.
///
/// Every `Ok` batch the stream yields is republished onto the action bus.
/// On the first `Err` item the error is reported and
/// [`recover`](Self::recover) is consumed the same way; cancellation is
/// silent and never reaches the error handler.
///
/// # Examples
///
/// ```rust
/// use futures_util::StreamExt;
/// use uniflow::effects::{ActionFlow, SideEffect, side_effect};
/// use uniflow::errors::BoxError;
///
/// # #[derive(Clone)] enum Action { Refresh, Loaded(u32) }
/// # #[derive(Clone)] struct AppState;
/// struct Refresher;
///
/// impl SideEffect<AppState, Action> for Refresher {
///     fn key(&self) -> &'static str {
///         "refresher"
///     }
///
///     fn check_readiness(&self, action: &Action) -> Result<bool, BoxError> {
///         Ok(matches!(action, Action::Refresh))
///     }
///
///     fn run(&self, _state: AppState, _action: Action) -> ActionFlow<Action> {
///         futures_util::stream::once(async { Ok(vec![Action::Loaded(42)]) }).boxed()
///     }
///
///     fn recover(&self, _error: BoxError) -> ActionFlow<Action> {
///         side_effect::empty_flow()
///     }
/// }
/// ```
pub trait SideEffect<S, A>: Send + Sync {
    /// Stable identity key; drives registry lookup and preemption.
    fn key(&self) -> &'static str;

    /// Whether this effect should run for the given action.
    ///
    /// An `Err` is reported to the error handler and treated as `false`.
    fn check_readiness(&self, action: &A) -> Result<bool, BoxError>;

    /// The effect's work: a lazy stream of action batches to republish.
    fn run(&self, state: S, action: A) -> ActionFlow<A>;

    /// Recovery sequence consumed after the primary stream fails.
    ///
    /// Defaults to an empty stream; the primary stream is not resumed.
    fn recover(&self, error: BoxError) -> ActionFlow<A>
    where
        A: Send + 'static,
    {
        let _ = error;
        empty_flow()
    }
}
