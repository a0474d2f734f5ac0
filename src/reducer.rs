//! The pure reduction step and its invoker.
//!
//! A [`Reducer`] turns `(state, action)` into a new state, optionally pushing
//! news into the [`NewsSink`] it is handed. The sink is drained after every
//! invocation, so news never leaks between unrelated reductions.
//!
//! The invoker ([`invoke`]) wraps each call and decides whether the outcome
//! warrants a broadcast: a new [`StoreResult`] is produced only when the
//! state actually changed (value inequality) or at least one news item was
//! emitted. Anything else is a no-op, which keeps subscribers from being
//! flooded with identical snapshots.

use crate::errors::BoxError;
use crate::result::StoreResult;

/// The pure reduction capability.
///
/// Implementations must be pure aside from pushing into the provided sink:
/// same state + same action always yields the same new state and news.
/// A returned `Err` is routed to the error handler and leaves state
/// untouched; the engine loop keeps processing subsequent actions.
///
/// # Examples
///
/// ```rust
/// use uniflow::errors::BoxError;
/// use uniflow::reducer::{NewsSink, Reducer};
///
/// struct Counter;
///
/// impl Reducer<i64, i64, String> for Counter {
///     fn reduce(
///         &self,
///         state: &i64,
///         action: &i64,
///         news: &mut NewsSink<String>,
///     ) -> Result<i64, BoxError> {
///         news.push(format!("added {action}"));
///         Ok(state + action)
///     }
/// }
/// ```
pub trait Reducer<S, A, N>: Send + Sync {
    fn reduce(&self, state: &S, action: &A, news: &mut NewsSink<N>) -> Result<S, BoxError>;
}

/// Collector the reducer pushes news into during a single invocation.
///
/// Reset by the invoker after every call.
#[derive(Debug)]
pub struct NewsSink<N> {
    items: Vec<N>,
}

impl<N> Default for NewsSink<N> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<N> NewsSink<N> {
    /// Emit a single news item.
    pub fn push(&mut self, news: N) {
        self.items.push(news);
    }

    /// Emit several news items in order.
    pub fn extend(&mut self, news: impl IntoIterator<Item = N>) {
        self.items.extend(news);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    fn drain(self) -> Vec<N> {
        self.items
    }
}

/// Adapt a closure into a [`Reducer`].
///
/// ```rust
/// use uniflow::reducer::{self, NewsSink};
///
/// let reducer = reducer::from_fn(|state: &u32, action: &u32, _news: &mut NewsSink<()>| {
///     Ok(state + action)
/// });
/// # let _ = reducer;
/// ```
pub fn from_fn<S, A, N, F>(f: F) -> FnReducer<F>
where
    F: Fn(&S, &A, &mut NewsSink<N>) -> Result<S, BoxError> + Send + Sync,
{
    FnReducer(f)
}

/// A [`Reducer`] backed by a plain function, see [`from_fn`].
pub struct FnReducer<F>(F);

impl<S, A, N, F> Reducer<S, A, N> for FnReducer<F>
where
    F: Fn(&S, &A, &mut NewsSink<N>) -> Result<S, BoxError> + Send + Sync,
{
    fn reduce(&self, state: &S, action: &A, news: &mut NewsSink<N>) -> Result<S, BoxError> {
        (self.0)(state, action, news)
    }
}

/// Run one reduction and decide whether it warrants a broadcast.
///
/// Returns `Ok(Some(result))` when the state changed or news was emitted,
/// `Ok(None)` for a no-op reduction, and `Err` when the reducer itself
/// failed (state stays untouched).
pub(crate) fn invoke<S, A, N>(
    reducer: &dyn Reducer<S, A, N>,
    state: &S,
    action: &A,
) -> Result<Option<StoreResult<S, N>>, BoxError>
where
    S: Clone + PartialEq,
{
    let mut sink = NewsSink::default();
    let next = reducer.reduce(state, action, &mut sink)?;
    let news = sink.drain();
    if next != *state || !news.is_empty() {
        Ok(Some(StoreResult::new(next, news)))
    } else {
        Ok(None)
    }
}
