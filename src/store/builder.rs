//! Fluent construction of a [`Store`].

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;

use rustc_hash::FxHashSet;
use tokio::sync::{oneshot, watch};

use crate::bus::{ActionBus, StateBus};
use crate::effects::{ActionHandler, ActionSource, SideEffect};
use crate::errors::{BuildError, ErrorHandler, TracingErrorHandler};
use crate::reducer::Reducer;
use crate::store::config::StoreConfig;
use crate::store::engine::Engine;
use crate::store::Store;

/// Builder assembling a [`Store`] from its capabilities and configuration.
///
/// The reducer is the only mandatory capability; the error handler defaults
/// to [`TracingErrorHandler`]. Producer keys are validated for uniqueness
/// per class at build time, since they drive task preemption in the
/// registry.
///
/// # Examples
///
/// ```rust,no_run
/// use uniflow::reducer::{self, NewsSink};
/// use uniflow::store::Store;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store: Store<i64, i64, String> = Store::builder(0_i64)
///     .with_reducer(reducer::from_fn(
///         |state: &i64, action: &i64, news: &mut NewsSink<String>| {
///             news.push(format!("added {action}"));
///             Ok(state + action)
///         },
///     ))
///     .build()?;
///
/// store.publish(vec![1, 2])?;
/// let mut results = store.subscribe();
/// let latest = results.recv().await.expect("replayed result");
/// # let _ = latest;
/// # Ok(())
/// # }
/// ```
pub struct StoreBuilder<S, A, N> {
    initial_state: S,
    reducer: Option<Arc<dyn Reducer<S, A, N>>>,
    error_handler: Arc<dyn ErrorHandler>,
    side_effects: Vec<Arc<dyn SideEffect<S, A>>>,
    handlers: Vec<Arc<dyn ActionHandler<S, A>>>,
    sources: Vec<Arc<dyn ActionSource<S, A>>>,
    bootstrap: Option<A>,
    config: StoreConfig,
}

impl<S, A, N> StoreBuilder<S, A, N>
where
    S: Clone + PartialEq + Send + Sync + 'static,
    A: Clone + Send + Sync + 'static,
    N: Clone + Send + Sync + 'static,
{
    pub fn new(initial_state: S) -> Self {
        Self {
            initial_state,
            reducer: None,
            error_handler: Arc::new(TracingErrorHandler),
            side_effects: Vec::new(),
            handlers: Vec::new(),
            sources: Vec::new(),
            bootstrap: None,
            config: StoreConfig::default(),
        }
    }

    #[must_use]
    pub fn with_reducer(mut self, reducer: impl Reducer<S, A, N> + 'static) -> Self {
        self.reducer = Some(Arc::new(reducer));
        self
    }

    #[must_use]
    pub fn with_error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.error_handler = Arc::new(handler);
        self
    }

    #[must_use]
    pub fn add_side_effect(mut self, effect: impl SideEffect<S, A> + 'static) -> Self {
        self.side_effects.push(Arc::new(effect));
        self
    }

    #[must_use]
    pub fn add_action_handler(mut self, handler: impl ActionHandler<S, A> + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    #[must_use]
    pub fn add_action_source(mut self, source: impl ActionSource<S, A> + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Action processed first when the loop starts, ahead of anything
    /// externally published.
    #[must_use]
    pub fn with_bootstrap_action(mut self, action: A) -> Self {
        self.bootstrap = Some(action);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the configuration and spawn the engine loop.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn build(self) -> Result<Store<S, A, N>, BuildError> {
        let reducer = self.reducer.ok_or(BuildError::MissingReducer)?;
        ensure_unique_keys("side effect", self.side_effects.iter().map(|e| e.key()))?;
        ensure_unique_keys("action handler", self.handlers.iter().map(|h| h.key()))?;
        ensure_unique_keys("action source", self.sources.iter().map(|s| s.key()))?;

        let (actions, action_rx) = ActionBus::bounded(self.config.action_buffer);
        let results = StateBus::new(self.initial_state.clone(), self.config.state_buffer);
        let (state_tx, _) = watch::channel(self.initial_state.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let engine = Engine::new(
            reducer,
            self.error_handler,
            self.side_effects,
            self.handlers,
            self.sources,
            actions.feed(),
            Arc::clone(&results),
            state_tx,
            self.initial_state,
            self.config.preempt_handlers,
        );
        let handle = tokio::spawn(engine.run(
            action_rx,
            self.bootstrap,
            self.config.startup,
            shutdown_rx,
        ));

        Ok(Store {
            actions,
            results,
            shutdown: Mutex::new(Some(shutdown_tx)),
            engine: Mutex::new(Some(handle)),
            disposed: AtomicBool::new(false),
        })
    }
}

fn ensure_unique_keys(
    class: &'static str,
    keys: impl Iterator<Item = &'static str>,
) -> Result<(), BuildError> {
    let mut seen = FxHashSet::default();
    for key in keys {
        if !seen.insert(key) {
            return Err(BuildError::DuplicateKey { class, key });
        }
    }
    Ok(())
}
