//! Store configuration surface.

/// Buffering and policy knobs for a [`Store`](crate::store::Store).
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Action bus buffer capacity; `publish` fails fast once saturated.
    pub action_buffer: usize,
    /// State bus buffer capacity beyond the replayed latest result.
    pub state_buffer: usize,
    /// When action sources are started.
    pub startup: StartupPolicy,
    /// Whether dispatching an action handler cancels a still-running
    /// instance of the same key first.
    ///
    /// `true` mirrors side-effect preemption. `false` preserves the legacy
    /// behavior where same-kind handler instances may overlap; superseded
    /// tasks are still tracked so disposal cancels them.
    pub preempt_handlers: bool,
}

impl StoreConfig {
    pub const DEFAULT_ACTION_BUFFER: usize = 64;
    pub const DEFAULT_STATE_BUFFER: usize = 16;

    #[must_use]
    pub fn new(action_buffer: usize, state_buffer: usize) -> Self {
        Self {
            action_buffer: if action_buffer == 0 {
                Self::DEFAULT_ACTION_BUFFER
            } else {
                action_buffer
            },
            state_buffer: if state_buffer == 0 {
                Self::DEFAULT_STATE_BUFFER
            } else {
                state_buffer
            },
            startup: StartupPolicy::default(),
            preempt_handlers: true,
        }
    }

    #[must_use]
    pub fn with_action_buffer(mut self, capacity: usize) -> Self {
        self.action_buffer = capacity.max(1);
        self
    }

    #[must_use]
    pub fn with_state_buffer(mut self, capacity: usize) -> Self {
        self.state_buffer = capacity.max(1);
        self
    }

    #[must_use]
    pub fn with_startup(mut self, startup: StartupPolicy) -> Self {
        self.startup = startup;
        self
    }

    #[must_use]
    pub fn with_preempt_handlers(mut self, preempt: bool) -> Self {
        self.preempt_handlers = preempt;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ACTION_BUFFER, Self::DEFAULT_STATE_BUFFER)
    }
}

/// When the engine starts its action sources.
///
/// The engine loop itself always starts consuming actions as soon as the
/// store is built; only source startup is gated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StartupPolicy {
    /// Start sources once the first result subscriber attaches.
    ///
    /// Nothing a source produces can be observed before someone subscribes,
    /// and news from early reductions is carried forward rather than lost.
    #[default]
    OnFirstSubscribe,
    /// Start sources immediately when the store is built.
    Eager,
}
