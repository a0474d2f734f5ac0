//! The immutable snapshot pair broadcast to store subscribers.

/// Snapshot of store state paired with the news produced by the reduction
/// that created it.
///
/// A `StoreResult` is built fresh by each reduction that changes state or
/// emits news; it is never mutated afterwards. News items are one-shot: they
/// are delivered with exactly one result and never replayed.
///
/// # Examples
///
/// ```rust
/// use uniflow::result::StoreResult;
///
/// let result = StoreResult::new(3_u32, vec!["saved"]);
/// assert_eq!(result.state, 3);
/// assert_eq!(result.news, vec!["saved"]);
///
/// let quiet: StoreResult<u32, &str> = StoreResult::initial(0);
/// assert!(quiet.news.is_empty());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct StoreResult<S, N> {
    /// State at the time the result was produced.
    pub state: S,
    /// News emitted by the producing reduction, in emission order.
    pub news: Vec<N>,
}

impl<S, N> StoreResult<S, N> {
    /// Create a result from a state snapshot and its news.
    pub fn new(state: S, news: Vec<N>) -> Self {
        Self { state, news }
    }

    /// Create a news-free result, used as the seed before any reduction ran.
    pub fn initial(state: S) -> Self {
        Self {
            state,
            news: Vec::new(),
        }
    }

    /// Whether this result carries any news.
    pub fn has_news(&self) -> bool {
        !self.news.is_empty()
    }
}
