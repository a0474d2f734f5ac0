#![allow(dead_code)]

use uniflow::errors::BoxError;
use uniflow::reducer::{NewsSink, Reducer};
use uniflow::store::{Store, StoreBuilder};

use super::testing::MemoryErrorHandler;

/// Counter state shared by the integration tests: a running count plus an
/// append-only log for ordering assertions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CounterState {
    pub count: i64,
    pub log: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CounterAction {
    Increment,
    Add(i64),
    /// Appends the tag to `CounterState::log`; emits no news.
    Record(String),
    /// Reduces to the same state with no news.
    Noop,
    /// Makes the reducer fail.
    Fail,
}

pub type CounterNews = String;

pub struct CounterReducer;

impl Reducer<CounterState, CounterAction, CounterNews> for CounterReducer {
    fn reduce(
        &self,
        state: &CounterState,
        action: &CounterAction,
        news: &mut NewsSink<CounterNews>,
    ) -> Result<CounterState, BoxError> {
        let mut next = state.clone();
        match action {
            CounterAction::Increment => {
                next.count += 1;
                news.push("incremented".to_string());
            }
            CounterAction::Add(n) => {
                next.count += n;
                news.push(format!("added {n}"));
            }
            CounterAction::Record(tag) => {
                next.log.push(tag.clone());
            }
            CounterAction::Noop => {}
            CounterAction::Fail => return Err("reduction failed".into()),
        }
        Ok(next)
    }
}

/// A builder preloaded with the counter reducer and a memory error handler,
/// returned alongside the handler for assertions.
pub fn counter_builder() -> (
    StoreBuilder<CounterState, CounterAction, CounterNews>,
    MemoryErrorHandler,
) {
    let errors = MemoryErrorHandler::new();
    let builder = Store::builder(CounterState::default())
        .with_reducer(CounterReducer)
        .with_error_handler(errors.clone());
    (builder, errors)
}
