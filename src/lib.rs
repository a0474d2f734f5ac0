//! # Uniflow: Unidirectional-Data-Flow Store Engine
//!
//! Uniflow is a reactive state-management engine: actions mutate state
//! through a pure reduction step, producing immutable `(state, news)`
//! snapshots that are broadcast to observers, while side-effect, handler,
//! and source tasks run concurrently under per-kind lifecycle supervision.
//!
//! ## Core Concepts
//!
//! - **Actions**: units of intent, published in ordered batches
//! - **Reducer**: pure `(state, action) -> state` step that may emit news
//! - **News**: one-shot notifications attached to a result, never replayed
//! - **Side effects**: readiness-gated, preemptible tasks that emit actions
//! - **Handlers**: readiness-gated one-shot tasks with no output channel
//! - **Sources**: long-lived background producers of actions
//! - **Store**: the engine facade — publish, subscribe, dispose
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use uniflow::reducer::{self, NewsSink};
//! use uniflow::store::Store;
//!
//! #[derive(Clone, PartialEq)]
//! struct Counter {
//!     count: i64,
//! }
//!
//! #[derive(Clone)]
//! enum Action {
//!     Increment,
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store: Store<Counter, Action, String> = Store::builder(Counter { count: 0 })
//!     .with_reducer(reducer::from_fn(
//!         |state: &Counter, action: &Action, news: &mut NewsSink<String>| match action {
//!             Action::Increment => {
//!                 news.push("incremented".into());
//!                 Ok(Counter {
//!                     count: state.count + 1,
//!                 })
//!             }
//!         },
//!     ))
//!     .build()?;
//!
//! let mut results = store.subscribe();
//! store.publish(vec![Action::Increment])?;
//!
//! while let Some(result) = results.recv().await {
//!     println!("count={} news={:?}", result.state.count, result.news);
//! }
//!
//! store.dispose().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Ordering & Delivery Guarantees
//!
//! - Reduction is strictly serialized: within a producer, actions are
//!   reduced in flattened publish order, and action *n+1* never starts
//!   before action *n*'s scheduling completed.
//! - A result is broadcast only when the state changed by value or news was
//!   emitted; identical snapshots are never re-broadcast.
//! - Every new subscriber immediately receives the latest known result;
//!   news produced while nobody was subscribed is carried forward and
//!   delivered, concatenated in production order, to the next subscriber.
//! - At most one side-effect task per key is live at a time: a newer
//!   triggering action preempts a stale in-flight run.
//!
//! ## Error Handling
//!
//! Every recoverable failure is routed to the single
//! [`ErrorHandler`](errors::ErrorHandler) collaborator; cancellation is
//! silent everywhere. The engine never terminates itself — only
//! [`Store::dispose`](store::Store::dispose) does.
//!
//! ## Module Guide
//!
//! - [`store`] - The store facade, builder, and configuration
//! - [`reducer`] - Reducer capability and the news sink
//! - [`effects`] - Side-effect, handler, and source capabilities
//! - [`bus`] - The action and state buses
//! - [`result`] - The `(state, news)` snapshot pair
//! - [`errors`] - Error routing, reports, and engine error types

pub mod bus;
pub mod effects;
pub mod errors;
pub mod reducer;
pub mod result;
pub mod store;
