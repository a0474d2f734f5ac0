//! The store's two broadcast buses.
//!
//! [`ActionBus`] carries action batches from external callers, side effects,
//! and sources into the single engine loop. [`StateBus`] fans
//! [`StoreResult`](crate::result::StoreResult) snapshots out to subscribers,
//! replaying the latest result to late joiners and carrying news forward
//! while nobody is attached.

pub mod action_bus;
pub mod state_bus;

pub use action_bus::ActionBus;
pub use state_bus::{ResultStream, StateBus};
