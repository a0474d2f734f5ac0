//! Caller-supplied reactive units driven by the store engine.
//!
//! Three capabilities plug into the engine loop, each identified by a stable
//! key used for task registration and preemption:
//!
//! - [`SideEffect`]: readiness-gated, preemptible, triggered per action, may
//!   emit further action batches.
//! - [`ActionHandler`]: readiness-gated, one-shot, triggered per action,
//!   emits nothing.
//! - [`ActionSource`]: long-lived background producer of action batches,
//!   started once per store lifetime.

pub mod handler;
pub mod side_effect;
pub mod source;

pub use handler::ActionHandler;
pub use side_effect::{ActionFlow, SideEffect};
pub use source::{ActionSource, StateAccessor};
