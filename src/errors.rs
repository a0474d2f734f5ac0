//! Error routing for the store engine.
//!
//! Every recoverable failure inside the engine — a failing reducer, a
//! readiness check that errors, a side effect or source whose stream breaks,
//! a handler that returns `Err` — is rendered into an [`ErrorReport`] and
//! routed through the single caller-supplied [`ErrorHandler`] collaborator.
//! Cancellation is never reported: an aborted task is silent at every layer.
//!
//! Caller-supplied units fail with [`BoxError`], the widest practical error
//! type; the engine renders it into the report's message and, where a
//! recovery sequence exists, hands the original error on to it.

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use thiserror::Error;

/// Boxed error type produced by caller-supplied units.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Caller-supplied collaborator receiving every recoverable engine failure.
///
/// Implementations must not panic; the engine calls this from its own loop
/// and from spawned tasks. [`TracingErrorHandler`] is used when the builder
/// is given nothing else.
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, report: ErrorReport);
}

/// Where inside the engine a failure originated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorScope {
    /// The reduction step itself failed; state is left unchanged.
    Reducer,
    /// A readiness check errored; the unit was treated as not ready.
    Readiness { key: &'static str },
    /// A side effect's primary or recovery stream failed.
    SideEffect { key: &'static str },
    /// An action handler's one-shot work failed.
    Handler { key: &'static str },
    /// An action source's primary or recovery stream failed.
    Source { key: &'static str },
}

/// A timestamped, scoped account of a recoverable failure.
///
/// The message is the rendered `Display` of the originating error; the error
/// value itself is consumed by the recovery path where one exists.
#[derive(Clone, Debug)]
pub struct ErrorReport {
    pub when: DateTime<Utc>,
    pub scope: ErrorScope,
    pub message: String,
}

impl ErrorReport {
    pub(crate) fn scoped(scope: ErrorScope, error: &BoxError) -> Self {
        Self {
            when: Utc::now(),
            scope,
            message: error.to_string(),
        }
    }

    /// Report a failed reduction.
    pub fn reducer(error: &BoxError) -> Self {
        Self::scoped(ErrorScope::Reducer, error)
    }

    /// Report a failed readiness check.
    pub fn readiness(key: &'static str, error: &BoxError) -> Self {
        Self::scoped(ErrorScope::Readiness { key }, error)
    }

    /// Report a failed side-effect stream.
    pub fn side_effect(key: &'static str, error: &BoxError) -> Self {
        Self::scoped(ErrorScope::SideEffect { key }, error)
    }

    /// Report a failed action handler.
    pub fn handler(key: &'static str, error: &BoxError) -> Self {
        Self::scoped(ErrorScope::Handler { key }, error)
    }

    /// Report a failed action-source stream.
    pub fn source(key: &'static str, error: &BoxError) -> Self {
        Self::scoped(ErrorScope::Source { key }, error)
    }
}

/// Default error handler: forwards every report to `tracing::error!`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingErrorHandler;

impl ErrorHandler for TracingErrorHandler {
    fn handle(&self, report: ErrorReport) {
        tracing::error!(
            scope = ?report.scope,
            when = %report.when,
            message = %report.message,
            "store error"
        );
    }
}

/// Errors returned by [`Store::publish`](crate::store::Store::publish).
#[derive(Debug, Error, Diagnostic)]
pub enum PublishError {
    /// The action buffer is saturated; the batch was not enqueued.
    #[error("action buffer full (capacity {capacity})")]
    #[diagnostic(
        code(uniflow::bus::full),
        help("Raise StoreConfig::action_buffer or slow the producer.")
    )]
    Full { capacity: usize },

    /// The store has been disposed; publishing has no effect.
    #[error("store disposed")]
    #[diagnostic(code(uniflow::bus::disposed))]
    Disposed,
}

/// Errors reported by [`StoreBuilder::build`](crate::store::StoreBuilder::build).
#[derive(Debug, Error, Diagnostic)]
pub enum BuildError {
    #[error("no reducer configured")]
    #[diagnostic(
        code(uniflow::build::missing_reducer),
        help("Call StoreBuilder::with_reducer before build().")
    )]
    MissingReducer,

    /// Two units of the same class registered the same identity key.
    #[error("duplicate {class} key: {key}")]
    #[diagnostic(
        code(uniflow::build::duplicate_key),
        help("Producer keys must be unique per class; they drive task preemption.")
    )]
    DuplicateKey { class: &'static str, key: &'static str },
}
