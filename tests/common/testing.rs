#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use uniflow::errors::{BoxError, ErrorHandler, ErrorReport};

/// In-memory error handler for assertions on reported failures.
#[derive(Clone, Default)]
pub struct MemoryErrorHandler {
    reports: Arc<Mutex<Vec<ErrorReport>>>,
}

impl MemoryErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<ErrorReport> {
        self.reports.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorHandler for MemoryErrorHandler {
    fn handle(&self, report: ErrorReport) {
        self.reports.lock().unwrap().push(report);
    }
}

/// Wrap a batch for yielding from test action flows.
pub fn batch<A>(actions: Vec<A>) -> Result<Vec<A>, BoxError> {
    Ok(actions)
}

/// Install the fmt tracing subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
