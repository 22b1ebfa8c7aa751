//! Test utilities for promptline-core.
//!
//! This module provides a mock invoker and an event collector for testing the
//! dispatcher without AWS credentials.
//!
//! Enable with the `test-utils` feature:
//!
//! ```toml
//! [dev-dependencies]
//! promptline-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust
//! use promptline_core::test_utils::MockInvoker;
//! use promptline_core::{Dispatcher, DispatcherConfig};
//! use serde_json::json;
//!
//! # async fn example() {
//! let invoker = MockInvoker::new()
//!     .with_response(json!({"output": {"message": {"content": [{"text": "Hello!"}]}}}));
//! let dispatcher = Dispatcher::new(invoker);
//!
//! let outcome = dispatcher
//!     .handle(json!({"prompt": "Hi"}), &DispatcherConfig::new())
//!     .await;
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::error::InvokeError;
use crate::events::{DispatchEvent, DispatchHook};
use crate::invoker::{InvokeRequest, ModelInvoker};

/// A mock model invoker for testing.
///
/// Returns pre-programmed results in order and records every request.
/// Cloning shares the queue and the call log.
#[derive(Clone, Default)]
pub struct MockInvoker {
    results: Arc<Mutex<VecDeque<Result<Value, InvokeError>>>>,
    calls: Arc<Mutex<Vec<InvokeRequest>>>,
}

impl MockInvoker {
    /// Create a new mock invoker with no results queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response body.
    pub fn with_response(self, body: Value) -> Self {
        self.results.lock().unwrap().push_back(Ok(body));
        self
    }

    /// Queue a failure.
    pub fn with_error(self, error: InvokeError) -> Self {
        self.results.lock().unwrap().push_back(Err(error));
        self
    }

    /// Every request received so far.
    pub fn calls(&self) -> Vec<InvokeRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of invocations made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The most recent request, if any.
    pub fn last_call(&self) -> Option<InvokeRequest> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl ModelInvoker for MockInvoker {
    async fn invoke(&self, request: InvokeRequest) -> Result<Value, InvokeError> {
        self.calls.lock().unwrap().push(request);

        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(InvokeError::Other(
                    "MockInvoker: No more responses configured".to_string(),
                ))
            })
    }
}

/// Collects dispatch events for verification in tests.
///
/// Clones share the same storage, so register a clone as a hook and keep
/// this one for assertions.
#[derive(Clone, Default)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<DispatchEvent>>>,
}

impl EventCollector {
    /// Create a new event collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all collected events.
    pub fn events(&self) -> Vec<DispatchEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Get all collected event names, in order.
    pub fn event_names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.name()).collect()
    }

    /// Check if a specific event type was collected.
    pub fn has_event(&self, name: &str) -> bool {
        self.events.lock().unwrap().iter().any(|e| e.name() == name)
    }

    /// Get the number of collected events.
    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Check if no events have been collected.
    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

impl DispatchHook for EventCollector {
    fn on_event(&self, event: &DispatchEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
