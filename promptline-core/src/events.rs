use std::time::{Duration, Instant};

use serde_json::Value;

use crate::event::EventShape;
use crate::profile::ModelProfile;

/// Events emitted while dispatching a single invocation
///
/// These events let observers log or measure what the dispatcher does
/// without the dispatcher depending on a particular logging backend.
#[derive(Debug, Clone)]
pub enum DispatchEvent {
    /// An event arrived and was classified
    EventReceived {
        /// Detected shape, `None` if the event matched nothing
        shape: Option<EventShape>,
        /// The raw event (logged only at debug level)
        event: Value,
    },

    /// The event was rejected before any model call
    RequestRejected {
        /// Message returned to the caller
        error: String,
    },

    /// Model API call started
    ModelCallStarted {
        model_id: String,
        profile: ModelProfile,
        region: Option<String>,
        timestamp: Instant,
    },

    /// Model API call completed and text was extracted
    ModelCallCompleted {
        model_id: String,
        /// Raw model response body
        response: Value,
        /// Length of the extracted text in bytes
        text_length: usize,
        duration: Duration,
    },

    /// Model API call (or decoding its response) failed
    ModelCallFailed {
        model_id: String,
        /// Full error message, never shown to gateway callers
        error: String,
        duration: Duration,
    },
}

impl DispatchEvent {
    /// Short snake_case name for this event type
    pub fn name(&self) -> &'static str {
        match self {
            Self::EventReceived { .. } => "event_received",
            Self::RequestRejected { .. } => "request_rejected",
            Self::ModelCallStarted { .. } => "model_call_started",
            Self::ModelCallCompleted { .. } => "model_call_completed",
            Self::ModelCallFailed { .. } => "model_call_failed",
        }
    }
}

/// Hook for observing dispatch events
///
/// Implement this trait to receive notifications while an invocation runs.
///
/// # Example
/// ```
/// use promptline_core::events::{DispatchEvent, DispatchHook};
///
/// struct FailureCounter;
///
/// impl DispatchHook for FailureCounter {
///     fn on_event(&self, event: &DispatchEvent) {
///         if let DispatchEvent::ModelCallFailed { error, .. } = event {
///             eprintln!("model call failed: {}", error);
///         }
///     }
/// }
/// ```
pub trait DispatchHook: Send + Sync {
    /// Called when an event occurs
    fn on_event(&self, event: &DispatchEvent);
}

/// Blanket implementation for closures
impl<F> DispatchHook for F
where
    F: Fn(&DispatchEvent) + Send + Sync,
{
    fn on_event(&self, event: &DispatchEvent) {
        self(event)
    }
}

/// Writes dispatch events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHook;

impl DispatchHook for TracingHook {
    fn on_event(&self, event: &DispatchEvent) {
        match event {
            DispatchEvent::EventReceived { shape, event } => {
                tracing::info!(
                    shape = shape.map(|s| s.as_str()).unwrap_or("unrecognized"),
                    "Event received"
                );
                tracing::debug!(%event, "Event payload");
            }
            DispatchEvent::RequestRejected { error } => {
                tracing::warn!(%error, "Request rejected");
            }
            DispatchEvent::ModelCallStarted {
                model_id,
                profile,
                region,
                ..
            } => {
                tracing::info!(
                    %model_id,
                    profile = profile.as_str(),
                    region = region.as_deref().unwrap_or("default"),
                    "Sending request to Bedrock"
                );
            }
            DispatchEvent::ModelCallCompleted {
                model_id,
                response,
                text_length,
                duration,
            } => {
                tracing::info!(
                    %model_id,
                    text_length,
                    duration_ms = duration.as_millis() as u64,
                    "Response received from Bedrock"
                );
                tracing::debug!(%response, "Bedrock response body");
            }
            DispatchEvent::ModelCallFailed {
                model_id,
                error,
                duration,
            } => {
                tracing::error!(
                    %model_id,
                    %error,
                    duration_ms = duration.as_millis() as u64,
                    "Bedrock invocation failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_event_names() {
        let cases = [
            (
                DispatchEvent::EventReceived {
                    shape: None,
                    event: Value::Null,
                },
                "event_received",
            ),
            (
                DispatchEvent::RequestRejected {
                    error: "bad".into(),
                },
                "request_rejected",
            ),
            (
                DispatchEvent::ModelCallFailed {
                    model_id: "m".into(),
                    error: "boom".into(),
                    duration: Duration::ZERO,
                },
                "model_call_failed",
            ),
        ];

        for (event, expected) in cases {
            assert_eq!(event.name(), expected);
        }
    }

    #[test]
    fn test_closure_is_a_hook() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let hook = move |event: &DispatchEvent| sink.lock().unwrap().push(event.name());

        hook.on_event(&DispatchEvent::RequestRejected {
            error: "bad".into(),
        });

        assert_eq!(*seen.lock().unwrap(), vec!["request_rejected"]);
    }

    #[test]
    fn test_tracing_hook_handles_every_event() {
        let hook = TracingHook;
        let events = [
            DispatchEvent::EventReceived {
                shape: Some(EventShape::Gateway),
                event: serde_json::json!({"body": "{}"}),
            },
            DispatchEvent::ModelCallStarted {
                model_id: "amazon.nova-pro-v1:0".into(),
                profile: ModelProfile::ShortName,
                region: None,
                timestamp: Instant::now(),
            },
            DispatchEvent::ModelCallCompleted {
                model_id: "amazon.nova-pro-v1:0".into(),
                response: serde_json::json!({}),
                text_length: 0,
                duration: Duration::from_millis(5),
            },
        ];

        // No subscriber installed: this only checks the match arms don't panic
        for event in &events {
            hook.on_event(event);
        }
    }
}
