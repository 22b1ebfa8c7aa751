//! The request dispatcher
//!
//! [`Dispatcher::handle`] is the whole request path: classify the event,
//! extract the prompt, call the model once and shape the reply. It never
//! fails; every error becomes an error [`Outcome`].

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::config::{DispatcherConfig, HandlerMode, DEFAULT_MODEL_ID, LEGACY_REGION};
use crate::error::{DispatchError, InvokeError, RequestError};
use crate::event::{EventShape, InboundEvent};
use crate::events::{DispatchEvent, DispatchHook};
use crate::invoker::{InvokeRequest, ModelInvoker};
use crate::outcome::{CustomResourceAck, HttpEnvelope, Outcome, INTERNAL_SERVER_ERROR};
use crate::profile::ModelProfile;

/// Turns inbound events into model calls and model output into replies
///
/// ```ignore
/// use promptline_core::{Dispatcher, DispatcherConfig, TracingHook};
/// use promptline_core::invoker::BedrockInvoker;
///
/// let dispatcher = Dispatcher::new(BedrockInvoker::from_env().await).with_hook(TracingHook);
/// let outcome = dispatcher
///     .handle(serde_json::json!({"prompt": "Hello"}), &DispatcherConfig::from_env())
///     .await;
/// ```
pub struct Dispatcher<I> {
    invoker: I,
    hooks: Vec<Arc<dyn DispatchHook>>,
}

impl<I: ModelInvoker> Dispatcher<I> {
    pub fn new(invoker: I) -> Self {
        Self {
            invoker,
            hooks: Vec::new(),
        }
    }

    /// Register a hook that receives every [`DispatchEvent`]
    pub fn with_hook(mut self, hook: impl DispatchHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    fn emit(&self, event: DispatchEvent) {
        for hook in &self.hooks {
            hook.on_event(&event);
        }
    }

    /// Handle one invocation
    pub async fn handle(&self, event: Value, config: &DispatcherConfig) -> Outcome {
        match config.mode() {
            HandlerMode::Full => self.handle_full(event, config).await,
            HandlerMode::Legacy => self.handle_legacy(event).await,
        }
    }

    async fn handle_full(&self, event: Value, config: &DispatcherConfig) -> Outcome {
        let inbound = InboundEvent::classify(&event);
        self.emit(DispatchEvent::EventReceived {
            shape: inbound.shape(),
            event,
        });

        let (prompt, replies_raw) = match &inbound {
            InboundEvent::Preflight => return HttpEnvelope::preflight().into(),
            InboundEvent::CustomResource(request) => {
                return CustomResourceAck::acknowledge(request).into()
            }
            InboundEvent::Direct(direct) => (
                direct.prompt().map(str::to_string),
                direct.replies_raw(),
            ),
            InboundEvent::Gateway(gateway) => (gateway.prompt(), false),
            InboundEvent::Unrecognized => (Err(RequestError::InvalidFormat), false),
        };

        let result = match prompt {
            Ok(prompt) => self
                .generate(&prompt, config.model_id(), config.region())
                .await
                .map_err(DispatchError::from),
            Err(err) => Err(err.into()),
        };

        if let Err(DispatchError::Request(err)) = &result {
            self.emit(DispatchEvent::RequestRejected {
                error: err.to_string(),
            });
        }

        shape_outcome(result, replies_raw)
    }

    /// The deployment-era handler: gateway events only, fixed Nova model and
    /// region, every failure reported as a 500 carrying the real message
    async fn handle_legacy(&self, event: Value) -> Outcome {
        let request = InboundEvent::classify_legacy(&event);
        self.emit(DispatchEvent::EventReceived {
            shape: EventShape::detect(&event),
            event,
        });

        let prompt = match request.legacy_prompt() {
            Ok(prompt) => prompt,
            Err(err) => {
                let error = err.to_string();
                let outcome: Outcome = HttpEnvelope::legacy_error(&error).into();
                self.emit(DispatchEvent::RequestRejected { error });
                return outcome;
            }
        };

        match self
            .generate(&prompt, DEFAULT_MODEL_ID, Some(LEGACY_REGION))
            .await
        {
            Ok(text) => HttpEnvelope::legacy_success(&text).into(),
            Err(err) => HttpEnvelope::legacy_error(&err.to_string()).into(),
        }
    }

    /// Call the model once and extract its text
    async fn generate(
        &self,
        prompt: &str,
        model_id: &str,
        region: Option<&str>,
    ) -> Result<String, InvokeError> {
        let profile = ModelProfile::for_model_id(model_id);
        let started = Instant::now();

        self.emit(DispatchEvent::ModelCallStarted {
            model_id: model_id.to_string(),
            profile,
            region: region.map(str::to_string),
            timestamp: started,
        });

        let request = InvokeRequest {
            model_id: model_id.to_string(),
            region: region.map(str::to_string),
            body: profile.build_request(prompt),
        };

        match self.invoker.invoke(request).await {
            Ok(response) => {
                let text = profile.extract_text(&response);
                self.emit(DispatchEvent::ModelCallCompleted {
                    model_id: model_id.to_string(),
                    response,
                    text_length: text.len(),
                    duration: started.elapsed(),
                });
                Ok(text)
            }
            Err(err) => {
                self.emit(DispatchEvent::ModelCallFailed {
                    model_id: model_id.to_string(),
                    error: err.to_string(),
                    duration: started.elapsed(),
                });
                Err(err)
            }
        }
    }
}

/// Pick the reply form for a finished full-mode invocation
///
/// Bad input is always a 400 envelope. Upstream failures keep their message
/// for raw replies and are hidden behind a generic 500 otherwise.
fn shape_outcome(result: Result<String, DispatchError>, replies_raw: bool) -> Outcome {
    match result {
        Ok(text) if replies_raw => Outcome::response(text),
        Ok(text) => HttpEnvelope::success(&text).into(),
        Err(DispatchError::Request(err)) => HttpEnvelope::error(400, &err.to_string()).into(),
        Err(err) if replies_raw => Outcome::raw_error(err.to_string()),
        Err(err) => HttpEnvelope::error(err.status_code(), INTERNAL_SERVER_ERROR).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{EventCollector, MockInvoker};
    use serde_json::json;

    fn nova_reply(text: &str) -> Value {
        json!({"output": {"message": {"role": "assistant", "content": [{"text": text}]}}})
    }

    #[test]
    fn test_shape_outcome_success() {
        assert_eq!(
            shape_outcome(Ok("hi".into()), true),
            Outcome::response("hi")
        );
        assert_eq!(
            shape_outcome(Ok("hi".into()), false),
            Outcome::from(HttpEnvelope::success("hi"))
        );
    }

    #[test]
    fn test_shape_outcome_bad_input_is_always_enveloped() {
        for replies_raw in [true, false] {
            let outcome = shape_outcome(Err(RequestError::MissingPrompt.into()), replies_raw);
            assert_eq!(
                outcome,
                Outcome::from(HttpEnvelope::error(400, "Missing prompt in request"))
            );
        }
    }

    #[test]
    fn test_shape_outcome_upstream() {
        let err = || DispatchError::from(InvokeError::Network("reset by peer".into()));

        assert_eq!(
            shape_outcome(Err(err()), true),
            Outcome::raw_error("Network error: reset by peer")
        );
        assert_eq!(
            shape_outcome(Err(err()), false),
            Outcome::from(HttpEnvelope::internal_error())
        );
    }

    #[tokio::test]
    async fn test_hooks_see_model_call_lifecycle() {
        let collector = EventCollector::new();
        let dispatcher = Dispatcher::new(MockInvoker::new().with_response(nova_reply("ok")))
            .with_hook(collector.clone());

        dispatcher
            .handle(json!({"prompt": "hi"}), &DispatcherConfig::new())
            .await;

        assert_eq!(
            collector.event_names(),
            vec!["event_received", "model_call_started", "model_call_completed"]
        );
    }

    #[tokio::test]
    async fn test_hooks_see_rejection() {
        let collector = EventCollector::new();
        let dispatcher = Dispatcher::new(MockInvoker::new()).with_hook(collector.clone());

        dispatcher
            .handle(json!({"body": ""}), &DispatcherConfig::new())
            .await;

        assert_eq!(
            collector.event_names(),
            vec!["event_received", "request_rejected"]
        );
    }

    #[tokio::test]
    async fn test_hooks_see_failure_with_real_cause() {
        let collector = EventCollector::new();
        let dispatcher = Dispatcher::new(
            MockInvoker::new().with_error(InvokeError::RateLimited("quota".into())),
        )
        .with_hook(collector.clone());

        let outcome = dispatcher
            .handle(json!({"body": r#"{"prompt": "hi"}"#}), &DispatcherConfig::new())
            .await;

        assert_eq!(outcome.status_code(), Some(500));
        let failure = collector
            .events()
            .into_iter()
            .find_map(|event| match event {
                DispatchEvent::ModelCallFailed { error, .. } => Some(error),
                _ => None,
            })
            .expect("model_call_failed event");
        assert_eq!(failure, "Rate limited: quota");
    }

    #[tokio::test]
    async fn test_multiple_hooks_all_notified() {
        let first = EventCollector::new();
        let second = EventCollector::new();
        let dispatcher = Dispatcher::new(MockInvoker::new())
            .with_hook(first.clone())
            .with_hook(second.clone());

        dispatcher
            .handle(json!({"httpMethod": "OPTIONS"}), &DispatcherConfig::new())
            .await;

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }
}
